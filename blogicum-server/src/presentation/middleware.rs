use crate::infrastructure::jwt::JwtService;
use actix_web::http::header;
use actix_web::{dev::ServiceRequest, web, Error, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::{BearerAuth, Config};
use actix_web_httpauth::extractors::AuthenticationError;
use std::sync::Arc;

/// Аутентифицированный принципал запроса.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

pub async fn jwt_middleware(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
        Some(service) => service.get_ref().clone(),
        None => {
            return Err((
                actix_web::error::ErrorInternalServerError("JWT service not configured"),
                req,
            ));
        }
    };

    match jwt_service.verify_token(credentials.token()) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser {
                id: claims.user_id,
                username: claims.username,
            });
            Ok(req)
        }
        Err(_) => {
            let config = req.app_data::<Config>().cloned().unwrap_or_default();
            Err((AuthenticationError::from(config).into(), req))
        }
    }
}

/// Принципал на публичных страницах: токен читается, если он прислан,
/// анонимный доступ остаётся возможным.
pub fn maybe_current_user(req: &HttpRequest, jwt_service: &JwtService) -> Option<CurrentUser> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    jwt_service
        .verify_token(token)
        .ok()
        .map(|claims| CurrentUser {
            id: claims.user_id,
            username: claims.username,
        })
}
