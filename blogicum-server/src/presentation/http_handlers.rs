use crate::application::blog_service::POSTS_PER_PAGE;
use crate::application::{AuthService, BlogService, CommentService};
use crate::domain::category::CategoryResponse;
use crate::domain::comment::CommentForm;
use crate::domain::post::{PostForm, PostView};
use crate::domain::user::{
    LoginUserRequest, RegisterUserRequest, UpdateProfileRequest, UserResponse,
};
use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use crate::presentation::middleware::{maybe_current_user, CurrentUser};
use crate::presentation::pages;
use actix_web::http::header;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;

// Структура для ответа с токеном
#[derive(serde::Serialize)]
struct AuthResponse {
    token: String,
    user: UserResponse,
}

// Номер страницы листинга, размер страницы фиксированный
#[derive(serde::Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(serde::Serialize)]
struct PostListResponse {
    posts: Vec<PostView>,
    total: i64,
    page: i64,
    page_size: i64,
}

#[derive(serde::Serialize)]
struct CategoryPostsResponse {
    category: CategoryResponse,
    posts: Vec<PostView>,
    total: i64,
    page: i64,
    page_size: i64,
}

#[derive(serde::Serialize)]
struct ProfileResponse {
    profile: UserResponse,
    posts: Vec<PostView>,
    total: i64,
    page: i64,
    page_size: i64,
}

fn post_detail_path(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

fn profile_path(username: &str) -> String {
    format!("/profile/{}/", username)
}

fn redirect_to(path: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, path))
        .finish()
}

// Принципал, положенный в extensions bearer-мидлварью
fn current_user(req: &HttpRequest) -> Result<CurrentUser, DomainError> {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(DomainError::Unauthorized(
            "User not authenticated".to_string(),
        ))
}

// Преобразование DomainError в HttpResponse
fn error_to_response(err: DomainError) -> HttpResponse {
    // Чужой пост не "запрещён", а показан: редирект на его страницу
    if let DomainError::NotPostAuthor { post_id } = err {
        return redirect_to(post_detail_path(post_id));
    }

    let status_code = err.to_status_code();
    let message = err.to_string();

    match status_code {
        400 => HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        401 => HttpResponse::Unauthorized().json(serde_json::json!({ "error": message })),
        404 => pages::not_found_response(),
        409 => HttpResponse::Conflict().json(serde_json::json!({ "error": message })),
        _ => pages::server_error_response(),
    }
}

// ============== Auth Handlers ==============

pub async fn register(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<RegisterUserRequest>,
) -> impl Responder {
    match auth_service.register(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Created().json(AuthResponse { token, user }),
        Err(err) => error_to_response(err),
    }
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<LoginUserRequest>,
) -> impl Responder {
    match auth_service.login(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Ok().json(AuthResponse { token, user }),
        Err(err) => error_to_response(err),
    }
}

// ============== Listing Handlers ==============

pub async fn index(
    blog_service: web::Data<Arc<BlogService>>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let page = query.page.unwrap_or(1);

    match blog_service.index_page(page).await {
        Ok((posts, total)) => HttpResponse::Ok().json(PostListResponse {
            posts,
            total,
            page,
            page_size: POSTS_PER_PAGE,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn category_posts(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let slug = path.into_inner();
    let page = query.page.unwrap_or(1);

    match blog_service.category_page(&slug, page).await {
        Ok((category, posts, total)) => HttpResponse::Ok().json(CategoryPostsResponse {
            category,
            posts,
            total,
            page,
            page_size: POSTS_PER_PAGE,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn profile(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    jwt_service: web::Data<Arc<JwtService>>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let username = path.into_inner();
    let page = query.page.unwrap_or(1);
    let viewer = maybe_current_user(&req, jwt_service.get_ref()).map(|u| u.id);

    match blog_service.profile_page(&username, viewer, page).await {
        Ok((profile, posts, total)) => HttpResponse::Ok().json(ProfileResponse {
            profile,
            posts,
            total,
            page,
            page_size: POSTS_PER_PAGE,
        }),
        Err(err) => error_to_response(err),
    }
}

// ============== Profile Handlers ==============

pub async fn edit_profile_form(
    req: HttpRequest,
    auth_service: web::Data<Arc<AuthService>>,
) -> impl Responder {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match auth_service.profile(user.id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_profile(
    req: HttpRequest,
    auth_service: web::Data<Arc<AuthService>>,
    form: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match auth_service.update_profile(user.id, form.into_inner()).await {
        Ok(_) => redirect_to("/".to_string()),
        Err(err) => error_to_response(err),
    }
}

// ============== Post Handlers ==============

pub async fn post_detail(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    jwt_service: web::Data<Arc<JwtService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let viewer = maybe_current_user(&req, jwt_service.get_ref()).map(|u| u.id);

    match blog_service.post_detail(post_id, viewer).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(err) => error_to_response(err),
    }
}

pub async fn post_create_form() -> impl Responder {
    // начальные значения пустой формы
    HttpResponse::Ok().json(serde_json::json!({
        "title": "",
        "text": "",
        "pub_date": null,
        "image": null,
        "category_id": null,
        "location_id": null,
        "is_published": true,
    }))
}

pub async fn create_post(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    form: web::Json<PostForm>,
) -> impl Responder {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Creating post for user_id={}", user.id);

    match blog_service.create_post(user.id, form.into_inner()).await {
        Ok(_) => redirect_to(profile_path(&user.username)),
        Err(err) => error_to_response(err),
    }
}

pub async fn edit_post_form(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match blog_service.owned_post(post_id, user.id).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_post(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
    form: web::Json<PostForm>,
) -> impl Responder {
    let post_id = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Updating post id={} for user_id={}", post_id, user.id);

    match blog_service
        .update_post(post_id, user.id, form.into_inner())
        .await
    {
        Ok(post) => redirect_to(post_detail_path(post.id)),
        Err(err) => error_to_response(err),
    }
}

// Подтверждение удаления: форма, связанная с удаляемым экземпляром
pub async fn delete_post_form(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match blog_service.owned_post(post_id, user.id).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_post(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Deleting post id={} for user_id={}", post_id, user.id);

    match blog_service.delete_post(post_id, user.id).await {
        Ok(()) => redirect_to(profile_path(&user.username)),
        Err(err) => error_to_response(err),
    }
}

// ============== Comment Handlers ==============

pub async fn add_comment(
    req: HttpRequest,
    comment_service: web::Data<Arc<CommentService>>,
    path: web::Path<i64>,
    form: web::Json<CommentForm>,
) -> impl Responder {
    let post_id = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match comment_service
        .add_comment(user.id, post_id, form.into_inner())
        .await
    {
        Ok(comment) => redirect_to(post_detail_path(comment.post_id)),
        Err(err) => error_to_response(err),
    }
}

pub async fn edit_comment_form(
    req: HttpRequest,
    comment_service: web::Data<Arc<CommentService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match comment_service
        .owned_comment(user.id, post_id, comment_id)
        .await
    {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_comment(
    req: HttpRequest,
    comment_service: web::Data<Arc<CommentService>>,
    path: web::Path<(i64, i64)>,
    form: web::Json<CommentForm>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match comment_service
        .update_comment(user.id, post_id, comment_id, form.into_inner())
        .await
    {
        Ok(_) => redirect_to(post_detail_path(post_id)),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_comment_form(
    req: HttpRequest,
    comment_service: web::Data<Arc<CommentService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match comment_service
        .owned_comment(user.id, post_id, comment_id)
        .await
    {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_comment(
    req: HttpRequest,
    comment_service: web::Data<Arc<CommentService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(err) => return error_to_response(err),
    };

    match comment_service
        .delete_comment(user.id, post_id, comment_id)
        .await
    {
        Ok(()) => redirect_to(post_detail_path(post_id)),
        Err(err) => error_to_response(err),
    }
}
