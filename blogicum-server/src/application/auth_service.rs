use crate::data::user_repository::UserRepository;
use crate::domain::user::{
    LoginUserRequest, RegisterUserRequest, UpdateProfileRequest, UserResponse,
};
use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

fn validate_registration(req: &RegisterUserRequest) -> Result<(), DomainError> {
    if req.username.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(DomainError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(DomainError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_profile(req: &UpdateProfileRequest) -> Result<(), DomainError> {
    if req.username.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(DomainError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    pub async fn register(
        &self,
        req: RegisterUserRequest,
    ) -> Result<(String, UserResponse), DomainError> {
        validate_registration(&req)?;

        if let Ok(_user) = self.user_repo.find_by_username(&req.username).await {
            tracing::warn!("Registration failed: username already exists");
            return Err(DomainError::UserAlreadyExists);
        }

        if let Ok(_user) = self.user_repo.find_by_email(&req.email).await {
            tracing::warn!("Registration failed: email already exists");
            return Err(DomainError::UserAlreadyExists);
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                DomainError::InternalError(format!("Password hashing failed: {}", e))
            })?
            .to_string();

        let user = self.user_repo.create(req, password_hash).await?;

        let token = self
            .jwt_service
            .generate_token(user.id, user.username.clone())?;

        tracing::info!(
            "User registered successfully: id={}, username={}",
            user.id,
            user.username
        );

        Ok((token, UserResponse::from(user)))
    }

    pub async fn login(
        &self,
        req: LoginUserRequest,
    ) -> Result<(String, UserResponse), DomainError> {
        let user = match self.user_repo.find_by_username(&req.username).await {
            Ok(u) => u,
            Err(_) => {
                tracing::warn!("Login failed: user not found: {}", req.username);
                return Err(DomainError::InvalidCredentials);
            }
        };

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        let argon2 = Argon2::default();
        if argon2
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for user {}", user.username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .jwt_service
            .generate_token(user.id, user.username.clone())?;

        tracing::info!(
            "User logged in successfully: id={}, username={}",
            user.id,
            user.username
        );

        Ok((token, UserResponse::from(user)))
    }

    /// Текущая запись владельца профиля, начальные значения формы.
    pub async fn profile(&self, user_id: i64) -> Result<UserResponse, DomainError> {
        let user = self.user_repo.find_by_id(user_id).await?;
        Ok(UserResponse::from(user))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, DomainError> {
        validate_profile(&req)?;

        let user = self.user_repo.update_profile(user_id, req).await?;

        tracing::info!("Profile updated: id={}, username={}", user.id, user.username);

        Ok(UserResponse::from(user))
    }
}
