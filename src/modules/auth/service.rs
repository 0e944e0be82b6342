use super::dto::{
    CurrentUserResponse, LoginRequest, LoginResponse, ResetPasswordRequest, SignupRequest,
    TokenClaims, UserResponse, VerifyTokenResponse,
};
use super::model::DEFAULT_ROLE;
use super::repository::AuthRepository;
use crate::common::error::{AppError, AppResult};
use crate::common::security;
use crate::middleware::auth::verify_token;
use crate::state::AppState;
use anyhow::anyhow;
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct AuthService;

impl AuthService {
    pub async fn signup(state: AppState, req: SignupRequest) -> AppResult<UserResponse> {
        req.validate()?;

        if AuthRepository::find_user_by_username(&state.db, &req.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        if AuthRepository::find_user_by_email(&state.db, &req.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = security::hash_password(&req.password)?;

        let user = AuthRepository::create_user(
            &state.db,
            &req.username,
            &req.email,
            &password_hash,
            DEFAULT_ROLE,
        )
        .await?;

        info!(user_id = %user.id, "User signed up");
        Ok(user.into())
    }

    pub async fn login(state: AppState, req: LoginRequest) -> AppResult<LoginResponse> {
        req.validate()?;

        let user = AuthRepository::find_user_by_login(&state.db, &req.username_or_email)
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist!".to_string()))?;

        security::verify_password(&req.password, &user.password_hash)
            .map_err(|_| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let ttl = state.config.jwt_ttl_seconds;
        let token = Self::create_access_token(user.id, &user.username, &state.config.jwt_secret, ttl)?;

        Ok(LoginResponse {
            token,
            expires_in: ttl,
            user: user.into(),
        })
    }

    pub async fn reset_password(state: AppState, req: ResetPasswordRequest) -> AppResult<()> {
        req.validate()?;

        if AuthRepository::find_user_by_email(&state.db, &req.email)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Email does not exist".to_string()));
        }

        let password_hash = security::hash_password(&req.new_password)?;
        AuthRepository::update_password(&state.db, &req.email, &password_hash).await?;

        Ok(())
    }

    pub fn verify(state: &AppState, token: Option<&str>) -> VerifyTokenResponse {
        let valid = token
            .filter(|t| !t.is_empty())
            .is_some_and(|t| verify_token(t, &state.config.jwt_secret).is_ok());
        VerifyTokenResponse { valid }
    }

    pub fn current_user(claims: &TokenClaims) -> CurrentUserResponse {
        CurrentUserResponse {
            user_id: claims.sub,
            username: claims.username.clone(),
        }
    }

    pub fn create_access_token(
        user_id: Uuid,
        username: &str,
        secret: &str,
        ttl_seconds: u64,
    ) -> AppResult<String> {
        let now = get_current_timestamp();

        let claims = TokenClaims {
            sub: user_id,
            username: username.to_string(),
            exp: (now + ttl_seconds) as usize,
            iat: now as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow!("Failed to sign token: {}", e)))
    }
}
