use super::dto::{
    CurrentUserResponse, LoginRequest, LoginResponse, ResetPasswordRequest, SignupRequest,
    TokenClaims, UserResponse, VerifyTokenRequest, VerifyTokenResponse,
};
use super::service::AuthService;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Username or email already exists")
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> impl IntoResponse {
    match AuthService::signup(state, payload).await {
        Ok(user) => ApiSuccess::created(user, "User signed up successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Log in with username or email
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User does not exist")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    match AuthService::login(state, payload).await {
        Ok(response) => ApiSuccess::ok(response, "Login successful").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Reset a password by email
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<String>),
        (status = 404, description = "Email does not exist")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    match AuthService::reset_password(state, payload).await {
        Ok(()) => ApiSuccess::ok((), "Password reset successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Check whether a token is still valid
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-token",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Verification result", body = ApiResponse<VerifyTokenResponse>)
    ),
    tag = "Auth"
)]
pub async fn verify_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyTokenRequest>,
) -> impl IntoResponse {
    let result = AuthService::verify(&state, payload.token.as_deref());
    ApiSuccess::ok(result, "Token checked").into_response()
}

/// Identity behind the presented token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<CurrentUserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(Extension(claims): Extension<TokenClaims>) -> impl IntoResponse {
    ApiSuccess::ok(AuthService::current_user(&claims), "Current user").into_response()
}
