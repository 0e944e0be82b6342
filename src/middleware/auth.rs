use crate::common::error::AppError;
use crate::modules::auth::dto::TokenClaims;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AuthQuery {
    auth: Option<String>,
}

/// Pulls a token from `Authorization` (with or without the `Bearer ` prefix)
/// or, failing that, from the `auth` query parameter. Browsers cannot set
/// headers on WebSocket upgrades or media links, hence the query fallback.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim().to_owned())
        .filter(|token| !token.is_empty());

    from_header.or_else(|| {
        Query::<AuthQuery>::try_from_uri(uri)
            .ok()
            .and_then(|Query(q)| q.auth)
            .filter(|token| !token.is_empty())
    })
}

pub fn verify_token(token: &str, secret: &str) -> Result<TokenClaims, AppError> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Forbidden("Invalid or expired token".to_string()))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers(), req.uri())
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    let claims = verify_token(&token, &state.config.jwt_secret)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Claims when a valid token accompanies the request, `None` otherwise.
/// Used by public endpoints that personalise their output for signed-in users.
pub struct OptionalClaims(pub Option<TokenClaims>);

impl FromRequestParts<AppState> for OptionalClaims {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = extract_token(&parts.headers, &parts.uri)
            .and_then(|token| verify_token(&token, &state.config.jwt_secret).ok());
        Ok(OptionalClaims(claims))
    }
}
