//! Request extractors

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts},
};
use gym_core::UserId;

use crate::auth::validate_access_token;
use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejection is rendered as an [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Token from an `Authorization` value; the scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Caller authenticated by a bearer token.
///
/// No usable `Authorization: Bearer` header is a 401; a token that fails
/// validation is a 403.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::MissingToken)?;

        let claims = validate_access_token(token, &state.auth.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected bearer token: {:#}", e);
            ApiError::InvalidToken
        })?;
        let id = claims.user_id().map_err(|_| ApiError::InvalidToken)?;

        Ok(AuthUser {
            id,
            email: claims.email,
        })
    }
}
