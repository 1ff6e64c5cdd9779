//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::auth::{AuthError, Claims, bearer_token};
use crate::server::{ApiError, AppState};

/// The caller identified by a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Account id.
    pub fn user_id(&self) -> i32 {
        *self.0.sub()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let claims = state.profiles().authenticate(token)?;
        debug!(user_id = claims.sub(), "Request authenticated");
        Ok(Self(claims))
    }
}
