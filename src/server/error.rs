//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::auth::AuthError;
use crate::catalog::SortParseError;
use crate::catalog_service::CatalogError;
use crate::game::RoundError;
use crate::profile_service::ProfileError;
use crate::server::dto::ErrorBody;

/// Error returned by a handler. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ApiError {
    /// 400.
    #[display("{}", _0)]
    BadRequest(String),
    /// 401.
    #[display("{}", _0)]
    Unauthorized(String),
    /// 404.
    #[display("{}", _0)]
    NotFound(String),
    /// 409.
    #[display("{}", _0)]
    Conflict(String),
    /// 500. The message is logged, never sent.
    #[display("{}", _0)]
    Internal(String),
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::Internal(detail) => {
                error!(detail = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            Self::Unauthorized(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<RoundError> for ApiError {
    fn from(err: RoundError) -> Self {
        match err {
            RoundError::EmptyPool | RoundError::NotFound(_) => Self::NotFound(err.to_string()),
            RoundError::AlreadySolved => Self::Conflict(err.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => Self::NotFound(err.to_string()),
            CatalogError::AlreadyExists(_) => Self::Conflict(err.to_string()),
            CatalogError::Invalid(_) => Self::BadRequest(err.to_string()),
            CatalogError::Unreadable(_) | CatalogError::Store(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::MissingCredentials => Self::BadRequest(err.to_string()),
            ProfileError::UsernameTaken(_) | ProfileError::StatsConflict(_) => {
                Self::Conflict(err.to_string())
            }
            ProfileError::Auth(auth) => auth.into(),
            ProfileError::UserNotFound(_) => Self::NotFound(err.to_string()),
            ProfileError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<SortParseError> for ApiError {
    fn from(err: SortParseError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_are_unauthorized() {
        let err: ApiError = ProfileError::Auth(AuthError::InvalidCredentials).into();
        assert_eq!(err, ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    #[test]
    fn test_hashing_failure_is_internal() {
        let err: ApiError = AuthError::Hashing("boom".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_round_errors() {
        let solved: ApiError = RoundError::AlreadySolved.into();
        assert_eq!(solved.status_code(), StatusCode::CONFLICT);
        let empty: ApiError = RoundError::EmptyPool.into();
        assert_eq!(empty.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unreadable_dump_is_internal() {
        let err: ApiError = CatalogError::Unreadable("'dump.json': denied".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let invalid: ApiError = CatalogError::Invalid("no types".to_string()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }
}
