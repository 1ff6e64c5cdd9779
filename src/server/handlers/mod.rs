//! Route handlers.

pub mod auth;
pub mod creatures;
pub mod game;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use tracing::{debug, instrument};

use crate::server::ApiError;
use crate::server::dto::HealthView;

/// `GET /health`.
#[instrument]
pub async fn health() -> Json<HealthView> {
    debug!("Health check");
    Json(HealthView {
        status: "ok".to_string(),
    })
}

/// Runs a synchronous store call on the blocking pool.
async fn blocking<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?.map_err(Into::into)
}

/// Unwraps a JSON body, reporting malformed input as a 400 in our error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
