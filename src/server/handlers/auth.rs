//! Registration, login and profile handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use tracing::{info, instrument};

use super::{blocking, json_body};
use crate::profile_service::ProfileError;
use crate::server::dto::{CredentialsRequest, ProfileView, RegisterView, TokenView};
use crate::server::{ApiError, AppState, AuthUser};

fn credentials(request: CredentialsRequest) -> Result<(String, String), ApiError> {
    match (request.username, request.password) {
        (Some(username), Some(password)) => Ok((username, password)),
        _ => Err(ProfileError::MissingCredentials.into()),
    }
}

/// `POST /api/auth/register`.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterView>), ApiError> {
    let (username, password) = credentials(json_body(payload)?)?;
    let profiles = state.profiles().clone();

    let user = blocking(move || profiles.register(&username, &password)).await?;
    info!(user_id = user.id(), "Registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterView {
            message: "User registered successfully".to_string(),
            username: user.username().clone(),
        }),
    ))
}

/// `POST /api/auth/login`.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenView>, ApiError> {
    let (username, password) = credentials(json_body(payload)?)?;
    let profiles = state.profiles().clone();

    let token = blocking(move || profiles.login(&username, &password)).await?;
    Ok(Json(TokenView { token }))
}

/// `GET /api/auth/profile`.
#[instrument(skip_all, fields(user_id = user.user_id()))]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    let profiles = state.profiles().clone();
    let user_id = user.user_id();

    let profile = blocking(move || profiles.profile(user_id)).await?;
    Ok(Json(ProfileView::from(&profile)))
}
