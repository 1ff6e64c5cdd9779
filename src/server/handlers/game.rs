//! Round lifecycle handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{debug, info, instrument};

use super::{blocking, json_body};
use crate::game::{GuessOutcome, HintOutcome, RoundId};
use crate::server::dto::{CompleteView, GuessRequest, RoundView, StartRoundRequest};
use crate::server::{ApiError, AppState, AuthUser};

fn parse_round_id(raw: &str) -> Result<RoundId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Round {} not found", raw)))
}

/// `POST /api/game/rounds`. The body is optional.
#[instrument(skip_all)]
pub async fn start(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<RoundView>), ApiError> {
    let request: StartRoundRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartRoundRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid round request: {}", e)))?
    };
    debug!(creature_type = ?request.creature_type, "Starting round");

    let catalog = state.catalog().clone();
    let limit = *state.pool_limit();
    let pool = blocking(move || catalog.round_pool(request.creature_type, limit)).await?;

    let (id, round) = state.rounds().start_round(&pool, &mut rand::rng())?;
    info!(round_id = %id, "Round created");
    Ok((StatusCode::CREATED, Json(RoundView::new(id, &round))))
}

/// `GET /api/game/rounds/{id}`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoundView>, ApiError> {
    let id = parse_round_id(&id)?;
    let round = state.rounds().get(id)?;
    Ok(Json(RoundView::new(id, &round)))
}

/// `POST /api/game/rounds/{id}/guess`.
#[instrument(skip(state, payload))]
pub async fn guess(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessOutcome>, ApiError> {
    let id = parse_round_id(&id)?;
    let request = json_body(payload)?;
    let outcome = state.rounds().submit_guess(id, &request.guess)?;
    Ok(Json(outcome))
}

/// `POST /api/game/rounds/{id}/hint`.
#[instrument(skip(state))]
pub async fn hint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HintOutcome>, ApiError> {
    let id = parse_round_id(&id)?;
    let outcome = state.rounds().request_hint(id)?;
    Ok(Json(outcome))
}

/// `POST /api/game/rounds/{id}/complete`.
///
/// Removes the round and folds its outcome into the caller's stats.
#[instrument(skip(state, user), fields(user_id = user.user_id()))]
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<CompleteView>, ApiError> {
    let id = parse_round_id(&id)?;
    let outcome = state.rounds().complete(id)?.into_outcome();

    let profiles = state.profiles().clone();
    let user_id = user.user_id();
    let stats = blocking(move || profiles.record_round(user_id, &outcome)).await?;

    info!(round_id = %id, correct = outcome.correct(), "Round folded into stats");
    Ok(Json(CompleteView::new(outcome, stats)))
}
