//! REST API over the round manager, catalog and profile services.
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | `/health` | |
//! | POST | `/api/auth/register` | |
//! | POST | `/api/auth/login` | |
//! | GET | `/api/auth/profile` | Bearer |
//! | GET, POST | `/api/creatures` | POST: Bearer |
//! | GET, PUT, DELETE | `/api/creatures/{id}` | PUT, DELETE: Bearer |
//! | POST | `/api/game/rounds` | |
//! | GET | `/api/game/rounds/{id}` | |
//! | POST | `/api/game/rounds/{id}/guess` | |
//! | POST | `/api/game/rounds/{id}/hint` | |
//! | POST | `/api/game/rounds/{id}/complete` | Bearer |

pub mod dto;
mod error;
mod extract;
pub mod handlers;
mod state;

pub use error::ApiError;
pub use extract::AuthUser;
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::TriviaConfig;

/// Builds the API router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/profile", get(handlers::auth::profile))
        .route(
            "/api/creatures",
            get(handlers::creatures::list).post(handlers::creatures::create),
        )
        .route(
            "/api/creatures/{id}",
            get(handlers::creatures::get)
                .put(handlers::creatures::update)
                .delete(handlers::creatures::delete),
        )
        .route("/api/game/rounds", post(handlers::game::start))
        .route("/api/game/rounds/{id}", get(handlers::game::show))
        .route("/api/game/rounds/{id}/guess", post(handlers::game::guess))
        .route("/api/game/rounds/{id}/hint", post(handlers::game::hint))
        .route(
            "/api/game/rounds/{id}/complete",
            post(handlers::game::complete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Opens the store, builds the router and serves until the process exits.
#[instrument(skip(config), fields(addr = %config.bind_address()))]
pub async fn serve(config: &TriviaConfig) -> Result<()> {
    let state = AppState::from_config(config)?;

    let mut app = create_router(state);
    if let Some(dir) = config.static_dir() {
        info!(dir = %dir.display(), "Serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Server ready at http://{}/", config.bind_address());
    axum::serve(listener, app).await?;
    Ok(())
}
