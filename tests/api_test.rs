//! End-to-end tests of the REST API through the router.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use strictly_trivia::catalog::{BaseStats, LocalizedNames};
use strictly_trivia::{AppState, Creature, TriviaConfig, create_router};

fn creature(id: i32, french: &str, english: &str, kind: &str) -> Creature {
    Creature::new(
        id,
        LocalizedNames::new(
            french.to_string(),
            english.to_string(),
            String::new(),
            String::new(),
        ),
        vec![kind.to_string()],
        BaseStats::new(35, 55, 40, 50, 50, 90),
        Some(format!("images/{id}.png")),
    )
}

/// Builds a router over a fresh database holding two creatures.
fn test_app() -> (NamedTempFile, Router) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let config = TriviaConfig::default()
        .with_db_path(db_path)
        .with_bcrypt_cost(4);

    let state = AppState::from_config(&config).expect("State setup failed");
    state
        .catalog()
        .import(&[
            creature(25, "Pikachu", "Pikachu", "Electric"),
            creature(4, "Salamèche", "Charmander", "Fire"),
        ])
        .expect("Seed failed");
    (db_file, create_router(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body should be JSON")
    };
    (status, value)
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let credentials = json!({ "username": username, "password": "hunter22" });
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("Token missing").to_string()
}

#[tokio::test]
async fn test_health() {
    let (_db, app) = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ── Auth ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_login_and_profile() {
    let (_db, app) = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "ash", "password": "pallet" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ash");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "ash", "password": "pallet" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("Token missing");

    let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ash");
    assert_eq!(body["gameStats"]["totalScore"], 0);
    assert_eq!(body["gameStats"]["winrate"], 0);
    assert_eq!(body["achievements"], json!([]));
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_errors() {
    let (_db, app) = test_app();
    register_and_login(&app, "misty").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "misty", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "brock" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "  ", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejections_share_a_message() {
    let (_db, app) = test_app();
    register_and_login(&app, "gary").await;

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "gary", "password": "nope" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "nope" })),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_profile_requires_valid_token() {
    let (_db, app) = test_app();
    let (status, _) = send(&app, Method::GET, "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/auth/profile",
        Some("not.a.jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

// ── Catalog ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_creatures_with_meta() {
    let (_db, app) = test_app();
    let (status, body) = send(&app, Method::GET, "/api/creatures", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["totalPages"], 1);
    assert_eq!(body["meta"]["hasNextPage"], false);
    assert_eq!(body["data"][0]["id"], 4);
    assert_eq!(body["data"][1]["name"]["french"], "Pikachu");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/creatures?type=Fire&limit=1&page=1",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"]["english"], "Charmander");
    assert_eq!(body["data"][0]["base"]["SpecialAttack"], 50);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/creatures?sort=-base.Speed&page=abc",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 1);
}

#[tokio::test]
async fn test_list_rejects_unknown_sort() {
    let (_db, app) = test_app();
    let (status, body) = send(&app, Method::GET, "/api/creatures?sort=weight", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("weight"));
}

#[tokio::test]
async fn test_get_creature() {
    let (_db, app) = test_app();
    let (status, body) = send(&app, Method::GET, "/api/creatures/25", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], json!(["Electric"]));
    assert_eq!(body["image"], "images/25.png");

    let (status, _) = send(&app, Method::GET, "/api/creatures/26", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/creatures/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_writes_require_auth() {
    let (_db, app) = test_app();
    let squirtle = json!({
        "id": 7,
        "name": { "french": "Carapuce", "english": "Squirtle" },
        "type": ["Water"],
        "base": {
            "HP": 44, "Attack": 48, "Defense": 65,
            "Sp. Attack": 50, "Sp. Defense": 64, "Speed": 43
        }
    });

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/creatures",
        None,
        Some(squirtle.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register_and_login(&app, "oak").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/creatures",
        Some(&token),
        Some(squirtle.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["base"]["SpecialDefense"], 64);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/creatures",
        Some(&token),
        Some(squirtle),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, "/api/creatures/7", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::DELETE, "/api/creatures/7", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"]["english"], "Squirtle");

    let (status, _) = send(&app, Method::DELETE, "/api/creatures/7", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_creature() {
    let (_db, app) = test_app();
    let token = register_and_login(&app, "elm").await;
    let replacement = json!({
        "id": 999,
        "name": { "french": "Salamèche", "english": "Charmander" },
        "type": ["Fire", "Dragon"],
        "base": {
            "HP": 39, "Attack": 52, "Defense": 43,
            "SpecialAttack": 60, "SpecialDefense": 50, "Speed": 65
        }
    });

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/creatures/4",
        Some(&token),
        Some(replacement.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 4);
    assert_eq!(body["type"], json!(["Fire", "Dragon"]));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/creatures/5",
        Some(&token),
        Some(replacement),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/creatures/4",
        Some(&token),
        Some(json!({ "id": 4, "name": "broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Rounds ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_round_lifecycle_updates_stats() {
    let (_db, app) = test_app();
    let token = register_and_login(&app, "red").await;

    let (status, round) = send(
        &app,
        Method::POST,
        "/api/game/rounds",
        None,
        Some(json!({ "type": "Electric" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(round["phase"], "in_progress");
    assert_eq!(round["attempts"], 0);
    assert_eq!(round["reveal"], json!({ "revealed": 1, "total": 10 }));
    assert_eq!(round["facts"].as_array().map(Vec::len), Some(1));
    assert!(round.get("answer").is_none());
    let id = round["id"].as_str().expect("Round id missing").to_string();

    let (status, outcome) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/guess"),
        None,
        Some(json!({ "guess": "Raichu" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "incorrect");
    assert_eq!(outcome["attempts"], 1);
    assert_eq!(outcome["reveal"]["revealed"], 2);

    let (status, hint) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/hint"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hint["status"], "revealed");
    assert_eq!(hint["facts"].as_array().map(Vec::len), Some(3));

    let (status, outcome) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/guess"),
        None,
        Some(json!({ "guess": "  PIKACHU " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "correct");
    assert_eq!(outcome["points"], 9);
    assert_eq!(outcome["attempts"], 2);
    assert_eq!(outcome["answer"], "Pikachu");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/guess"),
        None,
        Some(json!({ "guess": "Pikachu" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Round is already solved");

    let (status, hint) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/hint"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hint["status"], "already_solved");

    let (status, view) = send(
        &app,
        Method::GET,
        &format!("/api/game/rounds/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "solved");
    assert_eq!(view["answer"], "Pikachu");
    assert_eq!(view["points"], 9);
    assert_eq!(view["image"], "images/25.png");

    let complete = format!("/api/game/rounds/{id}/complete");
    let (status, _) = send(&app, Method::POST, &complete, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, done) = send(&app, Method::POST, &complete, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        done["outcome"],
        json!({ "correct": true, "attempts": 2, "pointsGained": 9 })
    );
    assert_eq!(done["gameStats"]["totalScore"], 9);
    assert_eq!(done["gameStats"]["correctAnswers"], 1);
    assert_eq!(done["gameStats"]["winrate"], 50);

    let (status, _) = send(&app, Method::POST, &complete, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, profile) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(profile["gameStats"]["totalScore"], 9);
    assert_eq!(profile["gameStats"]["bestStreak"], 1);
    assert_eq!(profile["gameStats"]["averageAttemptsPerPokemon"], 2.0);
}

#[tokio::test]
async fn test_abandoned_round_breaks_streak() {
    let (_db, app) = test_app();
    let token = register_and_login(&app, "blue").await;

    let (_, round) = send(&app, Method::POST, "/api/game/rounds", None, None).await;
    let id = round["id"].as_str().expect("Round id missing").to_string();
    send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/guess"),
        None,
        Some(json!({ "guess": "Mew" })),
    )
    .await;

    let (status, done) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/complete"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["outcome"]["correct"], false);
    assert_eq!(done["gameStats"]["totalAttempts"], 1);
    assert_eq!(done["gameStats"]["streakCorrect"], 0);
    assert_eq!(done["gameStats"]["totalScore"], 0);
}

#[tokio::test]
async fn test_round_errors() {
    let (_db, app) = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/game/rounds",
        None,
        Some(json!({ "type": "Dragon" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/game/rounds/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/game/rounds/00000000-0000-4000-8000-000000000000/hint",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, round) = send(&app, Method::POST, "/api/game/rounds", None, None).await;
    let id = round["id"].as_str().expect("Round id missing").to_string();
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/game/rounds/{id}/guess"),
        None,
        Some(json!({ "name": "Pikachu" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
