//! REST backend: plays against a running server and records stats there.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::game::{GuessOutcome, HintOutcome, RoundId};
use crate::play::TriviaBackend;
use crate::server::dto::{
    CompleteView, CredentialsRequest, ErrorBody, GuessRequest, ProfileView, RoundView,
    StartRoundRequest, TokenView,
};

/// HTTP client for the trivia REST API.
#[derive(Debug, Clone)]
pub struct RestTriviaClient {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
    creature_type: Option<String>,
}

impl RestTriviaClient {
    /// Creates an anonymous client.
    #[instrument]
    pub fn new(base_url: String, creature_type: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: None,
            creature_type,
        }
    }

    /// Whether a login succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request, turning non-success statuses into errors carrying
    /// the server's message.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.context("Request failed")?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            bail!("Server returned {}: {}", status, message);
        }
        response.json().await.context("Unreadable response body")
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// Logs in and keeps the token for later requests.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let request = CredentialsRequest::new(Some(username.to_string()), Some(password.to_string()));
        let TokenView { token } = self.post("/api/auth/login", &request).await?;
        self.token = Some(token);
        info!("Logged in");
        Ok(())
    }

    /// Fetches the logged-in account's profile.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<ProfileView> {
        self.send(self.client.get(self.url("/api/auth/profile"))).await
    }
}

#[async_trait]
impl TriviaBackend for RestTriviaClient {
    #[instrument(skip(self))]
    async fn start_round(&mut self) -> Result<RoundView> {
        let request = StartRoundRequest {
            creature_type: self.creature_type.clone(),
        };
        let view: RoundView = self.post("/api/game/rounds", &request).await?;
        debug!(round_id = %view.id, "Remote round started");
        Ok(view)
    }

    #[instrument(skip(self, text))]
    async fn guess(&mut self, round: RoundId, text: &str) -> Result<GuessOutcome> {
        let request = GuessRequest::new(text.to_string());
        self.post(&format!("/api/game/rounds/{}/guess", round), &request)
            .await
    }

    #[instrument(skip(self))]
    async fn hint(&mut self, round: RoundId) -> Result<HintOutcome> {
        self.send(
            self.client
                .post(self.url(&format!("/api/game/rounds/{}/hint", round))),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn finish(&mut self, round: RoundId) -> Result<Option<CompleteView>> {
        if !self.is_authenticated() {
            debug!("Anonymous session, round left to expire");
            return Ok(None);
        }
        let view = self
            .send(
                self.client
                    .post(self.url(&format!("/api/game/rounds/{}/complete", round))),
            )
            .await?;
        Ok(Some(view))
    }
}
