use anyhow::{anyhow, Context, Result};
use parking_lot::RwLock;
use reqwest::Url;
use tokio::sync::mpsc;

use crate::tprintln;

use super::profile::Profile;
use super::provider::{AuthBackend, AuthError, AuthEvent, AuthSession, EventHub};

/// Auth collaborator backed by the platform's HTTP auth endpoints.
///
/// The backend keeps the live session in memory and emits
/// `SignedIn`/`SignedOut` events from its own call outcomes; there is no
/// server push channel, which matches how the original client library
/// notifies its listeners.
pub struct HttpAuthBackend {
    base: String,
    http: reqwest::Client,
    current: RwLock<Option<AuthSession>>,
    hub: EventHub,
}

impl HttpAuthBackend {
    pub fn new(base: &str) -> Result<Self> {
        Url::parse(base).context("invalid auth base URL")?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            current: RwLock::new(None),
            hub: EventHub::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Pull a human-readable message out of an error body, falling back to
    /// the HTTP status line.
    async fn error_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::json!({}));
        body.get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("HTTP {}", status))
    }
}

#[async_trait::async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(session) = self.current.read().clone() else { return Ok(None) };
        let resp = self
            .http
            .get(self.url("/auth/session"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token no longer valid server-side; forget it.
            *self.current.write() = None;
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(anyhow!("session check failed: HTTP {}", resp.status()));
        }
        let refreshed: AuthSession = resp.json().await?;
        *self.current.write() = Some(refreshed.clone());
        Ok(Some(refreshed))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::Network(Self::error_message(resp).await));
        }
        let session: AuthSession = resp.json().await.map_err(|e| AuthError::Network(e.to_string()))?;
        *self.current.write() = Some(session.clone());
        tprintln!("auth.sign_in(http) email={}", email);
        self.hub.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        let resp = self
            .http
            .post(self.url("/auth/signup"))
            .json(&serde_json::json!({ "email": email, "password": password, "name": name }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        if !status.is_success() {
            return Err(AuthError::Network(Self::error_message(resp).await));
        }
        // Account created; the backend may still hold it pending email
        // confirmation, so no session is established here.
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let session = self.current.write().take();
        self.hub.emit(AuthEvent::SignedOut);
        if let Some(session) = session {
            let resp = self
                .http
                .post(self.url("/auth/logout"))
                .bearer_auth(&session.access_token)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(anyhow!("sign-out failed: HTTP {}", resp.status()));
            }
        }
        Ok(())
    }

    async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile> {
        let resp = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("profile fetch failed: HTTP {}", resp.status()));
        }
        Ok(resp.json().await?)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        self.hub.subscribe()
    }
}
