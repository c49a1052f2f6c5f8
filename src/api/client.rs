use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::identity::{Profile, SessionStore};

use super::types::*;

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

/// Pluggable bearer-token provider, consulted before every request.
/// `None` skips the Authorization header (anonymous request).
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

/// No authentication — public endpoints only.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// The session store is the canonical token source: views never touch
/// tokens directly.
#[async_trait::async_trait]
impl TokenSource for SessionStore {
    async fn bearer_token(&self) -> Option<String> {
        self.snapshot().access_token
    }
}

/// Thin wrapper over the backend HTTP API. Endpoint methods mirror the
/// user and admin surfaces one-to-one.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token_source: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(base: &str, token_source: Arc<dyn TokenSource>) -> Result<Self> {
        Url::parse(base).context("invalid API base URL")?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            token_source,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token_source.bearer_token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a response to a typed value, surfacing non-2xx as
    /// [`ApiError::Server`] with the backend's `message` field when present.
    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::json!({}));
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(ApiError::Server { status: status.as_u16(), message });
        }
        resp.json::<T>().await.map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.authed(self.http.get(self.url(path))).await;
        Self::parse(req.send().await?).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.authed(self.http.post(self.url(path)).json(body)).await;
        Self::parse(req.send().await?).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.authed(self.http.post(self.url(path))).await;
        Self::parse(req.send().await?).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.authed(self.http.put(self.url(path)).json(body)).await;
        Self::parse(req.send().await?).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.authed(self.http.patch(self.url(path)).json(body)).await;
        Self::parse(req.send().await?).await
    }

    // --- User surface ---

    pub async fn offers(&self) -> Result<Vec<Offer>, ApiError> {
        self.get("/offers").await
    }

    pub async fn complete_offer(&self, offer_id: &str) -> Result<OfferCompletion, ApiError> {
        self.post_empty(&format!("/offers/{}/complete", offer_id)).await
    }

    pub async fn wallet(&self) -> Result<WalletData, ApiError> {
        self.get("/wallet").await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.get("/transactions").await
    }

    pub async fn request_redeem(&self, submission: &RedeemSubmission) -> Result<RedeemReceipt, ApiError> {
        self.post("/redeem", submission).await
    }

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.get("/profile").await
    }

    pub async fn update_profile(&self, patch: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.put("/profile", patch).await
    }

    pub async fn referrals(&self) -> Result<ReferralData, ApiError> {
        self.get("/referrals").await
    }

    pub async fn settings(&self) -> Result<Settings, ApiError> {
        self.get("/settings").await
    }

    pub async fn legal(&self, slug: &str) -> Result<LegalContent, ApiError> {
        self.get(&format!("/legal/{}", slug)).await
    }

    pub async fn submit_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, ApiError> {
        self.post("/contact", message).await
    }

    // --- Admin surface ---

    pub async fn admin_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/admin/stats").await
    }

    pub async fn admin_providers(&self) -> Result<Vec<Provider>, ApiError> {
        self.get("/admin/providers").await
    }

    pub async fn admin_toggle_provider(
        &self,
        provider_id: &str,
        enabled: bool,
    ) -> Result<Provider, ApiError> {
        self.patch(
            &format!("/admin/providers/{}", provider_id),
            &serde_json::json!({ "is_enabled": enabled }),
        )
        .await
    }

    pub async fn admin_offers(&self) -> Result<Vec<Offer>, ApiError> {
        self.get("/admin/offers").await
    }

    pub async fn admin_settings(&self) -> Result<Settings, ApiError> {
        self.get("/admin/settings").await
    }

    pub async fn admin_update_settings(&self, patch: &SettingsUpdate) -> Result<Settings, ApiError> {
        self.put("/admin/settings", patch).await
    }

    pub async fn admin_legal(&self, slug: &str) -> Result<LegalContent, ApiError> {
        self.get(&format!("/admin/legal/{}", slug)).await
    }

    pub async fn admin_update_legal(&self, slug: &str, content: &str) -> Result<LegalContent, ApiError> {
        self.put(
            &format!("/admin/legal/{}", slug),
            &serde_json::json!({ "content": content }),
        )
        .await
    }

    pub async fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.get("/admin/users").await
    }

    pub async fn admin_user(&self, user_id: &str) -> Result<AdminUser, ApiError> {
        self.get(&format!("/admin/users/{}", user_id)).await
    }

    pub async fn admin_redemptions(&self) -> Result<Vec<Redemption>, ApiError> {
        self.get("/admin/redemptions").await
    }

    pub async fn admin_update_redemption(
        &self,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<Redemption, ApiError> {
        self.patch(
            &format!("/admin/redemptions/{}", redemption_id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }
}
