//! API client integration tests against an in-process axum app standing in
//! for the platform backend: bearer-token attachment, error mapping, and
//! payload round-trips.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use earnvra::api::{ApiClient, ApiError, NoAuth, TokenSource};
use earnvra::identity::{LocalAuthBackend, Role, SessionStore};
use earnvra::redeem::RedeemMethod;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

struct StaticToken(&'static str);

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[tokio::test]
async fn bearer_header_is_attached_when_a_token_is_available() {
    async fn offers(headers: HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != "Bearer tok-123" {
            return Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "missing token" }))));
        }
        Ok(Json(json!([
            {
                "id": "o-1",
                "title": "Quick survey",
                "description": "Five questions about shopping habits",
                "points": 150,
                "type": "survey",
                "estimated_time": "5 min"
            }
        ])))
    }

    let base = serve(Router::new().route("/api/offers", get(offers))).await;
    let api = ApiClient::new(&base, Arc::new(StaticToken("tok-123"))).unwrap();

    let offers = api.offers().await.unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].points, 150);
}

#[tokio::test]
async fn anonymous_requests_omit_the_authorization_header() {
    async fn settings(headers: HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        if headers.contains_key("authorization") {
            return Err((StatusCode::BAD_REQUEST, Json(json!({ "message": "unexpected auth" }))));
        }
        Ok(Json(json!({
            "referral_bonus_points": 100,
            "min_redeem_points": 500,
            "daily_earning_cap": 1000,
            "survey_point_multiplier": 1.0,
            "video_ad_points": 25
        })))
    }

    let base = serve(Router::new().route("/api/settings", get(settings))).await;
    let api = ApiClient::new(&base, Arc::new(NoAuth)).unwrap();

    let settings = api.settings().await.unwrap();
    assert_eq!(settings.min_redeem_points, 500);
}

#[tokio::test]
async fn non_2xx_maps_to_a_server_error_with_the_backend_message() {
    async fn stats() -> (StatusCode, Json<Value>) {
        (StatusCode::FORBIDDEN, Json(json!({ "message": "admins only" })))
    }

    let base = serve(Router::new().route("/api/admin/stats", get(stats))).await;
    let api = ApiClient::new(&base, Arc::new(NoAuth)).unwrap();

    match api.admin_stats().await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "admins only");
        }
        other => panic!("expected server error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn error_bodies_without_a_message_fall_back_to_a_generic_one() {
    async fn wallet() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    let base = serve(Router::new().route("/api/wallet", get(wallet))).await;
    let api = ApiClient::new(&base, Arc::new(NoAuth)).unwrap();

    match api.wallet().await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Request failed");
        }
        other => panic!("expected server error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn redeem_submission_round_trips() {
    async fn redeem(Json(body): Json<Value>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        if body["points"] != json!(500)
            || body["method"] != json!("paypal")
            || body["details"]["account"] != json!("demo@earnvra.com")
        {
            return Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "bad body" }))));
        }
        Ok(Json(json!({ "id": "r-77", "status": "pending" })))
    }

    let base = serve(Router::new().route("/api/redeem", post(redeem))).await;
    let api = ApiClient::new(&base, Arc::new(StaticToken("tok-123"))).unwrap();

    let request = earnvra::redeem::RedemptionRequest {
        points: 500,
        method: Some(RedeemMethod::Paypal),
        account_details: "demo@earnvra.com".into(),
    };
    let submission = earnvra::api::RedeemSubmission::from_request(&request).unwrap();
    let receipt = api.request_redeem(&submission).await.unwrap();
    assert_eq!(receipt.id, "r-77");
    assert_eq!(receipt.status, "pending");
}

#[tokio::test]
async fn provider_toggle_patches_the_right_resource() {
    async fn toggle(
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        if id != "p-9" || body != json!({ "is_enabled": false }) {
            return Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "bad patch" }))));
        }
        Ok(Json(json!({
            "id": "p-9",
            "name": "AdGem",
            "is_enabled": false,
            "offer_count": 12,
            "created_at": "2025-01-15T00:00:00Z"
        })))
    }

    let base = serve(Router::new().route("/api/admin/providers/{id}", patch(toggle))).await;
    let api = ApiClient::new(&base, Arc::new(StaticToken("tok-123"))).unwrap();

    let provider = api.admin_toggle_provider("p-9", false).await.unwrap();
    assert!(!provider.is_enabled);
    assert_eq!(provider.name, "AdGem");
}

#[tokio::test]
async fn the_session_store_supplies_the_live_bearer_token() {
    type Seen = Arc<Mutex<Option<String>>>;

    async fn profile(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        *seen.lock() = auth;
        Json(json!({
            "id": "u-1",
            "email": "alice@earnvra.com",
            "name": "Alice",
            "role": "user",
            "referral_code": "EARNABC123",
            "created_at": "2025-06-01T00:00:00Z"
        }))
    }

    let seen: Seen = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route("/api/profile", get(profile))
        .with_state(seen.clone());
    let base = serve(app).await;

    let backend = LocalAuthBackend::new();
    backend.register("alice@earnvra.com", "s3cr3t!", "Alice", Role::User).unwrap();
    let store = SessionStore::new(Arc::new(backend));
    store.initialize().await;
    store.login("alice@earnvra.com", "s3cr3t!").await.unwrap();

    // Wait for the asynchronous profile resolution to settle.
    let mut rx = store.subscribe();
    for _ in 0..100 {
        if !store.snapshot().is_loading() {
            break;
        }
        let _ = tokio::time::timeout(Duration::from_millis(250), rx.changed()).await;
    }
    let token = store.snapshot().access_token.expect("logged-in session has a token");

    let api = ApiClient::new(&base, Arc::new(store.clone())).unwrap();
    let fetched = api.profile().await.unwrap();
    assert_eq!(fetched.email, "alice@earnvra.com");
    assert_eq!(seen.lock().as_deref(), Some(format!("Bearer {}", token).as_str()));
}
