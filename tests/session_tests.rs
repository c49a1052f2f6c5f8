//! Session store integration tests: the full state machine against the
//! in-process auth backend, plus stub backends for the failure and race
//! paths. Positive and negative paths both exercised.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;

use earnvra::identity::{
    AuthBackend, AuthError, AuthEvent, AuthSession, LocalAuthBackend, Profile, Role,
    SessionPhase, SessionSnapshot, SessionStore,
};

/// Wait for the store to leave its loading phase and return the settled
/// snapshot.
async fn settle(store: &SessionStore) -> SessionSnapshot {
    let mut rx = store.subscribe();
    for _ in 0..200 {
        let snap = store.snapshot();
        if !snap.is_loading() {
            return snap;
        }
        let _ = tokio::time::timeout(Duration::from_millis(250), rx.changed()).await;
    }
    store.snapshot()
}

fn seeded_backend() -> Arc<LocalAuthBackend> {
    let backend = LocalAuthBackend::new();
    backend.register("alice@earnvra.com", "s3cr3t!", "Alice", Role::User).unwrap();
    backend.register("root@earnvra.com", "adminpw", "Root", Role::Admin).unwrap();
    Arc::new(backend)
}

#[tokio::test]
async fn initialize_without_backend_session_lands_unauthenticated() {
    let store = SessionStore::new(seeded_backend());
    assert_eq!(store.snapshot().phase, SessionPhase::Unresolved);

    store.initialize().await;
    let snap = settle(&store).await;
    assert_eq!(snap.phase, SessionPhase::Unauthenticated);
    assert!(snap.actor.is_none());
    assert!(!snap.is_authenticated());
    assert!(!snap.is_loading());
}

#[tokio::test]
async fn initialize_resolves_an_existing_backend_session() {
    let backend = seeded_backend();
    backend.sign_in("alice@earnvra.com", "s3cr3t!").await.unwrap();

    let store = SessionStore::new(backend);
    store.initialize().await;
    let snap = settle(&store).await;
    assert!(snap.is_authenticated());
    assert_eq!(snap.role(), Some(Role::User));
    assert_eq!(snap.actor.unwrap().email, "alice@earnvra.com");
    assert!(snap.access_token.is_some());
}

#[tokio::test]
async fn login_resolves_the_profile_asynchronously() {
    let store = SessionStore::new(seeded_backend());
    store.initialize().await;
    settle(&store).await;

    store.login("alice@earnvra.com", "s3cr3t!").await.unwrap();
    let snap = settle(&store).await;
    assert!(snap.is_authenticated());
    let actor = snap.actor.unwrap();
    assert_eq!(actor.name, "Alice");
    assert_eq!(actor.role, Role::User);
    assert!(actor.referral_code.is_some());
}

#[tokio::test]
async fn failed_login_returns_the_error_and_leaves_state_untouched() {
    let store = SessionStore::new(seeded_backend());
    store.initialize().await;
    settle(&store).await;

    let err = store.login("alice@earnvra.com", "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);

    let snap = settle(&store).await;
    assert_eq!(snap.phase, SessionPhase::Unauthenticated);
    assert!(snap.actor.is_none());
    assert!(!snap.is_loading());
}

#[tokio::test]
async fn signup_succeeds_without_setting_the_actor() {
    let store = SessionStore::new(seeded_backend());
    store.initialize().await;
    settle(&store).await;

    store.signup("new@earnvra.com", "pw123456", "Newcomer").await.unwrap();
    let snap = settle(&store).await;
    assert!(snap.actor.is_none(), "signup must not authenticate");
    assert!(!snap.is_loading());

    // The created account can log in afterwards.
    store.login("new@earnvra.com", "pw123456").await.unwrap();
    let snap = settle(&store).await;
    assert!(snap.is_authenticated());
}

#[tokio::test]
async fn duplicate_signup_reports_email_taken() {
    let store = SessionStore::new(seeded_backend());
    store.initialize().await;
    settle(&store).await;

    let err = store.signup("alice@earnvra.com", "pw", "Clone").await.unwrap_err();
    assert_eq!(err, AuthError::EmailAlreadyRegistered);
}

#[tokio::test]
async fn login_then_logout_always_ends_signed_out() {
    let store = SessionStore::new(seeded_backend());
    store.initialize().await;
    settle(&store).await;

    store.login("alice@earnvra.com", "s3cr3t!").await.unwrap();
    settle(&store).await;
    store.logout().await;

    let snap = settle(&store).await;
    assert_eq!(snap.phase, SessionPhase::Unauthenticated);
    assert!(snap.actor.is_none());
    assert!(snap.access_token.is_none());
}

/// Delegating backend whose sign-out always fails: local state must still
/// clear when the user explicitly asks to log out.
struct BrokenSignOut(LocalAuthBackend);

#[async_trait::async_trait]
impl AuthBackend for BrokenSignOut {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        self.0.current_session().await
    }
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.0.sign_in(email, password).await
    }
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        self.0.sign_up(email, password, name).await
    }
    async fn sign_out(&self) -> Result<()> {
        Err(anyhow!("backend unreachable"))
    }
    async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile> {
        self.0.fetch_profile(session).await
    }
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        self.0.subscribe()
    }
}

#[tokio::test]
async fn logout_clears_locally_even_when_the_backend_call_fails() {
    let inner = LocalAuthBackend::new();
    inner.register("alice@earnvra.com", "s3cr3t!", "Alice", Role::User).unwrap();
    let store = SessionStore::new(Arc::new(BrokenSignOut(inner)));
    store.initialize().await;
    settle(&store).await;

    store.login("alice@earnvra.com", "s3cr3t!").await.unwrap();
    let snap = settle(&store).await;
    assert!(snap.is_authenticated());

    store.logout().await;
    let snap = store.snapshot();
    assert_eq!(snap.phase, SessionPhase::Unauthenticated);
    assert!(snap.actor.is_none());
    assert!(snap.access_token.is_none());
}

/// Delegating backend with a slow profile fetch, to race resolutions
/// against logout.
struct SlowProfile {
    inner: LocalAuthBackend,
    delay: Duration,
}

#[async_trait::async_trait]
impl AuthBackend for SlowProfile {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        self.inner.current_session().await
    }
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.inner.sign_in(email, password).await
    }
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        self.inner.sign_up(email, password, name).await
    }
    async fn sign_out(&self) -> Result<()> {
        self.inner.sign_out().await
    }
    async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_profile(session).await
    }
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        self.inner.subscribe()
    }
}

#[tokio::test(start_paused = true)]
async fn stale_profile_fetch_never_resurrects_logout() {
    let inner = LocalAuthBackend::new();
    inner.register("alice@earnvra.com", "s3cr3t!", "Alice", Role::User).unwrap();
    let store = SessionStore::new(Arc::new(SlowProfile {
        inner,
        delay: Duration::from_millis(300),
    }));
    store.initialize().await;
    settle(&store).await;

    // Sign in; the profile fetch is now in flight for 300ms.
    store.login("alice@earnvra.com", "s3cr3t!").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.snapshot().is_loading());

    // Logout supersedes the in-flight resolution.
    store.logout().await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let snap = store.snapshot();
    assert_eq!(snap.phase, SessionPhase::Unauthenticated);
    assert!(snap.actor.is_none(), "stale resolution must be discarded");
}

/// Backend whose initial snapshot is both slow and blind: a sign-in landing
/// between subscribe and the snapshot response only reaches the store
/// through the event channel.
struct SlowEmptySnapshot {
    inner: LocalAuthBackend,
    delay: Duration,
}

#[async_trait::async_trait]
impl AuthBackend for SlowEmptySnapshot {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.inner.sign_in(email, password).await
    }
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        self.inner.sign_up(email, password, name).await
    }
    async fn sign_out(&self) -> Result<()> {
        self.inner.sign_out().await
    }
    async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile> {
        self.inner.fetch_profile(session).await
    }
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        self.inner.subscribe()
    }
}

#[tokio::test(start_paused = true)]
async fn sign_in_during_initial_snapshot_is_not_lost() {
    let inner = LocalAuthBackend::new();
    inner.register("alice@earnvra.com", "s3cr3t!", "Alice", Role::User).unwrap();
    let backend = Arc::new(SlowEmptySnapshot { inner, delay: Duration::from_millis(200) });
    let store = SessionStore::new(backend.clone());

    let init = {
        let store = store.clone();
        tokio::spawn(async move { store.initialize().await })
    };
    // Let initialize register its listener and start the snapshot call,
    // then sign in while that call is still in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    backend.sign_in("alice@earnvra.com", "s3cr3t!").await.unwrap();
    init.await.unwrap();

    let snap = settle(&store).await;
    assert!(
        snap.is_authenticated(),
        "the signed-in event must win over the stale empty snapshot"
    );
    assert_eq!(snap.actor.unwrap().email, "alice@earnvra.com");
}

/// Backend where the profile fetch always fails: ambiguity must never grant
/// access.
struct NoProfile(LocalAuthBackend);

#[async_trait::async_trait]
impl AuthBackend for NoProfile {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        self.0.current_session().await
    }
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.0.sign_in(email, password).await
    }
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        self.0.sign_up(email, password, name).await
    }
    async fn sign_out(&self) -> Result<()> {
        self.0.sign_out().await
    }
    async fn fetch_profile(&self, _session: &AuthSession) -> Result<Profile> {
        Err(anyhow!("profile service down"))
    }
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        self.0.subscribe()
    }
}

#[tokio::test]
async fn profile_fetch_failure_degrades_to_unauthenticated() {
    let inner = LocalAuthBackend::new();
    inner.register("alice@earnvra.com", "s3cr3t!", "Alice", Role::User).unwrap();
    inner.sign_in("alice@earnvra.com", "s3cr3t!").await.unwrap();

    let store = SessionStore::new(Arc::new(NoProfile(inner)));
    store.initialize().await;
    let snap = settle(&store).await;
    assert_eq!(snap.phase, SessionPhase::Unauthenticated);
    assert!(snap.actor.is_none());
}

#[tokio::test]
async fn refresh_profile_keeps_the_session_current() {
    let backend = seeded_backend();
    let store = SessionStore::new(backend.clone());
    store.initialize().await;
    settle(&store).await;

    store.login("root@earnvra.com", "adminpw").await.unwrap();
    settle(&store).await;

    store.refresh_profile().await;
    let snap = settle(&store).await;
    assert!(snap.is_authenticated());
    assert_eq!(snap.role(), Some(Role::Admin));
    assert!(snap.actor.unwrap().referral_code.is_none());
}
