use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::tprintln;

use super::profile::{Profile, Role};
use super::provider::{AuthBackend, AuthError, AuthEvent, AuthSession};

/// Lifecycle phase of the session machine. Cycles for the life of the
/// process; there is no terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unresolved,
    Resolving,
    Authenticated,
    Unauthenticated,
}

/// Point-in-time view of the session, handed to the router and views.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub actor: Option<Profile>,
    pub access_token: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self { phase: SessionPhase::Unresolved, actor: None, access_token: None }
    }
}

impl SessionSnapshot {
    fn unauthenticated() -> Self {
        Self { phase: SessionPhase::Unauthenticated, actor: None, access_token: None }
    }

    /// True during initial resolution and credential transitions.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Unresolved | SessionPhase::Resolving)
    }

    /// Never true while `actor` is absent.
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.actor.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.actor.as_ref().map(|a| a.role)
    }
}

struct Inner {
    state: RwLock<SessionSnapshot>,
    // Stamped onto every asynchronous resolution; bumped by logout and each
    // new sign-in so a stale continuation can recognize it lost the race.
    generation: AtomicU64,
    tx: watch::Sender<SessionSnapshot>,
}

/// The single authoritative record of the current actor.
///
/// One writer path (the transition methods below), many readers via
/// [`SessionStore::snapshot`] and the watch channel from
/// [`SessionStore::subscribe`]. An explicit handle, constructed per app run
/// and injected into the router and views.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            inner: Arc::new(Inner {
                state: RwLock::new(SessionSnapshot::default()),
                generation: AtomicU64::new(0),
                tx,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().clone()
    }

    /// Observe state changes. The receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Resolve any existing backend session into local state. Registers the
    /// auth-event listener before requesting the snapshot so a transition
    /// landing between the two calls is not lost.
    pub async fn initialize(&self) {
        let events = self.backend.subscribe();
        self.spawn_event_pump(events);

        self.set_resolving();
        let generation = self.current_generation();
        match self.backend.current_session().await {
            Ok(Some(session)) => self.resolve_profile(session, generation).await,
            Ok(None) => self.apply_if_current(generation, SessionSnapshot::unauthenticated()),
            Err(e) => {
                warn!(error = %e, "initial session resolution failed");
                self.apply_if_current(generation, SessionSnapshot::unauthenticated());
            }
        }
    }

    /// Delegate a credential check to the auth backend. On success the
    /// backend's signed-in event drives an asynchronous profile resolution;
    /// on failure the error is returned and `actor` is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.set_resolving();
        match self.backend.sign_in(email, password).await {
            Ok(_session) => Ok(()),
            Err(e) => {
                self.settle();
                Err(e)
            }
        }
    }

    /// Create a new account. Never sets `actor`: the provider may require
    /// email verification before the account becomes active, and the view
    /// layer surfaces that to the user.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        self.set_resolving();
        let out = self.backend.sign_up(email, password, name).await;
        self.settle();
        out
    }

    /// Clear local state unconditionally, then tell the backend. A failing
    /// backend round-trip must not leave the UI looking authenticated after
    /// the user explicitly asked to log out.
    pub async fn logout(&self) {
        self.apply_signed_out();
        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "backend sign-out failed; local session already cleared");
        }
    }

    /// Re-resolve `actor` from the current backend session, e.g. after a
    /// profile edit.
    pub async fn refresh_profile(&self) {
        let generation = self.current_generation();
        match self.backend.current_session().await {
            Ok(Some(session)) => self.resolve_profile(session, generation).await,
            Ok(None) => self.apply_if_current(generation, SessionSnapshot::unauthenticated()),
            Err(e) => {
                warn!(error = %e, "session re-resolution failed");
                self.apply_if_current(generation, SessionSnapshot::unauthenticated());
            }
        }
    }

    fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    fn advance_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Consume auth events on a dedicated task so a notification is handled
    /// on a later scheduling turn, never inside the emitting call stack.
    fn spawn_event_pump(&self, mut events: mpsc::UnboundedReceiver<AuthEvent>) {
        let store = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    AuthEvent::SignedOut => store.apply_signed_out(),
                    AuthEvent::SignedIn(session) => {
                        let generation = store.advance_generation();
                        store.set_resolving();
                        store.resolve_profile(session, generation).await;
                    }
                }
            }
        });
    }

    /// Fetch the profile behind `session` and apply the outcome, unless a
    /// later logout/login superseded this resolution. Any fetch failure
    /// degrades to unauthenticated: access is never granted on an ambiguous
    /// profile-fetch failure.
    async fn resolve_profile(&self, session: AuthSession, generation: u64) {
        match self.backend.fetch_profile(&session).await {
            Ok(profile) => {
                debug!(user = %profile.id, role = profile.role.as_str(), "session authenticated");
                self.apply_if_current(
                    generation,
                    SessionSnapshot {
                        phase: SessionPhase::Authenticated,
                        actor: Some(profile),
                        access_token: Some(session.access_token),
                    },
                );
            }
            Err(e) => {
                warn!(error = %e, "profile fetch failed; treating session as absent");
                self.apply_if_current(generation, SessionSnapshot::unauthenticated());
            }
        }
    }

    /// Authoritative signed-out transition: supersedes any in-flight
    /// resolution and clears state immediately.
    fn apply_signed_out(&self) {
        self.advance_generation();
        let snapshot = SessionSnapshot::unauthenticated();
        let mut state = self.inner.state.write();
        *state = snapshot.clone();
        self.inner.tx.send_replace(snapshot);
    }

    fn apply_if_current(&self, generation: u64, snapshot: SessionSnapshot) {
        let mut state = self.inner.state.write();
        if self.current_generation() != generation {
            tprintln!(
                "session.resolve discarded: generation {} superseded by {}",
                generation,
                self.current_generation()
            );
            return;
        }
        *state = snapshot.clone();
        self.inner.tx.send_replace(snapshot);
    }

    /// Enter the loading phase without touching `actor`.
    fn set_resolving(&self) {
        let mut state = self.inner.state.write();
        state.phase = SessionPhase::Resolving;
        let snapshot = state.clone();
        self.inner.tx.send_replace(snapshot);
    }

    /// Leave the loading phase, keeping whatever actor is present.
    fn settle(&self) {
        let mut state = self.inner.state.write();
        state.phase = if state.actor.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        };
        let snapshot = state.clone();
        self.inner.tx.send_replace(snapshot);
    }
}
