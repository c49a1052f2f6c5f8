use std::collections::HashMap;

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::Engine;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use password_hash::{PasswordHash, SaltString};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::tprintln;

use super::profile::{Profile, Role};

/// A live backend auth session: the opaque token attached as a bearer header
/// plus the id of the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub access_token: String,
}

/// Auth-state notification pushed by a backend to its subscribers.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    SignedOut,
}

/// Typed failure of the credential operations. Network problems carry the
/// underlying message so views can show it near the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailAlreadyRegistered,

    #[error("network: {0}")]
    Network(String),
}

/// The external auth collaborator consumed by the session store.
///
/// `subscribe` must be callable before any other operation so a listener can
/// be registered ahead of the initial session snapshot.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolve the currently live backend session, if any.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Create a new account. Never signs the caller in: provider-side email
    /// verification may be required before the account becomes active.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<()>;

    /// Fetch the profile behind a session. Failures are treated as "no
    /// session" by the store (fail-closed).
    async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile>;

    /// Register an auth-state listener. Events are delivered for every
    /// sign-in/sign-out the backend observes after this call.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent>;
}

/// Fan-out of auth events to every registered subscriber.
pub(super) struct EventHub {
    senders: Mutex<Vec<mpsc::UnboundedSender<AuthEvent>>>,
}

impl EventHub {
    pub(super) fn new() -> Self {
        Self { senders: Mutex::new(Vec::new()) }
    }

    pub(super) fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        rx
    }

    pub(super) fn emit(&self, event: AuthEvent) {
        // Drop subscribers whose receiver side is gone.
        self.senders.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn gen_token() -> String {
    // 256-bit random token, base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

struct Account {
    profile: Profile,
    password_hash: String,
}

/// In-process auth backend: an account registry with Argon2 PHC passwords and
/// opaque random tokens. Used by the test suites and by the shell's offline
/// demo mode; the HTTP backend is the production collaborator.
pub struct LocalAuthBackend {
    accounts: RwLock<HashMap<String, Account>>,
    // token -> user_id for every session this backend has issued and not revoked
    sessions: RwLock<HashMap<String, String>>,
    current: RwLock<Option<AuthSession>>,
    hub: EventHub,
}

impl LocalAuthBackend {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            hub: EventHub::new(),
        }
    }

    /// Create an account directly, bypassing signup. Returns the stored
    /// profile. Used to seed demo/test accounts.
    pub fn register(&self, email: &str, password: &str, name: &str, role: Role) -> Result<Profile> {
        let key = email.to_ascii_lowercase();
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&key) {
            return Err(anyhow!("account exists: {}", email));
        }
        let id = Uuid::new_v4().to_string();
        let referral_code = match role {
            Role::User => Some(referral_code_for(&id)),
            Role::Admin => None,
        };
        let profile = Profile {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role,
            age: None,
            gender: None,
            country: None,
            referral_code,
            created_at: Utc::now(),
        };
        let phc = hash_password(password)?;
        accounts.insert(key, Account { profile: profile.clone(), password_hash: phc });
        tprintln!("auth.register email={} role={}", email, role.as_str());
        Ok(profile)
    }
}

impl Default for LocalAuthBackend {
    fn default() -> Self { Self::new() }
}

fn referral_code_for(id: &str) -> String {
    let tail: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("EARN{}", tail)
}

#[async_trait::async_trait]
impl AuthBackend for LocalAuthBackend {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.current.read().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let key = email.to_ascii_lowercase();
        let user_id = {
            let accounts = self.accounts.read();
            let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
            if !verify_password(&account.password_hash, password) {
                return Err(AuthError::InvalidCredentials);
            }
            account.profile.id.clone()
        };
        let session = AuthSession { user_id: user_id.clone(), access_token: gen_token() };
        self.sessions.write().insert(session.access_token.clone(), user_id);
        *self.current.write() = Some(session.clone());
        tprintln!("auth.sign_in email={}", email);
        self.hub.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        let key = email.to_ascii_lowercase();
        if self.accounts.read().contains_key(&key) {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        self.register(email, password, name, Role::User)
            .map_err(|e| AuthError::Network(e.to_string()))?;
        // No session and no event: the account is created, the caller still
        // has to log in.
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.current.write().take() {
            self.sessions.write().remove(&session.access_token);
        }
        self.hub.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile> {
        let sessions = self.sessions.read();
        let user_id = sessions
            .get(&session.access_token)
            .ok_or_else(|| anyhow!("unknown or revoked session token"))?;
        let accounts = self.accounts.read();
        let account = accounts
            .values()
            .find(|a| &a.profile.id == user_id)
            .ok_or_else(|| anyhow!("no account for session user {}", user_id))?;
        Ok(account.profile.clone())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        self.hub.subscribe()
    }
}
