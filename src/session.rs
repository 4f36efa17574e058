use crate::error::ClientError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Keys stored in session-scoped storage. The token gates every
/// authenticated operation; the rest are profile display fields.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const ROLE: &str = "role";
    pub const GITHUB: &str = "github";
    pub const LINKEDIN: &str = "linkedin";
    pub const PROFILE: &str = "profile";
}

/// Minimal view of the host's session-scoped key/value storage
/// (`sessionStorage` in a browser). `clear` drops every key at once.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self);
}

/// In-memory store, used headless and in tests.
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn clear(&self) {
        self.values.lock().unwrap().clear();
    }
}

/// Fields persisted when a login succeeds.
#[derive(Debug, Clone)]
pub struct AuthProfile {
    pub token: String,
    pub username: String,
    pub role: String,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub avatar: Option<String>,
}

/// Shared handle over the session store. The token's presence is the
/// precondition for every authenticated call in the core.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(keys::TOKEN).filter(|t| !t.is_empty())
    }

    pub fn require_token(&self) -> Result<String, ClientError> {
        self.token().ok_or(ClientError::AuthRequired)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn username(&self) -> Option<String> {
        self.store.get(keys::USER)
    }

    pub fn role(&self) -> Option<String> {
        self.store.get(keys::ROLE)
    }

    pub fn set_token(&self, token: &str) {
        self.store.set(keys::TOKEN, token);
    }

    /// Persist a successful login. Optional profile fields are stored as
    /// empty strings so later reads never distinguish "unset" from "cleared".
    pub fn begin(&self, profile: &AuthProfile) {
        self.store.set(keys::TOKEN, &profile.token);
        self.store.set(keys::USER, &profile.username);
        self.store.set(keys::ROLE, &profile.role);
        self.store
            .set(keys::GITHUB, profile.github.as_deref().unwrap_or(""));
        self.store
            .set(keys::LINKEDIN, profile.linkedin.as_deref().unwrap_or(""));
        self.store
            .set(keys::PROFILE, profile.avatar.as_deref().unwrap_or(""));
    }

    /// Logout: every key goes at once.
    pub fn end(&self) {
        self.store.clear();
    }
}
