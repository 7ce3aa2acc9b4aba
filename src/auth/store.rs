// Credential storage
// The pipeline never persists tokens itself; it reads and writes through
// this interface so the surrounding application decides where they live.

use std::sync::Mutex;

/// Token storage consumed by the session guard
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Replace both tokens after a successful refresh or login
    fn set_tokens(&self, access_token: &str, refresh_token: &str);

    /// Drop both tokens (forced logout)
    fn clear(&self);
}

#[derive(Debug, Default, Clone)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-memory store, one session per process
#[derive(Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        store.set_tokens(access_token, refresh_token);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredTokens> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.lock().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock().refresh.clone()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        let mut tokens = self.lock();
        tokens.access = Some(access_token.to_string());
        tokens.refresh = Some(refresh_token.to_string());
    }

    fn clear(&self) {
        let mut tokens = self.lock();
        tokens.access = None;
        tokens.refresh = None;
    }
}
