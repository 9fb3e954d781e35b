use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{FailureKind, RequestError};

/// Source of bearer tokens, looked up by key.
pub trait CredentialStore: Send + Sync {
    fn bearer_token(&self, key: &str) -> Option<String>;
}

/// In-memory store, for tests and embedders that manage tokens themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    tokens: RwLock<BTreeMap<String, String>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(key: impl Into<String>, token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(key, token);
        store
    }

    pub fn set(&self, key: impl Into<String>, token: impl Into<String>) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(key.into(), token.into());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(key);
        }
    }
}

impl CredentialStore for MemoryCredentials {
    fn bearer_token(&self, key: &str) -> Option<String> {
        self.tokens.read().ok()?.get(key).cloned()
    }
}

/// Fails closed: a missing or blank token is an error, never an anonymous request.
pub(crate) fn require_token(store: &dyn CredentialStore, key: &str) -> Result<String, RequestError> {
    store
        .bearer_token(key)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            RequestError::new(
                FailureKind::MissingCredential,
                format!("no bearer token stored under `{key}`"),
            )
        })
}
