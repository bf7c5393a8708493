//! In-memory token store.
//!
//! Default store for single-process deployments and tests. One mutex
//! guards both maps, so an issue racing a verify for the same pair is seen
//! either entirely before or entirely after it.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::Error;

use super::{TokenPurpose, TokenStore, generate_link_key, generate_short_code, hash_token};

const DEFAULT_SHORT_CODE_LENGTH: usize = 6;

#[derive(Debug)]
struct StoredToken {
    value_hash: Vec<u8>,
    expires_at: Instant,
}

#[derive(Debug)]
struct LinkEntry {
    identity: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Maps {
    tokens: HashMap<(TokenPurpose, String), StoredToken>,
    // Long-link lookup: key hash -> identity, maintained alongside tokens.
    link_keys: HashMap<Vec<u8>, LinkEntry>,
}

impl Maps {
    fn prune(&mut self, now: Instant) {
        self.tokens.retain(|_, token| token.expires_at > now);
        self.link_keys.retain(|_, entry| entry.expires_at > now);
    }
}

/// TTL-enforcing token store backed by process memory.
#[derive(Debug)]
pub struct InMemoryTokenStore {
    short_code_length: usize,
    inner: Mutex<Maps>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            short_code_length: DEFAULT_SHORT_CODE_LENGTH,
            inner: Mutex::new(Maps::default()),
        }
    }

    #[must_use]
    pub fn with_short_code_length(mut self, length: usize) -> Self {
        self.short_code_length = length.max(1);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Maps> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn issue(
        &self,
        identity: &str,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, Error> {
        let value = match purpose {
            TokenPurpose::Short => generate_short_code(self.short_code_length)?,
            TokenPurpose::Long => generate_link_key()?,
        };
        let value_hash = hash_token(&value);
        let now = Instant::now();
        let expires_at = now + ttl;

        let mut maps = self.lock();
        maps.prune(now);
        if purpose == TokenPurpose::Long {
            // Drop the superseded key's lookup entry before adding the new one.
            maps.link_keys.retain(|_, entry| entry.identity != identity);
            maps.link_keys.insert(
                value_hash.clone(),
                LinkEntry {
                    identity: identity.to_string(),
                    expires_at,
                },
            );
        }
        maps.tokens.insert(
            (purpose, identity.to_string()),
            StoredToken {
                value_hash,
                expires_at,
            },
        );
        Ok(value)
    }

    fn verify(
        &self,
        purpose: TokenPurpose,
        identity: &str,
        candidate: &str,
    ) -> Result<bool, Error> {
        let candidate_hash = hash_token(candidate);
        let now = Instant::now();
        let maps = self.lock();
        Ok(maps
            .tokens
            .get(&(purpose, identity.to_string()))
            .filter(|token| token.expires_at > now)
            .is_some_and(|token| token.value_hash == candidate_hash))
    }

    fn revoke(&self, purpose: TokenPurpose, identity: &str) -> Result<(), Error> {
        let mut maps = self.lock();
        maps.tokens.remove(&(purpose, identity.to_string()));
        if purpose == TokenPurpose::Long {
            maps.link_keys.retain(|_, entry| entry.identity != identity);
        }
        Ok(())
    }

    fn resolve_identity(&self, key: &str) -> Result<Option<String>, Error> {
        let key_hash = hash_token(key);
        let now = Instant::now();
        let maps = self.lock();
        Ok(maps
            .link_keys
            .get(&key_hash)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.identity.clone()))
    }
}
