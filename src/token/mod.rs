//! Proof-token storage boundary.
//!
//! Tokens prove receipt of an out-of-band message. Two shapes exist: a
//! short human-enterable code for in-app verification and a long URL-safe
//! key for emailed deep links. Stores keep only SHA-256 hashes of issued
//! values; comparing hashes also removes value-dependent timing from
//! verification.

mod memory;

pub use memory::InMemoryTokenStore;

use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::error::Error;

const SHORT_CODE_ALPHABET: &[u8] = b"0123456789";
const LINK_KEY_BYTES: usize = 32;

/// The two proof shapes, with independent lifetimes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    /// Human-enterable verification code.
    Short,
    /// URL-safe key embedded in an emailed deep link.
    Long,
}

/// Key/value store for live proof tokens with per-entry TTL.
///
/// At most one live token exists per (identity, purpose); `issue`
/// overwrites. Implementations must check expiry on every read and surface
/// infrastructure trouble as [`Error::StoreUnavailable`], never as a failed
/// verification.
pub trait TokenStore: Send + Sync {
    /// Generate, store, and return a fresh token value for the pair,
    /// superseding any prior one.
    fn issue(&self, identity: &str, purpose: TokenPurpose, ttl: Duration)
    -> Result<String, Error>;

    /// True iff a live, unexpired token exists for the pair and matches the
    /// candidate.
    fn verify(&self, purpose: TokenPurpose, identity: &str, candidate: &str)
    -> Result<bool, Error>;

    /// Remove the stored token. Revoking an absent token is a no-op.
    fn revoke(&self, purpose: TokenPurpose, identity: &str) -> Result<(), Error>;

    /// Map a long-link key back to its identity, if live. The key is pure
    /// random and only the store can connect it to an identity, so URLs
    /// never embed a decodable form of the email.
    fn resolve_identity(&self, key: &str) -> Result<Option<String>, Error>;
}

/// Generate a short numeric code of the given length.
pub fn generate_short_code(length: usize) -> Result<String, Error> {
    let mut raw = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|_| Error::TokenGeneration)?;
    Ok(raw
        .into_iter()
        .map(|byte| {
            let idx = usize::from(byte) % SHORT_CODE_ALPHABET.len();
            SHORT_CODE_ALPHABET[idx] as char
        })
        .collect())
}

/// Generate a URL-safe link key with 256 bits of randomness.
pub fn generate_link_key() -> Result<String, Error> {
    let mut bytes = [0u8; LINK_KEY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| Error::TokenGeneration)?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a token value for at-rest storage and comparison.
#[must_use]
pub fn hash_token(value: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::{generate_link_key, generate_short_code, hash_token};
    use anyhow::Result;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn short_code_is_numeric_with_requested_length() -> Result<()> {
        let code = generate_short_code(6)?;
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|ch| ch.is_ascii_digit()));
        Ok(())
    }

    #[test]
    fn link_key_decodes_to_32_bytes() -> Result<()> {
        let key = generate_link_key()?;
        let bytes = URL_SAFE_NO_PAD.decode(key.as_bytes())?;
        assert_eq!(bytes.len(), 32);
        Ok(())
    }

    #[test]
    fn link_keys_do_not_repeat() -> Result<()> {
        assert_ne!(generate_link_key()?, generate_link_key()?);
        Ok(())
    }

    #[test]
    fn hash_token_stable() {
        let first = hash_token("token");
        let second = hash_token("token");
        let different = hash_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }
}
