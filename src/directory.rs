//! User directory and password encoder collaborator boundaries.
//!
//! The flow never talks to storage directly; it goes through
//! [`UserDirectory`], and all digest work goes through [`PasswordEncoder`].
//! Both are constructor-injected so the enclosing service decides where
//! users live and which hashing algorithm is in force.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::error::Error;
use crate::policy::PasswordPolicy;

/// A user record as the directory hands it to the flow.
///
/// `password_digest` is the stored one-way hash; the flow replaces it
/// through [`UserDirectory::update`] and never reads a plaintext from it.
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub login_name: String,
    pub real_name: String,
    pub email: String,
    /// Authentication is owned by an external provider (e.g. LDAP); such
    /// accounts cannot have a local password reset.
    pub delegated: bool,
    pub password_digest: String,
}

impl User {
    #[must_use]
    pub fn new(login_name: &str, real_name: &str, email: &str, password_digest: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            login_name: login_name.to_string(),
            real_name: real_name.to_string(),
            email: email.to_string(),
            delegated: false,
            password_digest: password_digest.to_string(),
        }
    }

    #[must_use]
    pub fn with_delegated(mut self, delegated: bool) -> Self {
        self.delegated = delegated;
        self
    }
}

/// User lookup and persistence boundary.
///
/// `update` returns `None` when the record no longer matches the expected
/// state (e.g. the user vanished mid-flow); the flow treats that as a
/// retryable conflict, not success.
pub trait UserDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;
    fn update(&self, user: &User) -> Result<Option<User>, Error>;
    /// Password policy in force for this user's organization.
    fn password_policy(&self, user: &User) -> Result<PasswordPolicy, Error>;
}

/// One-way, salted password hashing boundary. Algorithm choice stays with
/// the implementor; the flow only needs hash and verify.
pub trait PasswordEncoder: Send + Sync {
    fn hash(&self, plaintext: &SecretString) -> Result<String, Error>;
    fn matches(&self, plaintext: &SecretString, digest: &str) -> bool;
}

/// Default encoder: salted Argon2id with the crate defaults.
#[derive(Clone, Debug, Default)]
pub struct Argon2PasswordEncoder;

impl PasswordEncoder for Argon2PasswordEncoder {
    fn hash(&self, plaintext: &SecretString) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.expose_secret().as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|_| Error::Hash)
    }

    fn matches(&self, plaintext: &SecretString, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.expose_secret().as_bytes(), &parsed)
            .is_ok()
    }
}
