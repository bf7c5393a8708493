//! Infrastructure error taxonomy.
//!
//! These errors cover failures of the machinery underneath a recovery flow
//! (token store, user directory, password encoder). User-input failures are
//! not errors: they are reported inside [`RecoveryOutcome`] so callers can
//! branch on a stable code instead of catching anything.
//!
//! [`RecoveryOutcome`]: crate::flow::RecoveryOutcome

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The token store could not be reached or answered abnormally.
    ///
    /// Never mapped to "token invalid": a wrong code and an unreachable
    /// cache are different signals and callers must be able to tell them
    /// apart.
    #[error("token store unavailable: {0}")]
    StoreUnavailable(String),
    /// The user directory could not be reached or answered abnormally.
    #[error("user directory unavailable: {0}")]
    DirectoryUnavailable(String),
    /// The password encoder failed to produce or parse a digest.
    #[error("password hashing failed")]
    Hash,
    /// The system randomness source failed while generating a token.
    #[error("token generation failed")]
    TokenGeneration,
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn store_unavailable_keeps_cause_in_message() {
        let err = Error::StoreUnavailable("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "token store unavailable: connection refused"
        );
    }

    #[test]
    fn hash_error_has_no_detail() {
        assert_eq!(Error::Hash.to_string(), "password hashing failed");
    }
}
