//! Result envelope returned by every flow step.
//!
//! Callers branch on this structure, never on exceptions: user-input
//! failures live in `error` with a stable code, infrastructure failures
//! surface as `Err(Error)` from the flow methods instead.

use serde::{Serialize, Serializer};
use std::time::Duration;
use uuid::Uuid;

use crate::directory::User;
use crate::policy::PolicyViolation;

/// Stable, localizable failure codes for user-facing outcomes.
///
/// `InvalidOrExpiredToken` deliberately covers missing, wrong, and expired
/// tokens alike so the response never reveals which case occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidEmailFormat,
    AccountNotFound,
    DelegatedAccountUnsupported,
    Throttled,
    InvalidOrExpiredToken,
    Policy(PolicyViolation),
    /// The directory reported no updated record; the identity no longer
    /// matches the expected state. Retryable, so the token survives.
    UpdateConflict,
}

impl ErrorCode {
    /// Stable identifier for localization lookups.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmailFormat => "email.format.invalid",
            Self::AccountNotFound => "account.not_found",
            Self::DelegatedAccountUnsupported => "account.delegated",
            Self::Throttled => "send.throttled",
            Self::InvalidOrExpiredToken => "token.invalid",
            Self::Policy(violation) => violation.code(),
            Self::UpdateConflict => "account.update_conflict",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Sanitized user data safe to return to the caller. Never carries the
/// digest or any token material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub login_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login_name: user.login_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// The proof a caller presents when applying a new password.
#[derive(Clone, Debug)]
pub enum RecoveryProof {
    /// Short code the user typed from the recovery mail.
    ShortCode(String),
    /// Key extracted from an emailed deep link.
    LinkKey(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct RecoveryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    /// Set only for `Throttled`: seconds until issuance is allowed again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl RecoveryOutcome {
    #[must_use]
    pub fn ok(user: UserSummary) -> Self {
        Self {
            success: true,
            error: None,
            user: Some(user),
            retry_after_seconds: None,
        }
    }

    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
            user: None,
            retry_after_seconds: None,
        }
    }

    #[must_use]
    pub fn failed(error: ErrorCode) -> Self {
        Self {
            success: false,
            error: Some(error),
            user: None,
            retry_after_seconds: None,
        }
    }

    /// Rate-limit signal, not an alarm: reports when the caller may retry.
    #[must_use]
    pub fn throttled(remaining: Duration) -> Self {
        Self {
            success: false,
            error: Some(ErrorCode::Throttled),
            user: None,
            // Round up so "retry after" never undershoots the window.
            retry_after_seconds: Some(remaining.as_secs().saturating_add(u64::from(
                remaining.subsec_nanos() > 0,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, RecoveryOutcome, UserSummary};
    use crate::policy::PolicyViolation;
    use anyhow::Result;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorCode::AccountNotFound.code(), "account.not_found");
        assert_eq!(ErrorCode::InvalidOrExpiredToken.code(), "token.invalid");
        assert_eq!(
            ErrorCode::Policy(PolicyViolation::TooShort { min: 8 }).code(),
            "password.policy.too_short"
        );
    }

    #[test]
    fn throttled_rounds_partial_seconds_up() {
        let outcome = RecoveryOutcome::throttled(Duration::from_millis(59_500));
        assert_eq!(outcome.retry_after_seconds, Some(60));

        let outcome = RecoveryOutcome::throttled(Duration::from_secs(60));
        assert_eq!(outcome.retry_after_seconds, Some(60));
    }

    #[test]
    fn outcome_serializes_codes_not_variants() -> Result<()> {
        let outcome = RecoveryOutcome::failed(ErrorCode::Throttled);
        let json = serde_json::to_string(&outcome)?;
        assert_eq!(json, r#"{"success":false,"error":"send.throttled"}"#);
        Ok(())
    }

    #[test]
    fn success_outcome_carries_sanitized_user() -> Result<()> {
        let summary = UserSummary {
            id: Uuid::nil(),
            login_name: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
        };
        let json = serde_json::to_string(&RecoveryOutcome::ok(summary))?;
        assert!(json.contains(r#""login_name":"jdoe""#));
        assert!(!json.contains("digest"));
        Ok(())
    }
}
