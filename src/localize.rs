//! Error-code rendering boundary.
//!
//! The flow only ever produces stable codes; turning a code into a human
//! sentence is the enclosing service's job. An English table ships as the
//! default so small deployments need nothing else.

use crate::flow::ErrorCode;
use crate::policy::PolicyViolation;

/// Renders a stable error code into a human-readable message.
pub trait Localizer: Send + Sync {
    fn message(&self, error: &ErrorCode) -> String;
}

/// Built-in English message table.
#[derive(Clone, Debug, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn message(&self, error: &ErrorCode) -> String {
        match error {
            ErrorCode::InvalidEmailFormat => {
                "The email address is not in a valid format.".to_string()
            }
            ErrorCode::AccountNotFound => "No account exists for this email address.".to_string(),
            ErrorCode::DelegatedAccountUnsupported => {
                "This account is managed externally and its password cannot be reset here."
                    .to_string()
            }
            ErrorCode::Throttled => {
                "A message was sent recently. Please wait before requesting another.".to_string()
            }
            ErrorCode::InvalidOrExpiredToken => {
                "The verification code or link is invalid or has expired.".to_string()
            }
            ErrorCode::Policy(violation) => render_violation(violation),
            ErrorCode::UpdateConflict => {
                "The password could not be updated. Please try again.".to_string()
            }
        }
    }
}

fn render_violation(violation: &PolicyViolation) -> String {
    // PolicyViolation's Display impls already carry the user-safe English text.
    format!("The password was rejected: {violation}.")
}

#[cfg(test)]
mod tests {
    use super::{EnglishLocalizer, Localizer};
    use crate::flow::ErrorCode;
    use crate::policy::PolicyViolation;

    #[test]
    fn renders_identity_errors() {
        let localizer = EnglishLocalizer;
        assert!(
            localizer
                .message(&ErrorCode::AccountNotFound)
                .contains("No account")
        );
    }

    #[test]
    fn token_message_does_not_distinguish_expiry_from_mismatch() {
        let localizer = EnglishLocalizer;
        let message = localizer.message(&ErrorCode::InvalidOrExpiredToken);
        assert!(message.contains("invalid or has expired"));
    }

    #[test]
    fn policy_message_names_the_rule() {
        let localizer = EnglishLocalizer;
        let message = localizer.message(&ErrorCode::Policy(PolicyViolation::TooShort { min: 8 }));
        assert!(message.contains("at least 8 characters"));
    }
}
