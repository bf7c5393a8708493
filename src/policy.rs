//! Organization password policy and the pure candidate-password validator.
//!
//! Validation is a pure function of (password, user, policy) with a fixed
//! rule order, so two calls with the same inputs always report the same
//! first violation. Callers rely on that order for deterministic error
//! messages.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::directory::User;

const DEFAULT_MIN_LENGTH: usize = 8;
const DEFAULT_MAX_LENGTH: usize = 128;

/// Organization-scoped password ruleset.
///
/// Count rules are "at least N characters of this class"; zero disables the
/// rule. The directory collaborator supplies the policy for a user's
/// organization.
#[derive(Clone, Debug)]
pub struct PasswordPolicy {
    min_length: usize,
    max_length: usize,
    digit_count: usize,
    lowercase_count: usize,
    uppercase_count: usize,
    special_count: usize,
    forbid_login_name: bool,
    forbid_reuse: bool,
}

impl PasswordPolicy {
    /// Default policy: length 8..=128, no class requirements, login name
    /// and current-password reuse both forbidden.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            digit_count: 0,
            lowercase_count: 0,
            uppercase_count: 0,
            special_count: 0,
            forbid_login_name: true,
            forbid_reuse: true,
        }
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    #[must_use]
    pub fn with_digit_count(mut self, count: usize) -> Self {
        self.digit_count = count;
        self
    }

    #[must_use]
    pub fn with_lowercase_count(mut self, count: usize) -> Self {
        self.lowercase_count = count;
        self
    }

    #[must_use]
    pub fn with_uppercase_count(mut self, count: usize) -> Self {
        self.uppercase_count = count;
        self
    }

    #[must_use]
    pub fn with_special_count(mut self, count: usize) -> Self {
        self.special_count = count;
        self
    }

    #[must_use]
    pub fn with_forbid_login_name(mut self, forbid: bool) -> Self {
        self.forbid_login_name = forbid;
        self
    }

    #[must_use]
    pub fn with_forbid_reuse(mut self, forbid: bool) -> Self {
        self.forbid_reuse = forbid;
        self
    }

    #[must_use]
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Whether the new password may equal the current one. Checking this
    /// rule needs the password encoder, so it is enforced by the flow's
    /// update step rather than by [`validate`].
    #[must_use]
    pub fn forbid_reuse(&self) -> bool {
        self.forbid_reuse
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// A specific rule the candidate password failed.
///
/// Reasons are safe to show to the end user. `code()` yields the stable
/// identifier used for localization.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("password must not be empty")]
    Empty,
    #[error("password must not contain whitespace")]
    ContainsWhitespace,
    #[error("password must contain only printable ASCII characters")]
    InvalidCharacters,
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must be at most {max} characters")]
    TooLong { max: usize },
    #[error("password must contain at least {required} digits")]
    NotEnoughDigits { required: usize },
    #[error("password must contain at least {required} lowercase letters")]
    NotEnoughLowercase { required: usize },
    #[error("password must contain at least {required} uppercase letters")]
    NotEnoughUppercase { required: usize },
    #[error("password must contain at least {required} special characters")]
    NotEnoughSpecial { required: usize },
    #[error("password must not contain the login name")]
    ContainsLoginName,
    #[error("password must differ from the current password")]
    SameAsCurrent,
}

impl PolicyViolation {
    /// Stable identifier for localization lookups.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "password.policy.empty",
            Self::ContainsWhitespace => "password.policy.whitespace",
            Self::InvalidCharacters => "password.policy.characters",
            Self::TooShort { .. } => "password.policy.too_short",
            Self::TooLong { .. } => "password.policy.too_long",
            Self::NotEnoughDigits { .. } => "password.policy.digits",
            Self::NotEnoughLowercase { .. } => "password.policy.lowercase",
            Self::NotEnoughUppercase { .. } => "password.policy.uppercase",
            Self::NotEnoughSpecial { .. } => "password.policy.special",
            Self::ContainsLoginName => "password.policy.login_name",
            Self::SameAsCurrent => "password.policy.reuse",
        }
    }
}

/// Validate a candidate password against general format rules, then the
/// organization policy, returning the first violation encountered.
///
/// Rule order is part of the contract: format (empty, whitespace,
/// character set), then min length, max length, digits, lowercase,
/// uppercase, special, login-name containment. Pure and side-effect free;
/// the reuse rule is enforced separately because it needs the encoder.
pub fn validate(
    password: &SecretString,
    user: &User,
    policy: &PasswordPolicy,
) -> Result<(), PolicyViolation> {
    let candidate = password.expose_secret();

    if candidate.is_empty() {
        return Err(PolicyViolation::Empty);
    }
    if candidate.chars().any(char::is_whitespace) {
        return Err(PolicyViolation::ContainsWhitespace);
    }
    if !candidate.chars().all(|ch| ch.is_ascii_graphic()) {
        return Err(PolicyViolation::InvalidCharacters);
    }

    let length = candidate.chars().count();
    if length < policy.min_length {
        return Err(PolicyViolation::TooShort {
            min: policy.min_length,
        });
    }
    if length > policy.max_length {
        return Err(PolicyViolation::TooLong {
            max: policy.max_length,
        });
    }

    let digits = candidate.chars().filter(char::is_ascii_digit).count();
    if digits < policy.digit_count {
        return Err(PolicyViolation::NotEnoughDigits {
            required: policy.digit_count,
        });
    }

    let lowercase = candidate.chars().filter(char::is_ascii_lowercase).count();
    if lowercase < policy.lowercase_count {
        return Err(PolicyViolation::NotEnoughLowercase {
            required: policy.lowercase_count,
        });
    }

    let uppercase = candidate.chars().filter(char::is_ascii_uppercase).count();
    if uppercase < policy.uppercase_count {
        return Err(PolicyViolation::NotEnoughUppercase {
            required: policy.uppercase_count,
        });
    }

    let special = candidate
        .chars()
        .filter(|ch| ch.is_ascii_graphic() && !ch.is_ascii_alphanumeric())
        .count();
    if special < policy.special_count {
        return Err(PolicyViolation::NotEnoughSpecial {
            required: policy.special_count,
        });
    }

    if policy.forbid_login_name
        && !user.login_name.is_empty()
        && candidate
            .to_lowercase()
            .contains(&user.login_name.to_lowercase())
    {
        return Err(PolicyViolation::ContainsLoginName);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{PasswordPolicy, PolicyViolation, validate};
    use crate::directory::User;
    use secrecy::SecretString;

    fn user() -> User {
        User::new("jdoe", "Jane Doe", "jdoe@example.com", "digest")
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn accepts_compliant_password() {
        let policy = PasswordPolicy::new()
            .with_digit_count(1)
            .with_special_count(1);
        assert_eq!(validate(&secret("LongEnough#1"), &user(), &policy), Ok(()));
    }

    #[test]
    fn format_checks_run_before_policy() {
        // Whitespace fires before the length rule even on a short password.
        let policy = PasswordPolicy::new().with_min_length(20);
        assert_eq!(
            validate(&secret("a b"), &user(), &policy),
            Err(PolicyViolation::ContainsWhitespace)
        );
        assert_eq!(
            validate(&secret(""), &user(), &policy),
            Err(PolicyViolation::Empty)
        );
        assert_eq!(
            validate(&secret("pässwörd"), &user(), &policy),
            Err(PolicyViolation::InvalidCharacters)
        );
    }

    #[test]
    fn short_password_reports_min_length() {
        let policy = PasswordPolicy::new();
        assert_eq!(
            validate(&secret("Sh0rt"), &user(), &policy),
            Err(PolicyViolation::TooShort { min: 8 })
        );
    }

    #[test]
    fn length_beats_character_class_rules() {
        let policy = PasswordPolicy::new()
            .with_min_length(10)
            .with_digit_count(2);
        assert_eq!(
            validate(&secret("abcdefgh"), &user(), &policy),
            Err(PolicyViolation::TooShort { min: 10 })
        );
    }

    #[test]
    fn character_class_rules_fire_in_order() {
        let policy = PasswordPolicy::new()
            .with_digit_count(1)
            .with_uppercase_count(1)
            .with_special_count(1);
        // No digits, no uppercase, no specials: digits is reported first.
        assert_eq!(
            validate(&secret("lowercase"), &user(), &policy),
            Err(PolicyViolation::NotEnoughDigits { required: 1 })
        );
        assert_eq!(
            validate(&secret("lowercase1"), &user(), &policy),
            Err(PolicyViolation::NotEnoughUppercase { required: 1 })
        );
        assert_eq!(
            validate(&secret("Lowercase1"), &user(), &policy),
            Err(PolicyViolation::NotEnoughSpecial { required: 1 })
        );
    }

    #[test]
    fn rejects_password_containing_login_name() {
        let policy = PasswordPolicy::new();
        assert_eq!(
            validate(&secret("xxJDOExx123"), &user(), &policy),
            Err(PolicyViolation::ContainsLoginName)
        );
    }

    #[test]
    fn login_name_rule_can_be_disabled() {
        let policy = PasswordPolicy::new().with_forbid_login_name(false);
        assert_eq!(validate(&secret("xxjdoexx123"), &user(), &policy), Ok(()));
    }

    #[test]
    fn violation_codes_are_stable() {
        assert_eq!(
            PolicyViolation::TooShort { min: 8 }.code(),
            "password.policy.too_short"
        );
        assert_eq!(PolicyViolation::SameAsCurrent.code(), "password.policy.reuse");
    }
}
