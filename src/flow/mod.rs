//! The user-facing recovery state machine.
//!
//! One flow instance serves many concurrent requests; collaborators are
//! constructor-injected and shared behind `Arc`. Every step returns a
//! [`RecoveryOutcome`]; `Err` is reserved for infrastructure failures
//! (store or directory unreachable), which the enclosing service decides
//! how to retry or alert on.

mod config;
mod outcome;

pub use config::RecoveryConfig;
pub use outcome::{ErrorCode, RecoveryOutcome, RecoveryProof, UserSummary};

use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::directory::{PasswordEncoder, User, UserDirectory};
use crate::error::Error;
use crate::notify::{Notification, NotificationEvent, NotificationGateway, NotificationTarget};
use crate::policy::{self, PolicyViolation};
use crate::throttle::Throttle;
use crate::token::{TokenPurpose, TokenStore};
use secrecy::SecretString;

/// Orchestrates identity checks, throttling, token issuance, and the
/// policy-checked password update.
pub struct RecoveryFlow {
    config: RecoveryConfig,
    directory: Arc<dyn UserDirectory>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn NotificationGateway>,
    encoder: Arc<dyn PasswordEncoder>,
    throttle: Throttle,
}

impl RecoveryFlow {
    #[must_use]
    pub fn new(
        config: RecoveryConfig,
        directory: Arc<dyn UserDirectory>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn NotificationGateway>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        let throttle = Throttle::with_window(config.cooldown());
        Self {
            config,
            directory,
            tokens,
            notifier,
            encoder,
            throttle,
        }
    }

    /// Validate the email format and confirm the account exists and is
    /// eligible for a local password reset.
    pub fn check_identity(&self, email: &str) -> Result<RecoveryOutcome, Error> {
        let email = normalize_email(email);
        match self.lookup_eligible(&email)? {
            Ok(user) => Ok(RecoveryOutcome::ok(UserSummary::from(&user))),
            Err(code) => Ok(RecoveryOutcome::failed(code)),
        }
    }

    /// Report the send cooldown state for an identity without issuing
    /// anything.
    pub fn check_disabled(&self, email: &str) -> Result<RecoveryOutcome, Error> {
        let email = normalize_email(email);
        match self.throttle.remaining(&email) {
            Some(remaining) => Ok(RecoveryOutcome::throttled(remaining)),
            None => Ok(RecoveryOutcome::succeeded()),
        }
    }

    /// Issue a short verification code and dispatch it by mail.
    ///
    /// Throttle-marking and issuance both happen before the notification
    /// attempt, so a delivery failure cannot be used to bypass the cooldown
    /// by retrying immediately. The outcome never carries the code.
    pub fn request_code(&self, email: &str) -> Result<RecoveryOutcome, Error> {
        let email = normalize_email(email);
        let user = match self.lookup_eligible(&email)? {
            Ok(user) => user,
            Err(code) => return Ok(RecoveryOutcome::failed(code)),
        };

        if let Err(remaining) = self.throttle.try_mark(&email) {
            return Ok(RecoveryOutcome::throttled(remaining));
        }

        let code = self
            .tokens
            .issue(&email, TokenPurpose::Short, self.config.short_code_ttl())?;
        debug!(identity = %email, "issued short recovery code");

        self.dispatch(Notification {
            event: NotificationEvent::ForgotPassword,
            targets: vec![NotificationTarget::Email(email.clone())],
            params: json!({
                "user_name": user.login_name,
                "verify_code": code,
            }),
        });

        Ok(RecoveryOutcome::ok(UserSummary::from(&user)))
    }

    /// Issue a long reset link and dispatch it by mail.
    ///
    /// The link embeds a random key the store maps back to the identity;
    /// the email address itself never appears in the URL.
    pub fn request_link(&self, email: &str) -> Result<RecoveryOutcome, Error> {
        let email = normalize_email(email);
        let user = match self.lookup_eligible(&email)? {
            Ok(user) => user,
            Err(code) => return Ok(RecoveryOutcome::failed(code)),
        };

        if let Err(remaining) = self.throttle.try_mark(&email) {
            return Ok(RecoveryOutcome::throttled(remaining));
        }

        let key = self
            .tokens
            .issue(&email, TokenPurpose::Long, self.config.link_ttl())?;
        debug!(identity = %email, "issued reset link key");

        self.dispatch(Notification {
            event: NotificationEvent::ForgotPassword,
            targets: vec![NotificationTarget::Email(email.clone())],
            params: json!({
                "user_name": user.login_name,
                "redirect_url": self.config.build_reset_url(&key),
            }),
        });

        Ok(RecoveryOutcome::ok(UserSummary::from(&user)))
    }

    /// Check a short code without consuming it. Revocation is deferred to a
    /// successful password update so a verified code stays usable for the
    /// immediate next step, bounded by its TTL.
    pub fn verify_code(&self, email: &str, candidate: &str) -> Result<RecoveryOutcome, Error> {
        let email = normalize_email(email);
        if self
            .tokens
            .verify(TokenPurpose::Short, &email, candidate.trim())?
        {
            Ok(RecoveryOutcome::succeeded())
        } else {
            Ok(RecoveryOutcome::failed(ErrorCode::InvalidOrExpiredToken))
        }
    }

    /// Resolve an emailed deep-link key back to its account so a reset page
    /// can be rendered. Unknown and expired keys are indistinguishable.
    pub fn resolve_link(&self, key: &str) -> Result<RecoveryOutcome, Error> {
        let Some(identity) = self.tokens.resolve_identity(key.trim())? else {
            return Ok(RecoveryOutcome::failed(ErrorCode::InvalidOrExpiredToken));
        };
        match self.lookup_eligible(&identity)? {
            Ok(user) => Ok(RecoveryOutcome::ok(UserSummary::from(&user))),
            Err(code) => Ok(RecoveryOutcome::failed(code)),
        }
    }

    /// Apply a new password: re-verify the proof, validate the candidate
    /// against the organization policy, persist, then revoke the proof and
    /// confirm. All-or-nothing: any rejection happens before the first
    /// mutating call, so stored credentials are untouched on failure.
    pub fn reset_password(
        &self,
        email: &str,
        proof: &RecoveryProof,
        new_password: &SecretString,
    ) -> Result<RecoveryOutcome, Error> {
        let email = normalize_email(email);
        let user = match self.lookup_eligible(&email)? {
            Ok(user) => user,
            Err(code) => return Ok(RecoveryOutcome::failed(code)),
        };

        let purpose = match proof {
            RecoveryProof::ShortCode(code) => {
                if !self
                    .tokens
                    .verify(TokenPurpose::Short, &email, code.trim())?
                {
                    return Ok(RecoveryOutcome::failed(ErrorCode::InvalidOrExpiredToken));
                }
                TokenPurpose::Short
            }
            RecoveryProof::LinkKey(key) => {
                let resolved = self.tokens.resolve_identity(key.trim())?;
                if resolved.as_deref() != Some(email.as_str()) {
                    return Ok(RecoveryOutcome::failed(ErrorCode::InvalidOrExpiredToken));
                }
                TokenPurpose::Long
            }
        };

        let policy = self.directory.password_policy(&user)?;
        if let Err(violation) = policy::validate(new_password, &user, &policy) {
            return Ok(RecoveryOutcome::failed(ErrorCode::Policy(violation)));
        }
        if policy.forbid_reuse() && self.encoder.matches(new_password, &user.password_digest) {
            return Ok(RecoveryOutcome::failed(ErrorCode::Policy(
                PolicyViolation::SameAsCurrent,
            )));
        }

        let mut updated = user.clone();
        updated.password_digest = self.encoder.hash(new_password)?;

        let Some(persisted) = self.directory.update(&updated)? else {
            // The identity changed under us. Keep the proof token alive so
            // the caller may legitimately retry.
            warn!(identity = %email, "password update reported no change");
            return Ok(RecoveryOutcome::failed(ErrorCode::UpdateConflict));
        };

        // Single use: the consumed proof dies before success is reported.
        self.tokens.revoke(purpose, &email)?;

        self.dispatch(Notification {
            event: NotificationEvent::PasswordChanged,
            targets: vec![NotificationTarget::UserId(persisted.id)],
            params: json!({"user_name": persisted.real_name}),
        });

        Ok(RecoveryOutcome::ok(UserSummary::from(&persisted)))
    }

    /// Identity checks shared by every step: format, existence, delegation.
    fn lookup_eligible(&self, email_normalized: &str) -> Result<Result<User, ErrorCode>, Error> {
        if !valid_email(email_normalized) {
            return Ok(Err(ErrorCode::InvalidEmailFormat));
        }
        let Some(user) = self.directory.find_by_email(email_normalized)? else {
            return Ok(Err(ErrorCode::AccountNotFound));
        };
        if user.delegated {
            return Ok(Err(ErrorCode::DelegatedAccountUnsupported));
        }
        Ok(Ok(user))
    }

    /// Fire-and-forget dispatch: failures are logged and swallowed, never
    /// surfaced as flow failures, and never retried here.
    fn dispatch(&self, notification: Notification) {
        if let Err(err) = self.notifier.send(&notification) {
            warn!(
                event = notification.event.code(),
                "notification dispatch failed: {err}"
            );
        }
    }
}

/// Normalize an email for lookup and throttle keying.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}
