//! Outbound notification boundary.
//!
//! Recovery mail and "password changed" confirmations go through
//! [`NotificationGateway`]. Dispatch is best-effort: the flow logs failures
//! and moves on, so delivery trouble never blocks or reverts a credential
//! change. The default gateway logs instead of sending, which is enough
//! for local development.

use anyhow::Result;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// Which message template the receiving system should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationEvent {
    ForgotPassword,
    PasswordChanged,
}

impl NotificationEvent {
    /// Stable event code understood by the notification system.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ForgotPassword => "forgot-password",
            Self::PasswordChanged => "password-changed",
        }
    }
}

/// Recipient selector: recovery mail targets an address, confirmations
/// target the account (site message, push, whatever the gateway supports).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationTarget {
    Email(String),
    UserId(Uuid),
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub event: NotificationEvent,
    pub targets: Vec<NotificationTarget>,
    /// Template parameters (user name, verification code, reset link).
    pub params: Value,
}

/// Notification delivery abstraction.
pub trait NotificationGateway: Send + Sync {
    /// Deliver a notification or return an error; the flow treats errors
    /// as non-fatal.
    fn send(&self, notification: &Notification) -> Result<()>;
}

/// Local dev gateway that logs the event instead of sending it.
///
/// Parameters are logged as-is, so this must not be used where recovery
/// codes in logs are a concern.
#[derive(Clone, Debug)]
pub struct LogNotificationGateway;

impl NotificationGateway for LogNotificationGateway {
    fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            event = notification.event.code(),
            targets = notification.targets.len(),
            params = %notification.params,
            "notification send stub"
        );
        Ok(())
    }
}
