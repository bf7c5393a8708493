//! # Reakiro (Credential Recovery Flows)
//!
//! `reakiro` implements the forgot-password path of an identity system:
//! short-lived, single-use proof tokens that let a user regain access
//! without prior authentication, with abuse throttling and organizational
//! password policy enforced before any credential mutation is committed.
//!
//! ## Proof shapes
//!
//! Two proofs exist, with independent TTLs and one shared send cooldown:
//!
//! - **Short code**: a 6-digit code for in-app verification, typed by the
//!   user.
//! - **Link key**: a 256-bit URL-safe key embedded in an emailed deep
//!   link. The key is pure random, mapped back to the identity only inside
//!   the token store, so URLs never carry a decodable form of the email.
//!
//! ## Security properties
//!
//! - Stores keep SHA-256 hashes of token values, never the raw values.
//! - Verification failures report a single `token.invalid` code whether
//!   the token was missing, wrong, or expired — no oracle for attackers.
//! - Infrastructure failures (store/directory unreachable) are `Err`,
//!   never conflated with a wrong code.
//! - A consumed proof is revoked before success is reported; policy
//!   rejection happens before the first mutating call.
//!
//! ## Collaborators
//!
//! User persistence ([`UserDirectory`]), outbound messaging
//! ([`NotificationGateway`]), digest algorithm ([`PasswordEncoder`]), and
//! message rendering ([`Localizer`]) are constructor-injected traits; this
//! crate ships in-memory/log/Argon2/English defaults and owns no transport
//! or wire format.

pub mod directory;
pub mod error;
pub mod flow;
pub mod localize;
pub mod notify;
pub mod policy;
pub mod throttle;
pub mod token;

pub use directory::{Argon2PasswordEncoder, PasswordEncoder, User, UserDirectory};
pub use error::Error;
pub use flow::{
    ErrorCode, RecoveryConfig, RecoveryFlow, RecoveryOutcome, RecoveryProof, UserSummary,
};
pub use localize::{EnglishLocalizer, Localizer};
pub use notify::{
    LogNotificationGateway, Notification, NotificationEvent, NotificationGateway,
    NotificationTarget,
};
pub use policy::{PasswordPolicy, PolicyViolation};
pub use throttle::Throttle;
pub use token::{InMemoryTokenStore, TokenPurpose, TokenStore};
