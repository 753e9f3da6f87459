//! Escalation error types

use thiserror::Error;

/// Errors from the pending-connection registry.
#[derive(Error, Debug)]
pub enum EscalationError {
    /// A call-start arrived for a key that already has an armed escalation.
    /// The existing entry and its timer are left untouched.
    #[error("An escalation is already armed for key '{key}'")]
    AlreadyArmed { key: String },
}
