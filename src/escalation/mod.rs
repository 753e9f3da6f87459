//! Escalation core
//!
//! Decides, per in-flight call, whether the agent answered first or the
//! deadline expired first: exactly once, with no duplicate transfers and no
//! leaked timers.
//!
//! - `registry` - concurrency-safe map of pending connections, owns the race
//! - `scheduler` - arms deadlines on call start, cancels on answer
//! - `transfer` - the fallback transfer side effect
//! - `error` - escalation error types

pub mod error;
pub mod registry;
pub mod scheduler;
pub mod transfer;

pub use error::EscalationError;
pub use registry::{PendingConnection, PendingConnectionRegistry, Resolution};
pub use scheduler::EscalationScheduler;
pub use transfer::TransferAction;
