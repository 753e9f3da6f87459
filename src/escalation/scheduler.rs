//! Escalation scheduler
//!
//! Consumer-facing layer over the registry: the answer webhook schedules an
//! escalation per call start, the event webhook resolves it when the agent
//! answers, and the fire path is wired to the transfer action. Duplicate
//! answers and answers arriving after the timer fired are absorbed silently;
//! the registry's terminal-state guard makes both harmless.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::error::EscalationError;
use super::registry::PendingConnectionRegistry;
use super::transfer::TransferAction;

/// Arms and resolves per-key escalation deadlines.
pub struct EscalationScheduler {
    registry: PendingConnectionRegistry,
    deadline: Duration,
    transfer: Arc<TransferAction>,
}

impl EscalationScheduler {
    pub fn new(deadline: Duration, transfer: Arc<TransferAction>) -> Self {
        Self {
            registry: PendingConnectionRegistry::new(),
            deadline,
            transfer,
        }
    }

    /// The configured escalation deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Arm the escalation for `key`: if the agent does not answer within the
    /// deadline, `leg_id` is transferred to the fallback flow.
    pub fn schedule(&self, key: &str, leg_id: &str) -> Result<(), EscalationError> {
        let transfer = Arc::clone(&self.transfer);
        self.registry.arm(key, leg_id, self.deadline, move |leg| async move {
            transfer.execute(&leg).await;
        })
    }

    /// Resolve an agent-answered signal for `key`.
    ///
    /// Returns whether this call performed the cancellation. `false` covers
    /// both "already transferred" and "never armed"; callers must not treat
    /// either as an error.
    pub fn resolve_answered(&self, key: &str) -> bool {
        let canceled = self.registry.try_cancel(key);
        if canceled {
            info!(key = %key, "Agent answered before deadline, escalation canceled");
        } else {
            info!(key = %key, "Answer signal with no armed escalation, ignoring");
        }
        canceled
    }

    /// Registry accessor for observability and tests.
    pub fn registry(&self) -> &PendingConnectionRegistry {
        &self.registry
    }
}
