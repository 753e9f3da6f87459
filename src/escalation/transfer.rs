//! Transfer action
//!
//! The single external side effect of an escalation: move the caller's leg to
//! the fallback flow (announcement + voicemail recording). Runs strictly
//! after the registry entry has been removed, so it never executes twice for
//! the same entry. Failures are logged and absorbed; there is no retry, and
//! a failed transfer leaves the call in whatever state the platform has it.

use std::sync::Arc;

use tracing::{error, info};

use crate::vonage::{CallControlClient, NccoAction, TokenProvider};

/// Transfers a call leg to the configured fallback destination.
pub struct TransferAction {
    client: Arc<CallControlClient>,
    tokens: Arc<dyn TokenProvider>,
    destination: Vec<NccoAction>,
}

impl TransferAction {
    pub fn new(
        client: Arc<CallControlClient>,
        tokens: Arc<dyn TokenProvider>,
        destination: Vec<NccoAction>,
    ) -> Self {
        Self {
            client,
            tokens,
            destination,
        }
    }

    /// The NCCO this action transfers calls to.
    pub fn destination(&self) -> &[NccoAction] {
        &self.destination
    }

    /// Issue the transfer for `leg_id` with a freshly generated backend token.
    ///
    /// Both outcomes are terminal: success is logged, failure is logged and
    /// absorbed without retry.
    pub async fn execute(&self, leg_id: &str) {
        info!(leg_id = %leg_id, "Sending transfer request");

        let token = match self.tokens.backend_token() {
            Ok(token) => token,
            Err(e) => {
                error!(leg_id = %leg_id, error = %e, "Transfer aborted: token generation failed");
                return;
            }
        };

        match self.client.transfer(leg_id, &token, &self.destination).await {
            Ok(status) => {
                info!(leg_id = %leg_id, status = status.as_u16(), "Transfer request accepted");
            }
            Err(e) => {
                error!(leg_id = %leg_id, error = %e, "Transfer request failed");
            }
        }
    }
}
