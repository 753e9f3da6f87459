//! Inbound call-start webhook handler
//!
//! The platform calls this when an inbound call needs an answer instruction.
//! The handler arms the escalation for the configured agent and replies with
//! a connect NCCO whose platform-level ring timeout equals the escalation
//! deadline, so the vendor's connect timeout and our timer stay synchronized.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use tracing::{info, warn};

use crate::escalation::EscalationError;
use crate::state::AppState;
use crate::vonage::NccoAction;

/// Body of the answer webhook.
///
/// All fields are optional: the platform's payload varies by call type and a
/// malformed request must still be acknowledged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnswerRequest {
    /// The inbound call leg uuid - the leg a transfer would be issued against.
    pub uuid: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub conversation_uuid: Option<String>,
}

/// Handler for POST /webhooks/answer.
///
/// Replies with one of:
/// - a connect NCCO ringing the agent (escalation armed);
/// - the fallback flow, when an escalation is already armed for the agent
///   (a second concurrent call must not clobber the first timer);
/// - an empty NCCO when the payload carries no leg uuid or does not parse.
///
/// Like the event webhook, this always acknowledges: a non-2xx answer would
/// make the platform fail the call outright.
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<Vec<NccoAction>> {
    let request: AnswerRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unparseable answer webhook body, answering with empty NCCO");
            return Json(Vec::new());
        }
    };

    info!(
        uuid = ?request.uuid,
        from = ?request.from,
        conversation_uuid = ?request.conversation_uuid,
        "Answer webhook received"
    );

    let Some(leg_id) = request.uuid.as_deref().filter(|u| !u.trim().is_empty()) else {
        warn!("Answer webhook without a leg uuid, answering with empty NCCO");
        return Json(Vec::new());
    };

    let agent = &state.config.agent_user;
    match state.scheduler.schedule(agent, leg_id) {
        Ok(()) => {
            let timeout = state.config.escalation_timeout_secs;
            Json(vec![NccoAction::connect_to_app(agent.clone(), timeout)])
        }
        Err(EscalationError::AlreadyArmed { key }) => {
            warn!(
                key = %key,
                leg_id = %leg_id,
                "Concurrent call for an agent with an armed escalation, answering with fallback flow"
            );
            Json(state.fallback_flow.clone())
        }
    }
}
