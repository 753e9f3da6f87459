//! Voice event webhook handler
//!
//! The platform posts call lifecycle events here (ringing, answered,
//! completed, ...). The only event that carries behavior is `answered` for a
//! leg with an armed escalation: it cancels the timer. Everything else is
//! logged and acknowledged.
//!
//! This handler must always return 2xx: a failure would make the platform
//! retry the webhook, and "already transferred" is indistinguishable from
//! "never armed" on purpose.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::state::AppState;

/// Body of the event webhook. Parsed leniently; unknown shapes are absorbed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoiceEvent {
    pub uuid: Option<String>,
    pub conversation_uuid: Option<String>,
    pub from: Option<String>,
    /// For a connect leg this is the rung agent - the escalation key.
    pub to: Option<String>,
    pub status: Option<String>,
    pub direction: Option<String>,
    pub timestamp: Option<String>,
}

/// Handler for POST /webhooks/event.
///
/// Acknowledges with an empty JSON object regardless of payload or outcome.
pub async fn event_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Value> {
    let event: VoiceEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Unparseable event webhook body, acknowledging anyway");
            return Json(json!({}));
        }
    };

    info!(
        uuid = ?event.uuid,
        to = ?event.to,
        status = ?event.status,
        direction = ?event.direction,
        "Voice event received"
    );

    if event.status.as_deref() == Some("answered") {
        if let Some(key) = event.to.as_deref().filter(|k| !k.trim().is_empty()) {
            state.scheduler.resolve_answered(key);
        }
    }

    Json(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_event_deserialization() {
        let json = r#"{
            "uuid": "leg-5678",
            "to": "agent1",
            "status": "answered",
            "direction": "outbound"
        }"#;

        let event: VoiceEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.to.as_deref(), Some("agent1"));
        assert_eq!(event.status.as_deref(), Some("answered"));
    }

    #[test]
    fn test_voice_event_tolerates_unknown_shape() {
        let event: VoiceEvent = serde_json::from_str("{}").unwrap();
        assert!(event.status.is_none());

        let event: VoiceEvent =
            serde_json::from_str(r#"{"status": "completed", "rate": "0.012"}"#).unwrap();
        assert_eq!(event.status.as_deref(), Some("completed"));
    }
}
