//! NCCO (call control object) model
//!
//! Serde types for the subset of the Vonage voice instruction set this
//! gateway emits: `connect` (ring an application user), `stream` (play an
//! announcement), `record` (capture a voicemail message) and `talk`
//! (text-to-speech prompt). An NCCO is a JSON array of actions; webhook
//! responses and transfer destinations are both expressed as `Vec<NccoAction>`.

use serde::{Deserialize, Serialize};

/// A single NCCO action.
///
/// # Example JSON
/// ```json
/// [
///   {
///     "action": "connect",
///     "timeout": 8,
///     "eventType": "synchronous",
///     "endpoint": [{ "type": "app", "user": "agent1" }]
///   }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NccoAction {
    /// Connect the call to another endpoint, ringing it for `timeout` seconds.
    #[serde(rename_all = "camelCase")]
    Connect {
        /// Seconds the platform rings the endpoint before giving up.
        timeout: u64,
        /// Event delivery mode; `synchronous` makes the platform wait for
        /// this leg to resolve before moving to the next action.
        event_type: String,
        endpoint: Vec<ConnectEndpoint>,
    },

    /// Play one or more audio files into the call.
    #[serde(rename_all = "camelCase")]
    Stream { stream_url: Vec<String> },

    /// Record the caller until silence, a key press, or hangup.
    #[serde(rename_all = "camelCase")]
    Record {
        end_on_silence: u32,
        end_on_key: String,
        beep_on_start: u8,
    },

    /// Speak a text prompt into the call.
    Talk { text: String },
}

/// Endpoint descriptor for a `connect` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectEndpoint {
    /// An application user (an agent logged in with the client SDK).
    App { user: String },
}

impl NccoAction {
    /// Connect the call to an application user, ringing for `timeout` seconds.
    pub fn connect_to_app(user: impl Into<String>, timeout: u64) -> Self {
        NccoAction::Connect {
            timeout,
            event_type: "synchronous".to_string(),
            endpoint: vec![ConnectEndpoint::App { user: user.into() }],
        }
    }

    pub fn stream(urls: Vec<String>) -> Self {
        NccoAction::Stream { stream_url: urls }
    }

    pub fn record(end_on_silence: u32, end_on_key: impl Into<String>, beep_on_start: bool) -> Self {
        NccoAction::Record {
            end_on_silence,
            end_on_key: end_on_key.into(),
            beep_on_start: if beep_on_start { 1 } else { 0 },
        }
    }
}
