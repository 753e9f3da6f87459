//! Call-control API client
//!
//! Thin reqwest wrapper over the vendor voice API. The only operation this
//! gateway needs is the mid-call transfer: `PUT /v1/calls/{leg_id}` with an
//! inline NCCO destination.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use super::error::CallControlError;
use super::ncco::NccoAction;

/// Outgoing request timeout. Transfers are fire-and-forget from the caller's
/// point of view, so a slow vendor must not pin the timer task.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a transfer request.
#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    action: &'static str,
    destination: TransferDestination<'a>,
}

/// Transfer destination wrapping an inline NCCO.
#[derive(Debug, Serialize)]
struct TransferDestination<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    ncco: &'a [NccoAction],
}

/// Client for the vendor call-control API.
pub struct CallControlClient {
    http: reqwest::Client,
    base_url: String,
}

impl CallControlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction only fails with invalid TLS settings");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// URL of the call resource a transfer is issued against.
    fn call_url(&self, leg_id: &str) -> String {
        format!("{}/v1/calls/{}", self.base_url.trim_end_matches('/'), leg_id)
    }

    /// Transfer an in-progress call leg to the given NCCO destination.
    ///
    /// Returns the vendor's status code on success. Non-2xx responses come
    /// back as [`CallControlError::UnexpectedStatus`] with the response body
    /// preserved for logging.
    pub async fn transfer(
        &self,
        leg_id: &str,
        token: &str,
        destination: &[NccoAction],
    ) -> Result<StatusCode, CallControlError> {
        let url = self.call_url(leg_id);
        debug!(leg_id = %leg_id, url = %url, "Sending transfer request");

        let body = TransferRequest {
            action: "transfer",
            destination: TransferDestination {
                kind: "ncco",
                ncco: destination,
            },
        };

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallControlError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(status)
    }
}
