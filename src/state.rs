//! Shared application state

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::escalation::{EscalationScheduler, TransferAction};
use crate::vonage::{
    ApplicationTokenProvider, CallControlClient, NccoAction, TokenError, TokenProvider,
};

/// Shared state handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub scheduler: EscalationScheduler,
    /// Fallback flow NCCO, prebuilt from config. Used both as the transfer
    /// destination and as the answer for a call that arrives while the agent
    /// is already occupied.
    pub fallback_flow: Vec<NccoAction>,
}

impl AppState {
    /// Build the state from configuration, constructing the real token
    /// provider from the configured private key.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, TokenError> {
        let tokens: Arc<dyn TokenProvider> = match &config.private_key {
            Some(pem) => Arc::new(ApplicationTokenProvider::from_pem(
                &config.application_id,
                pem.as_bytes(),
            )?),
            None => {
                // validate() guarantees a key path when no inline key is set
                let path = config
                    .private_key_path
                    .as_ref()
                    .expect("config validation requires a private key source");
                Arc::new(ApplicationTokenProvider::from_key_file(
                    &config.application_id,
                    path,
                )?)
            }
        };
        Ok(Self::with_token_provider(config, tokens))
    }

    /// Build the state with an externally supplied token provider. Tests use
    /// this to substitute a [`crate::vonage::StaticTokenProvider`].
    pub fn with_token_provider(
        config: ServerConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Arc<Self> {
        let client = Arc::new(CallControlClient::new(config.api_url.clone()));
        let fallback_flow = config.fallback_ncco();
        let transfer = Arc::new(TransferAction::new(
            client,
            tokens,
            fallback_flow.clone(),
        ));
        let scheduler = EscalationScheduler::new(config.escalation_deadline(), transfer);

        Arc::new(AppState {
            config,
            scheduler,
            fallback_flow,
        })
    }
}
