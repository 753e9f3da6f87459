//! Configuration module for the Handover Gateway
//!
//! This module handles server configuration from various sources: .env files,
//! YAML files, and environment variables. Priority: YAML > ENV vars > .env
//! values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use handover_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallback
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::vonage::NccoAction;

mod yaml;

use yaml::YamlConfig;

/// Default vendor API base URL.
const DEFAULT_API_URL: &str = "https://api.nexmo.com";

/// Default announcement played before the voicemail recording starts.
const DEFAULT_ANNOUNCEMENT_URL: &str =
    "https://static.dev.nexmoinc.net/svc/ncco/audio_files/wav/counting.wav";

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required configuration field missing
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    /// A provided value could not be used
    #[error("Invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// TLS configuration for HTTPS webhooks
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the Handover Gateway, including:
/// - Server settings (host, port, TLS)
/// - Vendor application settings (API base URL, application id, private key)
/// - Escalation settings (agent identity, deadline)
/// - Fallback flow settings (announcement + voicemail recording)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Vendor application settings
    pub api_url: String,
    pub application_id: String,
    /// Inline PEM private key. Takes precedence over `private_key_path`.
    pub private_key: Option<String>,
    pub private_key_path: Option<PathBuf>,

    // Escalation settings
    /// Agent identity: the connect endpoint user and the registry key.
    pub agent_user: String,
    /// Seconds the agent is rung before the call falls back to voicemail.
    /// Doubles as the platform-level connect timeout so both clocks agree.
    pub escalation_timeout_secs: u64,

    // Fallback flow settings
    pub announcement_urls: Vec<String>,
    pub record_end_on_silence: u32,
    pub record_end_on_key: String,
    pub record_beep_on_start: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::base_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to environment
    /// variables for anything the file does not set.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let yaml: YamlConfig = serde_yaml::from_str(&contents)?;

        let mut config = Self::base_from_env()?;
        config.apply_yaml(yaml);
        config.validate()?;
        Ok(config)
    }

    /// Build the raw configuration from environment variables and defaults,
    /// without validating required fields.
    fn base_from_env() -> Result<Self, ConfigError> {
        let port = match env_opt("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                field: "PORT",
                message: e.to_string(),
            })?,
            None => 3000,
        };

        let escalation_timeout_secs = match env_opt("ESCALATION_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                field: "ESCALATION_TIMEOUT_SECS",
                message: e.to_string(),
            })?,
            None => 8,
        };

        let record_end_on_silence = match env_opt("RECORD_END_ON_SILENCE") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                field: "RECORD_END_ON_SILENCE",
                message: e.to_string(),
            })?,
            None => 3,
        };

        let record_beep_on_start = match env_opt("RECORD_BEEP_ON_START") {
            Some(raw) => raw.parse::<bool>().map_err(|e| ConfigError::Invalid {
                field: "RECORD_BEEP_ON_START",
                message: e.to_string(),
            })?,
            None => true,
        };

        let announcement_urls = env_opt("ANNOUNCEMENT_URLS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| vec![DEFAULT_ANNOUNCEMENT_URL.to_string()]);

        let tls = match (env_opt("TLS_CERT_PATH"), env_opt("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            _ => None,
        };

        Ok(Self {
            host: env_opt("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            tls,
            api_url: env_opt("VONAGE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            application_id: env_opt("VONAGE_APPLICATION_ID").unwrap_or_default(),
            private_key: env_opt("VONAGE_PRIVATE_KEY"),
            private_key_path: env_opt("VONAGE_PRIVATE_KEY_PATH").map(PathBuf::from),
            agent_user: env_opt("AGENT_USER").unwrap_or_else(|| "agent1".to_string()),
            escalation_timeout_secs,
            announcement_urls,
            record_end_on_silence,
            record_end_on_key: env_opt("RECORD_END_ON_KEY").unwrap_or_else(|| "#".to_string()),
            record_beep_on_start,
        })
    }

    /// Overlay YAML values on top of the env-derived configuration.
    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
            if let Some(tls) = server.tls {
                if tls.enabled.unwrap_or(false) {
                    if let (Some(cert), Some(key)) = (tls.cert_path, tls.key_path) {
                        self.tls = Some(TlsConfig {
                            cert_path: PathBuf::from(cert),
                            key_path: PathBuf::from(key),
                        });
                    }
                } else {
                    self.tls = None;
                }
            }
        }

        if let Some(vonage) = yaml.vonage {
            if let Some(api_url) = vonage.api_url {
                self.api_url = api_url;
            }
            if let Some(application_id) = vonage.application_id {
                self.application_id = application_id;
            }
            if let Some(private_key) = vonage.private_key {
                self.private_key = Some(private_key);
            }
            if let Some(private_key_path) = vonage.private_key_path {
                self.private_key_path = Some(PathBuf::from(private_key_path));
            }
        }

        if let Some(escalation) = yaml.escalation {
            if let Some(agent_user) = escalation.agent_user {
                self.agent_user = agent_user;
            }
            if let Some(timeout_secs) = escalation.timeout_secs {
                self.escalation_timeout_secs = timeout_secs;
            }
        }

        if let Some(fallback) = yaml.fallback {
            if let Some(urls) = fallback.announcement_urls {
                self.announcement_urls = urls;
            }
            if let Some(record) = fallback.record {
                if let Some(end_on_silence) = record.end_on_silence {
                    self.record_end_on_silence = end_on_silence;
                }
                if let Some(end_on_key) = record.end_on_key {
                    self.record_end_on_key = end_on_key;
                }
                if let Some(beep_on_start) = record.beep_on_start {
                    self.record_beep_on_start = beep_on_start;
                }
            }
        }
    }

    /// Validate that the configuration is usable.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.application_id.trim().is_empty() {
            return Err(ConfigError::Missing("VONAGE_APPLICATION_ID"));
        }
        if self.private_key.is_none() && self.private_key_path.is_none() {
            return Err(ConfigError::Missing(
                "VONAGE_PRIVATE_KEY or VONAGE_PRIVATE_KEY_PATH",
            ));
        }
        if self.agent_user.trim().is_empty() {
            return Err(ConfigError::Missing("AGENT_USER"));
        }
        if self.escalation_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "ESCALATION_TIMEOUT_SECS",
                message: "must be at least 1 second".to_string(),
            });
        }
        if self.announcement_urls.is_empty() {
            return Err(ConfigError::Missing("ANNOUNCEMENT_URLS"));
        }
        Ok(())
    }

    /// The socket address string the server binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// The escalation deadline as a duration.
    pub fn escalation_deadline(&self) -> Duration {
        Duration::from_secs(self.escalation_timeout_secs)
    }

    /// The fallback flow: announcement stream followed by a voicemail record.
    pub fn fallback_ncco(&self) -> Vec<NccoAction> {
        vec![
            NccoAction::stream(self.announcement_urls.clone()),
            NccoAction::record(
                self.record_end_on_silence,
                self.record_end_on_key.clone(),
                self.record_beep_on_start,
            ),
        ]
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
