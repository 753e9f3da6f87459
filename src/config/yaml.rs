use serde::Deserialize;

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a
/// YAML file. All fields are optional to allow partial configuration; values
/// present here override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///
/// vonage:
///   api_url: "https://api.nexmo.com"
///   application_id: "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"
///   private_key_path: "/etc/handover/private.key"
///
/// escalation:
///   agent_user: "agent1"
///   timeout_secs: 8
///
/// fallback:
///   announcement_urls:
///     - "https://example.com/announce.wav"
///   record:
///     end_on_silence: 3
///     end_on_key: "#"
///     beep_on_start: true
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub vonage: Option<VonageYaml>,
    pub escalation: Option<EscalationYaml>,
    pub fallback: Option<FallbackYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Vendor application settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VonageYaml {
    pub api_url: Option<String>,
    pub application_id: Option<String>,
    /// Inline PEM private key. Takes precedence over `private_key_path`.
    pub private_key: Option<String>,
    pub private_key_path: Option<String>,
}

/// Escalation settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EscalationYaml {
    /// Agent identity: both the connect endpoint user and the registry key.
    pub agent_user: Option<String>,
    /// Seconds the agent is rung before the call falls back to voicemail.
    pub timeout_secs: Option<u64>,
}

/// Fallback flow settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FallbackYaml {
    pub announcement_urls: Option<Vec<String>>,
    pub record: Option<RecordYaml>,
}

/// Voicemail recording settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RecordYaml {
    pub end_on_silence: Option<u32>,
    pub end_on_key: Option<String>,
    pub beep_on_start: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_parses_to_defaults() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.vonage.is_none());
        assert!(config.escalation.is_none());
        assert!(config.fallback.is_none());
    }

    #[test]
    fn test_partial_yaml_parses() {
        let yaml = r#"
escalation:
  timeout_secs: 12
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let escalation = config.escalation.unwrap();
        assert_eq!(escalation.timeout_secs, Some(12));
        assert_eq!(escalation.agent_user, None);
    }

    #[test]
    fn test_full_yaml_parses() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  tls:
    enabled: true
    cert_path: "/etc/tls/cert.pem"
    key_path: "/etc/tls/key.pem"
vonage:
  api_url: "https://api.example.com"
  application_id: "app-123"
  private_key_path: "/etc/handover/private.key"
escalation:
  agent_user: "support"
  timeout_secs: 15
fallback:
  announcement_urls:
    - "https://example.com/a.wav"
    - "https://example.com/b.wav"
  record:
    end_on_silence: 5
    end_on_key: "*"
    beep_on_start: false
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(
            config.vonage.as_ref().unwrap().application_id.as_deref(),
            Some("app-123")
        );
        assert_eq!(config.escalation.as_ref().unwrap().timeout_secs, Some(15));
        let fallback = config.fallback.unwrap();
        assert_eq!(fallback.announcement_urls.unwrap().len(), 2);
        assert_eq!(fallback.record.unwrap().end_on_key.as_deref(), Some("*"));
    }
}
