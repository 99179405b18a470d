use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PharmaqError, Result};

/// SMTP port for implicit TLS.
pub const SMTPS_PORT: u16 = 465;
/// SMTP submission port, upgraded with STARTTLS.
pub const SUBMISSION_PORT: u16 = 587;

/// Top-level configuration for the pharmaq application.
///
/// Loaded from `~/.pharmaq/config.toml` by default. Every section falls back
/// to its defaults when omitted, so a partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PharmaqConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl PharmaqConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PharmaqConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or is invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.general.port == 0 {
            return Err(PharmaqError::Config("general.port must not be 0".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(PharmaqError::Config("llm.model must not be empty".into()));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(PharmaqError::Config("llm.base_url must not be empty".into()));
        }
        if ![SMTPS_PORT, SUBMISSION_PORT].contains(&self.email.default_port) {
            return Err(PharmaqError::Config(format!(
                "email.default_port must be {} or {}, got {}",
                SMTPS_PORT, SUBMISSION_PORT, self.email.default_port
            )));
        }
        if self.chat.max_message_length == 0 {
            return Err(PharmaqError::Config(
                "chat.max_message_length must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// HTTP server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8501,
            log_level: "info".to_string(),
        }
    }
}

/// Language-model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of a chat-completions compatible API.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Issue the report questions concurrently instead of one after another.
    pub concurrent_questions: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            concurrent_questions: false,
        }
    }
}

/// Chat widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Assistant greeting shown above an empty transcript.
    pub greeting: String,
    /// Maximum user message length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "How can I assist you today?".to_string(),
            max_message_length: 2000,
        }
    }
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minutes of inactivity after which a session is discarded.
    pub idle_timeout_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 120,
        }
    }
}

/// Outbound email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Mail relay host.
    pub smtp_host: String,
    /// Port preselected in the UI (465 or 587).
    pub default_port: u16,
    /// Subject preselected in the UI.
    pub default_subject: String,
    /// SMTP connection timeout in seconds.
    pub timeout_secs: u64,
    /// Environment variable consulted when a request carries no credential.
    pub sender_password_env: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            default_port: SUBMISSION_PORT,
            default_subject: "Consolidated Pharma Society Report".to_string(),
            timeout_secs: 30,
            sender_password_env: None,
        }
    }
}
