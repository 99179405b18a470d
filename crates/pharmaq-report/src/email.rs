//! Email export: renders the report to HTML and sends it through an SMTP
//! relay, implicit TLS on 465 and STARTTLS on 587.
//!
//! The sender credential is a [`SecretRef`] resolved by a [`SecretResolver`],
//! so callers can point at an environment variable instead of passing the
//! password itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};

use pharmaq_core::config::{EmailConfig, SMTPS_PORT, SUBMISSION_PORT};
use pharmaq_core::types::ReportTable;

use crate::error::EmailError;
use crate::html;

pub const SUCCESS_MESSAGE: &str = "Email sent successfully!";
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill in all required fields (email details and SMTP server).";

// =============================================================================
// Credentials
// =============================================================================

/// Where the sender password comes from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretRef {
    /// The password itself.
    Inline { value: String },
    /// Name of an environment variable holding the password.
    Env { var: String },
}

impl std::fmt::Debug for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretRef::Inline { .. } => f.write_str("Inline(<redacted>)"),
            SecretRef::Env { var } => write!(f, "Env({})", var),
        }
    }
}

/// Resolves a [`SecretRef`] to the secret value.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, secret: &SecretRef) -> Result<String, EmailError>;
}

/// Resolves inline values directly and `Env` references from the process
/// environment.
pub struct EnvSecretResolver;

impl SecretResolver for EnvSecretResolver {
    fn resolve(&self, secret: &SecretRef) -> Result<String, EmailError> {
        match secret {
            SecretRef::Inline { value } => Ok(value.clone()),
            SecretRef::Env { var } => std::env::var(var)
                .map_err(|_| EmailError::Credential(format!("{} is not set", var))),
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

/// TLS mode implied by the SMTP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    ImplicitTls,
    StartTls,
}

impl SmtpSecurity {
    pub fn from_port(port: u16) -> Result<Self, EmailError> {
        match port {
            SMTPS_PORT => Ok(SmtpSecurity::ImplicitTls),
            SUBMISSION_PORT => Ok(SmtpSecurity::StartTls),
            other => Err(EmailError::UnsupportedPort(other)),
        }
    }
}

/// A fully resolved message ready for a [`Mailer`].
#[derive(Clone)]
pub struct OutgoingEmail {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub subject: String,
    pub html: String,
}

/// Delivers an [`OutgoingEmail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// SMTP delivery via lettre, authenticating as the sender.
pub struct SmtpMailer {
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let from = email
            .sender
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", email.sender, e)))?;
        let to = email
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", email.recipient, e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .multipart(
                MultiPart::mixed().singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html.clone()),
                ),
            )
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let builder = match email.security {
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&email.host),
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.host)
            }
        }
        .map_err(|e| EmailError::Transport(e.to_string()))?;

        let transport = builder
            .port(email.port)
            .credentials(Credentials::new(
                email.sender.clone(),
                email.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// User-supplied parameters for one email send.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub credential: Option<SecretRef>,
    pub port: Option<u16>,
}

/// Outcome shown to the user. Never an error: failures are reported here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailStatus {
    pub success: bool,
    pub message: String,
}

impl EmailStatus {
    fn sent() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    fn failed(err: &EmailError) -> Self {
        let message = match err {
            EmailError::MissingFields => MISSING_FIELDS_MESSAGE.to_string(),
            other => format!("Failed to send email: {}", other),
        };
        Self {
            success: false,
            message,
        }
    }
}

/// Sends the report table as an HTML email.
pub struct EmailExporter {
    mailer: Arc<dyn Mailer>,
    resolver: Arc<dyn SecretResolver>,
    smtp_host: String,
    default_port: u16,
    fallback_password_env: Option<String>,
}

impl EmailExporter {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        resolver: Arc<dyn SecretResolver>,
        config: &EmailConfig,
    ) -> Self {
        Self {
            mailer,
            resolver,
            smtp_host: config.smtp_host.clone(),
            default_port: config.default_port,
            fallback_password_env: config.sender_password_env.clone(),
        }
    }

    /// SMTP delivery through the configured relay.
    pub fn smtp(config: &EmailConfig) -> Self {
        Self::new(
            Arc::new(SmtpMailer::new(Duration::from_secs(config.timeout_secs))),
            Arc::new(EnvSecretResolver),
            config,
        )
    }

    /// Validate, render, and send. No retry on failure.
    pub async fn send_report(&self, request: &EmailRequest, table: &ReportTable) -> EmailStatus {
        let result = match self.prepare(request, table) {
            Ok(email) => {
                tracing::info!(
                    host = %email.host,
                    port = email.port,
                    recipient = %email.recipient,
                    rows = table.len(),
                    "Sending report email"
                );
                self.mailer.send(&email).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => EmailStatus::sent(),
            Err(e) => {
                tracing::warn!(error = %e, "Report email not sent");
                EmailStatus::failed(&e)
            }
        }
    }

    fn prepare(&self, request: &EmailRequest, table: &ReportTable) -> Result<OutgoingEmail, EmailError> {
        let recipient = request.recipient.trim();
        let subject = request.subject.trim();
        let sender = request.sender.trim();
        if recipient.is_empty() || subject.is_empty() || sender.is_empty() {
            return Err(EmailError::MissingFields);
        }

        let password = self.resolve_password(request.credential.as_ref())?;
        if table.is_empty() {
            return Err(EmailError::EmptyReport);
        }

        let port = request.port.unwrap_or(self.default_port);
        let security = SmtpSecurity::from_port(port)?;

        Ok(OutgoingEmail {
            host: self.smtp_host.clone(),
            port,
            security,
            sender: sender.to_string(),
            password,
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html: html::render_email_body(table),
        })
    }

    fn resolve_password(&self, credential: Option<&SecretRef>) -> Result<String, EmailError> {
        let fallback = self
            .fallback_password_env
            .as_ref()
            .map(|var| SecretRef::Env { var: var.clone() });

        let secret = match credential {
            Some(SecretRef::Inline { value }) if value.is_empty() => fallback,
            Some(secret) => Some(secret.clone()),
            None => fallback,
        }
        .ok_or(EmailError::MissingFields)?;

        let password = self.resolver.resolve(&secret)?;
        if password.is_empty() {
            return Err(EmailError::MissingFields);
        }
        Ok(password)
    }
}
