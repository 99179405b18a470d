//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use pharmaq_chat::{ChatResponder, CompletionClient};
use pharmaq_core::config::PharmaqConfig;
use pharmaq_report::{EmailExporter, ReportBuilder};

use crate::sessions::SessionStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The only
/// mutable state is the session map inside [`SessionStore`].
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, read-only after startup.
    pub config: Arc<PharmaqConfig>,
    /// Per-user transcripts, selections, and report tables.
    pub sessions: Arc<SessionStore>,
    pub responder: ChatResponder,
    pub report_builder: ReportBuilder,
    pub email: Arc<EmailExporter>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the components around one completion client.
    pub fn new(
        config: PharmaqConfig,
        client: Arc<dyn CompletionClient>,
        email: EmailExporter,
    ) -> Self {
        let responder = ChatResponder::new(Arc::clone(&client), config.chat.max_message_length);
        let report_builder =
            ReportBuilder::new(client).with_concurrency(config.llm.concurrent_questions);
        Self {
            sessions: Arc::new(SessionStore::from_minutes(
                config.session.idle_timeout_minutes,
            )),
            config: Arc::new(config),
            responder,
            report_builder,
            email: Arc::new(email),
            start_time: Instant::now(),
        }
    }
}
