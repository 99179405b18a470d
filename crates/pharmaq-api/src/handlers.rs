//! Route handler functions for all API endpoints.
//!
//! Handlers hold the session lock only for short synchronous steps. Model
//! calls and SMTP delivery run with the lock released.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pharmaq_core::catalog::{self, PREDEFINED_PROMPTS, QUESTION_TEMPLATES, SOCIETIES};
use pharmaq_core::session::SessionSnapshot;
use pharmaq_core::types::{ChatMessage, ReportTable};
use pharmaq_report::email::{EmailRequest, EmailStatus};
use pharmaq_report::spreadsheet;

use crate::error::ApiError;
use crate::sessions::SessionStore;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub society: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub societies: Vec<String>,
    pub questions: Vec<String>,
    pub prompts: Vec<String>,
    pub greeting: String,
    pub smtp_host: String,
    pub default_subject: String,
    pub default_port: u16,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: ChatMessage,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    /// False when the society was empty or already selected.
    pub added: bool,
    /// One line per question that fell back to the error marker.
    pub notices: Vec<String>,
    pub report: ReportTable,
    pub available: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.sessions.active_count()?,
    }))
}

/// GET /ui - serve the self-contained page.
pub async fn ui() -> impl IntoResponse {
    Html(pharmaq_ui::page::PAGE_HTML)
}

/// GET /catalog - fixed societies, questions, prompts, and form defaults.
pub async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let config = &state.config;
    Json(CatalogResponse {
        societies: SOCIETIES.iter().map(|s| s.to_string()).collect(),
        questions: QUESTION_TEMPLATES.iter().map(|q| q.to_string()).collect(),
        prompts: PREDEFINED_PROMPTS.iter().map(|p| p.to_string()).collect(),
        greeting: config.chat.greeting.clone(),
        smtp_host: config.email.smtp_host.clone(),
        default_subject: config.email.default_subject.clone(),
        default_port: config.email.default_port,
    })
}

/// POST /sessions - start a new session.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let snapshot = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /sessions/{id} - current state, created empty on first access.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    Ok(Json(state.sessions.snapshot(id)?))
}

/// POST /sessions/{id}/chat - append a user message and the model's reply.
///
/// Free text and predefined prompts arrive here identically. One turn runs
/// per session at a time; a message sent while a reply is pending gets 409,
/// so the transcript always alternates question and answer.
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    state.responder.validate(&body.message)?;
    let user = ChatMessage::user(body.message);

    let (turn, history) = state
        .sessions
        .with_session(id, |s| s.begin_turn(user.clone()))?
        .ok_or_else(|| {
            ApiError::Conflict("A reply is still pending for this session".to_string())
        })?;
    let mut guard = TurnGuard::new(Arc::clone(&state.sessions), id, turn);

    tracing::debug!(session_id = %id, history = history.len(), "Requesting chat reply");
    let reply = state.responder.reply(&history).await;

    let (recorded, transcript) = state.sessions.with_session(id, |s| {
        let recorded = s.finish_turn(turn, user, reply.clone());
        (recorded, s.transcript().to_vec())
    })?;
    guard.disarm();

    if !recorded {
        tracing::warn!(session_id = %id, "Session changed while reply was pending; reply dropped");
        return Err(ApiError::Conflict(
            "Session changed while the reply was pending".to_string(),
        ));
    }

    Ok(Json(ChatResponse { reply, transcript }))
}

/// Releases a pending chat turn if the handler ends before recording the
/// reply, e.g. when the client disconnects mid-request.
struct TurnGuard {
    sessions: Arc<SessionStore>,
    id: Uuid,
    turn: Uuid,
    armed: bool,
}

impl TurnGuard {
    fn new(sessions: Arc<SessionStore>, id: Uuid, turn: Uuid) -> Self {
        Self {
            sessions,
            id,
            turn,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let turn = self.turn;
        if let Err(e) = self.sessions.with_session(self.id, |s| s.cancel_turn(turn)) {
            tracing::warn!(session_id = %self.id, error = %e, "Failed to release chat turn");
        }
    }
}

/// POST /sessions/{id}/report - build and append the row for one society.
pub async fn report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let society = body.society.trim().to_string();
    if !society.is_empty() && !catalog::is_known_society(&society) {
        return Err(ApiError::BadRequest(format!("Unknown society: {}", society)));
    }

    let claimed = state.sessions.with_session(id, |s| s.claim(&society))?;
    if !claimed {
        tracing::debug!(session_id = %id, society = %society, "Society already selected or empty; nothing to do");
        let (report, available) = state
            .sessions
            .with_session(id, |s| (s.report().clone(), s.available_societies()))?;
        return Ok(Json(ReportResponse {
            added: false,
            notices: Vec::new(),
            report,
            available,
        }));
    }

    let build = state.report_builder.build_row(&society).await;
    let notices: Vec<String> = build.failures.iter().map(|f| f.to_string()).collect();

    let (added, report, available) = state.sessions.with_session(id, |s| {
        // Re-claim in case the session expired while the questions ran.
        s.claim(&society);
        let added = s.append_row(build.row);
        (added, s.report().clone(), s.available_societies())
    })?;

    tracing::info!(
        session_id = %id,
        society = %society,
        errors = notices.len(),
        rows = report.len(),
        "Report row appended"
    );

    Ok(Json(ReportResponse {
        added,
        notices,
        report,
        available,
    }))
}

/// GET /sessions/{id}/report.xlsx - download the report as a workbook.
pub async fn report_xlsx(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let table = state.sessions.with_session(id, |s| s.report().clone())?;
    if table.is_empty() {
        return Err(ApiError::NotFound("Report is empty".to_string()));
    }

    let bytes = spreadsheet::to_xlsx(&table)?;
    Ok((
        [
            (header::CONTENT_TYPE, spreadsheet::MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", spreadsheet::FILE_NAME),
            ),
        ],
        bytes,
    ))
}

/// POST /sessions/{id}/email - send the report as an HTML email.
///
/// Always 200: the outcome is carried in the status body.
pub async fn email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<EmailStatus>, ApiError> {
    let table = state.sessions.with_session(id, |s| s.report().clone())?;
    let status = state.email.send_report(&body, &table).await;
    Ok(Json(status))
}
