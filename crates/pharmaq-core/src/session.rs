//! Per-session state: the chat transcript, the societies already selected,
//! and the accumulated report table.
//!
//! State only grows. There is no operation that removes a message, a
//! selection, or a row.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog;
use crate::types::{ChatMessage, ReportRow, ReportTable, SelectedSet};

/// Mutable state owned by one user session.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    transcript: Vec<ChatMessage>,
    selected: SelectedSet,
    report: ReportTable,
    /// Chat turn waiting for its reply. At most one per session.
    pending_turn: Option<Uuid>,
}

/// Read-only copy of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub transcript: Vec<ChatMessage>,
    pub selected: Vec<String>,
    pub available: Vec<String>,
    pub report: ReportTable,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Start an empty session under a caller-chosen id.
    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            started_at: now,
            last_active_at: now,
            transcript: Vec::new(),
            selected: SelectedSet::default(),
            report: ReportTable::default(),
            pending_turn: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn selected(&self) -> &SelectedSet {
        &self.selected
    }

    pub fn report(&self) -> &ReportTable {
        &self.report
    }

    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Record activity now.
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// Whether the session has been idle for longer than `timeout`.
    pub fn is_idle(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_active_at > timeout
    }

    /// Open a chat turn: append the user message and return the turn id with
    /// the history to send. Returns `None`, leaving the transcript untouched,
    /// while another turn is still waiting for its reply.
    pub fn begin_turn(&mut self, message: ChatMessage) -> Option<(Uuid, Vec<ChatMessage>)> {
        if self.pending_turn.is_some() {
            return None;
        }
        let turn = Uuid::new_v4();
        self.pending_turn = Some(turn);
        self.transcript.push(message);
        Some((turn, self.transcript.clone()))
    }

    /// Close turn `turn` with `reply`.
    ///
    /// If the session was replaced while the reply was pending, the user
    /// message is appended again first so every reply follows its question.
    /// Returns false, discarding the reply, when a different turn now owns
    /// the transcript.
    pub fn finish_turn(&mut self, turn: Uuid, user: ChatMessage, reply: ChatMessage) -> bool {
        match self.pending_turn {
            Some(pending) if pending == turn => {}
            Some(_) => return false,
            None => self.transcript.push(user),
        }
        self.transcript.push(reply);
        self.pending_turn = None;
        true
    }

    /// Release turn `turn` without a reply, withdrawing its question.
    pub fn cancel_turn(&mut self, turn: Uuid) {
        if self.pending_turn == Some(turn) {
            self.pending_turn = None;
            self.transcript.pop();
        }
    }

    pub fn has_pending_turn(&self) -> bool {
        self.pending_turn.is_some()
    }

    /// Societies from the catalog not yet selected, in catalog order.
    pub fn available_societies(&self) -> Vec<String> {
        catalog::SOCIETIES
            .iter()
            .filter(|s| !self.selected.contains(s))
            .map(|s| s.to_string())
            .collect()
    }

    /// Claim `name` for report generation.
    ///
    /// Returns false for an empty name or one already claimed. A claim is
    /// taken before any question is asked, so a repeat selection while a
    /// build is in flight is rejected.
    pub fn claim(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.selected.insert(name)
    }

    /// Append a finished row to the report.
    pub fn append_row(&mut self, row: ReportRow) -> bool {
        self.report.push(row)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            started_at: self.started_at,
            transcript: self.transcript.clone(),
            selected: self.selected.iter().map(str::to_string).collect(),
            available: self.available_societies(),
            report: self.report.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_appends_question_then_reply() {
        let mut session = Session::new();
        let (turn, history) = session.begin_turn(ChatMessage::user("Hello")).unwrap();
        assert_eq!(history, vec![ChatMessage::user("Hello")]);
        assert!(session.has_pending_turn());

        assert!(session.finish_turn(turn, ChatMessage::user("Hello"), ChatMessage::assistant("Hi")));
        assert_eq!(
            session.transcript(),
            &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi")]
        );
        assert!(!session.has_pending_turn());
    }

    #[test]
    fn test_overlapping_turn_is_refused() {
        let mut session = Session::new();
        let (turn, _) = session.begin_turn(ChatMessage::user("first")).unwrap();
        assert!(session.begin_turn(ChatMessage::user("second")).is_none());
        assert_eq!(session.transcript().len(), 1);

        session.finish_turn(turn, ChatMessage::user("first"), ChatMessage::assistant("a1"));
        assert!(session.begin_turn(ChatMessage::user("second")).is_some());
        assert_eq!(session.transcript()[2], ChatMessage::user("second"));
    }

    #[test]
    fn test_reply_into_replaced_session_keeps_its_question() {
        let mut old = Session::new();
        let (turn, _) = old.begin_turn(ChatMessage::user("Hello")).unwrap();

        let mut fresh = Session::with_id(old.id());
        assert!(fresh.finish_turn(turn, ChatMessage::user("Hello"), ChatMessage::assistant("Hi")));
        assert_eq!(
            fresh.transcript(),
            &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi")]
        );
    }

    #[test]
    fn test_stale_reply_is_discarded_when_another_turn_owns_session() {
        let mut session = Session::new();
        let (current, _) = session.begin_turn(ChatMessage::user("new")).unwrap();
        let stale = Uuid::new_v4();
        assert!(!session.finish_turn(stale, ChatMessage::user("old"), ChatMessage::assistant("late")));
        assert_eq!(session.transcript(), &[ChatMessage::user("new")]);
        assert!(session.has_pending_turn());

        session.cancel_turn(stale);
        assert!(session.has_pending_turn());
        session.cancel_turn(current);
        assert!(!session.has_pending_turn());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_cancelled_turn_withdraws_only_its_question() {
        let mut session = Session::new();
        let (first, _) = session.begin_turn(ChatMessage::user("Hello")).unwrap();
        session.finish_turn(first, ChatMessage::user("Hello"), ChatMessage::assistant("Hi"));

        let (second, _) = session.begin_turn(ChatMessage::user("Abandoned")).unwrap();
        session.cancel_turn(second);
        assert_eq!(
            session.transcript(),
            &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi")]
        );
        assert!(session.begin_turn(ChatMessage::user("Again")).is_some());
    }

    #[test]
    fn test_with_id_keeps_id() {
        let id = Uuid::new_v4();
        let session = Session::with_id(id);
        assert_eq!(session.id(), id);
        assert_eq!(session.snapshot().id, id);
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.transcript().is_empty());
        assert!(session.selected().is_empty());
        assert!(session.report().is_empty());
        assert_eq!(session.available_societies().len(), 5);
    }

    #[test]
    fn test_claim_filters_available() {
        let mut session = Session::new();
        let asco = catalog::SOCIETIES[2];
        assert!(session.claim(asco));
        assert!(!session.claim(asco));
        let available = session.available_societies();
        assert_eq!(available.len(), 4);
        assert!(!available.iter().any(|s| s == asco));
    }

    #[test]
    fn test_claim_rejects_empty_name() {
        let mut session = Session::new();
        assert!(!session.claim(""));
        assert!(session.selected().is_empty());
    }

    #[test]
    fn test_is_idle() {
        let session = Session::new();
        let later = session.last_active_at() + Duration::minutes(30);
        assert!(session.is_idle(Duration::minutes(10), later));
        assert!(!session.is_idle(Duration::minutes(60), later));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = Session::new();
        session.begin_turn(ChatMessage::user("Hello"));
        session.claim(catalog::SOCIETIES[0]);
        let snap = session.snapshot();
        assert_eq!(snap.id, session.id());
        assert_eq!(snap.transcript.len(), 1);
        assert_eq!(snap.selected, vec![catalog::SOCIETIES[0].to_string()]);
        assert_eq!(snap.available.len(), 4);
    }
}
