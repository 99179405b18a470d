use serde::{Deserialize, Serialize};

use crate::catalog;

/// Cell value recorded when a report question could not be answered.
pub const ERROR_MARKER: &str = "Error";

// =============================================================================
// Chat
// =============================================================================

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message in a transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// One report row: a society and its answers in template order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub society: String,
    pub answers: Vec<String>,
}

impl ReportRow {
    /// All cells in column order, society first.
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.society.as_str()).chain(self.answers.iter().map(String::as_str))
    }

    /// Number of answers equal to the error marker.
    pub fn error_count(&self) -> usize {
        self.answers.iter().filter(|a| *a == ERROR_MARKER).count()
    }
}

/// Append-only table of report rows with a column set fixed at creation.
///
/// Serialize only: every row enters through [`ReportTable::push`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<ReportRow>,
}

impl Default for ReportTable {
    fn default() -> Self {
        Self::new(catalog::report_columns())
    }
}

impl ReportTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, society: &str) -> bool {
        self.rows.iter().any(|r| r.society == society)
    }

    /// Append a row. Returns false, leaving the table untouched, when the
    /// row's width does not match the columns or the society already has a row.
    pub fn push(&mut self, row: ReportRow) -> bool {
        if row.answers.len() + 1 != self.columns.len() || self.contains(&row.society) {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Look up a cell by society and column header.
    pub fn cell(&self, society: &str, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        let row = self.rows.iter().find(|r| r.society == society)?;
        row.cells().nth(idx)
    }
}

/// Insertion-ordered set of societies already turned into rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSet(Vec<String>);

impl SelectedSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Insert `name`; returns false if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
