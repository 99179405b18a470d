//! Report builder: one model call per question template, answers assembled
//! into a single row.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;

use pharmaq_chat::{CompletionClient, LlmError};
use pharmaq_core::catalog::{self, QUESTION_TEMPLATES};
use pharmaq_core::types::{ChatMessage, ReportRow, ERROR_MARKER};

/// A question that could not be answered while building a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFailure {
    pub question: String,
    pub reason: String,
}

impl fmt::Display for QuestionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error with '{}': {}", self.question, self.reason)
    }
}

/// A completed row plus the questions that fell back to the error marker.
#[derive(Debug, Clone)]
pub struct ReportBuild {
    pub row: ReportRow,
    pub failures: Vec<QuestionFailure>,
}

/// Asks every question template about a society.
#[derive(Clone)]
pub struct ReportBuilder {
    client: Arc<dyn CompletionClient>,
    concurrent: bool,
}

impl ReportBuilder {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            concurrent: false,
        }
    }

    /// Issue the questions concurrently; answers still land in template order.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Build the row for `society`.
    ///
    /// Always yields a complete row: an unanswered question gets the error
    /// marker and never stops the remaining questions.
    pub async fn build_row(&self, society: &str) -> ReportBuild {
        let questions: Vec<String> = QUESTION_TEMPLATES
            .iter()
            .map(|t| catalog::render_question(t, society))
            .collect();

        tracing::info!(
            society = %society,
            questions = questions.len(),
            concurrent = self.concurrent,
            "Building report row"
        );

        let results = if self.concurrent {
            join_all(questions.iter().map(|q| self.ask(q))).await
        } else {
            let mut results = Vec::with_capacity(questions.len());
            for q in &questions {
                results.push(self.ask(q).await);
            }
            results
        };

        let mut answers = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (question, result) in questions.into_iter().zip(results) {
            match result {
                Ok(answer) => answers.push(answer),
                Err(e) => {
                    tracing::warn!(question = %question, error = %e, "Report question failed");
                    answers.push(ERROR_MARKER.to_string());
                    failures.push(QuestionFailure {
                        question,
                        reason: e.to_string(),
                    });
                }
            }
        }

        ReportBuild {
            row: ReportRow {
                society: society.to_string(),
                answers,
            },
            failures,
        }
    }

    async fn ask(&self, question: &str) -> Result<String, LlmError> {
        let messages = [ChatMessage::user(question)];
        self.client
            .complete(&messages)
            .await
            .map(|answer| answer.trim().to_string())
    }
}
