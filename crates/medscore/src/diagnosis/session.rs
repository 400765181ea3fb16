use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::definition::DiagnosticTest;
use super::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Complete,
}

/// Progress of one user through one test: a cursor over the questions plus
/// the answers recorded so far.
#[derive(Debug, Clone)]
pub struct DiagnosisSession {
    test: Arc<DiagnosticTest>,
    answers: HashMap<String, i32>,
    cursor: usize,
    started_at: DateTime<Utc>,
}

impl DiagnosisSession {
    pub fn new(test: Arc<DiagnosticTest>) -> Self {
        Self {
            test,
            answers: HashMap::new(),
            cursor: 0,
            started_at: Utc::now(),
        }
    }

    pub fn test(&self) -> &DiagnosticTest {
        &self.test
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Serves the question under the cursor and advances past it.
    pub fn next_question(&mut self) -> Option<Question> {
        let question = self.test.questions().get(self.cursor)?.clone();
        self.cursor += 1;
        Some(question)
    }

    /// The most recently served question.
    pub fn current_question(&self) -> Option<&Question> {
        let index = self.cursor.checked_sub(1)?;
        self.test.questions().get(index)
    }

    /// 1-based number of the most recently served question; 0 before the first.
    pub fn current_question_number(&self) -> usize {
        self.cursor
    }

    pub fn total_questions(&self) -> usize {
        self.test.questions().len()
    }

    pub fn record_answer(&mut self, parameter: impl Into<String>, value: i32) {
        self.answers.insert(parameter.into(), value);
    }

    pub fn has_answer_for(&self, parameter: &str) -> bool {
        self.answers.contains_key(parameter)
    }

    pub fn answer_for(&self, parameter: &str) -> Option<i32> {
        self.answers.get(parameter).copied()
    }

    /// Snapshot of the recorded answers.
    pub fn answers(&self) -> HashMap<String, i32> {
        self.answers.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total_questions()
    }

    pub fn state(&self) -> SessionState {
        if self.is_complete() {
            SessionState::Complete
        } else if self.cursor == 0 {
            SessionState::NotStarted
        } else {
            SessionState::InProgress
        }
    }

    /// Sum of every recorded value, saturating at the `i32` bounds.
    pub fn total_score(&self) -> i32 {
        self.answers
            .values()
            .fold(0i32, |total, value| total.saturating_add(*value))
    }

    pub fn diagnosis_result(&self) -> String {
        self.test.evaluate(self.total_score())
    }
}
