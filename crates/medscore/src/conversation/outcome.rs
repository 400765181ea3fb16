use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diagnosis::{mortality_risk, DiagnosisSession, DiagnosticTest};

/// Final result of a completed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisOutcome {
    pub test_name: String,
    pub total_score: i32,
    pub diagnosis: String,
    pub mortality_risk: String,
    pub completed_at: DateTime<Utc>,
}

impl DiagnosisOutcome {
    pub fn from_session(session: &DiagnosisSession) -> Self {
        let test_name = session.test().name().to_string();
        let total_score = session.total_score();

        Self {
            mortality_risk: mortality_risk(total_score, &test_name).to_string(),
            diagnosis: session.diagnosis_result(),
            test_name,
            total_score,
            completed_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Total score: {}\nSeverity: {}\nPredicted mortality risk: {}",
            self.total_score, self.diagnosis, self.mortality_risk
        )
    }
}

/// Scores a complete set of answers without a conversation.
pub fn score_answers<I, K>(test: Arc<DiagnosticTest>, answers: I) -> DiagnosisOutcome
where
    I: IntoIterator<Item = (K, i32)>,
    K: Into<String>,
{
    let mut session = DiagnosisSession::new(test);
    for (parameter, value) in answers {
        session.record_answer(parameter, value);
    }
    DiagnosisOutcome::from_session(&session)
}
