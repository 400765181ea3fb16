use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::question::Question;
use super::rules;

/// A scoring test: ordered questions plus score-range → diagnosis rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticTest {
    #[serde(rename = "testName")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(rename = "diagnosisRules", default)]
    rules: IndexMap<String, String>,
}

impl DiagnosticTest {
    pub fn new<R, K, V>(name: impl Into<String>, questions: Vec<Question>, rules: R) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            command: None,
            questions,
            rules: rules
                .into_iter()
                .map(|(key, label)| (key.into(), label.into()))
                .collect(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slash command that starts this test.
    ///
    /// Falls back to the part of the name before the first `(`, reduced to
    /// lower-case alphanumerics: `"APACHE II (…)"` becomes `/apacheii`.
    pub fn command(&self) -> String {
        if let Some(command) = self.command.as_deref().map(str::trim) {
            if !command.is_empty() {
                let command = command.to_lowercase();
                return if command.starts_with('/') {
                    command
                } else {
                    format!("/{command}")
                };
            }
        }

        let stem = self.name.split('(').next().unwrap_or_default();
        let slug: String = stem
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        format!("/{slug}")
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn rules(&self) -> &IndexMap<String, String> {
        &self.rules
    }

    /// Label of the first matching rule, see [`rules::evaluate`].
    pub fn evaluate(&self, total_score: i32) -> String {
        rules::evaluate(total_score, &self.rules)
    }
}
