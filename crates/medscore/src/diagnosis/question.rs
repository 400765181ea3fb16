use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One prompt of a scoring test together with its labelled point values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "questionText")]
    text: String,
    #[serde(rename = "parameterName")]
    parameter_name: String,
    #[serde(default)]
    answers: IndexMap<String, i32>,
}

impl Question {
    pub fn new<I, L>(text: impl Into<String>, parameter_name: impl Into<String>, answers: I) -> Self
    where
        I: IntoIterator<Item = (L, i32)>,
        L: Into<String>,
    {
        Self {
            text: text.into(),
            parameter_name: parameter_name.into(),
            answers: answers
                .into_iter()
                .map(|(label, points)| (label.into(), points))
                .collect(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// Answer labels and their points in authoring order.
    pub fn answers(&self) -> &IndexMap<String, i32> {
        &self.answers
    }

    pub fn possible_answers(&self) -> Vec<&str> {
        self.answers.keys().map(String::as_str).collect()
    }

    pub fn value_for_answer(&self, label: &str) -> Option<i32> {
        self.answers.get(label).copied()
    }

    /// Resolves a 1-based choice as displayed to the user.
    pub fn choice(&self, number: usize) -> Option<(&str, i32)> {
        let index = number.checked_sub(1)?;
        self.answers
            .get_index(index)
            .map(|(label, points)| (label.as_str(), *points))
    }
}
