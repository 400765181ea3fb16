use std::fmt::Write;

use crate::catalog::TestCatalog;
use crate::diagnosis::parameters::{hint_for, IS_VENTILATED, RESPIRATORY_RATE};
use crate::diagnosis::{DiagnosisSession, Question};

use super::outcome::DiagnosisOutcome;

pub(crate) const VENTILATION_PROMPT: &str =
    "Is the patient on mechanical ventilation? (reply 'yes' or 'no')";
pub(crate) const ANSWER_NUMBER_PROMPT: &str =
    "Please reply with the number of an answer (1, 2, 3 and so on).";
pub(crate) const ANSWER_RANGE_PROMPT: &str = "Please choose one of the listed answer numbers.";
pub(crate) const NO_QUESTIONS: &str = "Error: this test has no questions.";
pub(crate) const QUESTION_NOT_FOUND: &str = "Error: the current question could not be found.";

pub(crate) fn command_list(catalog: &TestCatalog) -> String {
    catalog
        .tests()
        .iter()
        .map(|test| test.command())
        .collect::<Vec<_>>()
        .join(" or ")
}

pub(crate) fn welcome(catalog: &TestCatalog) -> String {
    let mut text = String::from("Welcome to the severity scoring assistant!\n\nAvailable tests:\n");
    for test in catalog.tests() {
        let _ = writeln!(text, "{} - {}", test.command(), test.name());
    }
    text.push_str("\nUse /cancel to abort a running test.");
    text
}

pub(crate) fn no_active_test(catalog: &TestCatalog) -> String {
    format!(
        "No active test. Start one with {}.",
        command_list(catalog)
    )
}

pub(crate) fn unknown_command(command: &str, catalog: &TestCatalog) -> String {
    format!(
        "Unknown command {command}. Available tests: {}.",
        command_list(catalog)
    )
}

pub(crate) fn cancelled(catalog: &TestCatalog) -> String {
    format!(
        "Test cancelled. Start a new one with {}.",
        command_list(catalog)
    )
}

/// `Question k of N`, the prompt, numbered answers, and an optional hint.
pub(crate) fn question(session: &DiagnosisSession, question: &Question) -> String {
    let mut text = format!(
        "Question {} of {}:\n{}\n\n",
        session.current_question_number(),
        session.total_questions(),
        question.text()
    );

    for (index, label) in question.possible_answers().into_iter().enumerate() {
        let _ = writeln!(text, "{}. {}", index + 1, label);
    }

    let awaiting_ventilation = question.parameter_name() == RESPIRATORY_RATE
        && !session.has_answer_for(IS_VENTILATED);
    if question.parameter_name() != RESPIRATORY_RATE || awaiting_ventilation {
        if let Some(hint) = hint_for(question.parameter_name()) {
            let _ = write!(text, "\n{hint}");
        }
    }

    text
}

pub(crate) fn completed(outcome: &DiagnosisOutcome, catalog: &TestCatalog) -> String {
    format!(
        "Assessment complete.\n\n{}\n\nStart a new test with {}.",
        outcome.summary(),
        command_list(catalog)
    )
}
