use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::TestCatalog;
use crate::diagnosis::parameters::{parse_yes_no, IS_VENTILATED, RESPIRATORY_RATE};
use crate::diagnosis::{DiagnosisSession, DiagnosticTest, SkipPolicy};

use super::messages;
use super::outcome::DiagnosisOutcome;
use super::registry::{lock_session, ChatId, SessionHandle, SessionRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Welcome,
    Question,
    Prompt,
    Completed,
    Cancelled,
    Error,
}

/// Outbound message produced for one inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DiagnosisOutcome>,
}

impl Reply {
    fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            outcome: None,
        }
    }
}

/// Whether the session survives the turn that produced the reply.
enum Turn {
    Continue(Reply),
    Finish(Reply),
}

/// Transport-agnostic driver: walks each chat through its test, applying
/// the skip policy and collecting answers until a diagnosis is reached.
pub struct ConversationService {
    catalog: Arc<TestCatalog>,
    registry: SessionRegistry,
    skip_policy: SkipPolicy,
    session_ttl: Duration,
}

impl ConversationService {
    pub fn new(catalog: Arc<TestCatalog>, session_ttl: Duration) -> Self {
        Self::with_policy(catalog, SkipPolicy::respiratory(), session_ttl)
    }

    fn with_policy(
        catalog: Arc<TestCatalog>,
        skip_policy: SkipPolicy,
        session_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            registry: SessionRegistry::new(),
            skip_policy,
            session_ttl,
        }
    }

    pub fn catalog(&self) -> &TestCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Handles one inbound message for a chat.
    pub fn handle(&self, chat: &ChatId, text: &str) -> Reply {
        let message = text.trim();
        let command = message
            .split_whitespace()
            .next()
            .filter(|token| token.starts_with('/'))
            .map(str::to_lowercase);

        match command.as_deref() {
            Some("/start") => Reply::new(ReplyKind::Welcome, messages::welcome(&self.catalog)),
            Some("/cancel") => self.cancel(chat),
            Some(other) => match self.catalog.find_by_command(other) {
                Some(test) => self.start_test(chat, test),
                None => Reply::new(
                    ReplyKind::Error,
                    messages::unknown_command(other, &self.catalog),
                ),
            },
            None => self.respond(chat, message),
        }
    }

    pub fn start_test(&self, chat: &ChatId, test: Arc<DiagnosticTest>) -> Reply {
        let purged = self.registry.purge_older_than(self.session_ttl, Utc::now());
        if purged > 0 {
            debug!(purged, "dropped abandoned sessions");
        }

        info!(chat = %chat, test = test.name(), "starting test");
        let handle = self.registry.start(chat.clone(), test);
        let turn = {
            let mut session = lock_session(&handle);
            self.ask_next(&mut session)
        };

        match turn {
            Turn::Continue(reply) => reply,
            Turn::Finish(reply) => {
                self.registry.remove_if_same(chat, &handle);
                reply
            }
        }
    }

    pub fn cancel(&self, chat: &ChatId) -> Reply {
        if self.registry.remove(chat) {
            info!(chat = %chat, "test cancelled");
        }
        Reply::new(ReplyKind::Cancelled, messages::cancelled(&self.catalog))
    }

    fn respond(&self, chat: &ChatId, message: &str) -> Reply {
        let Some(handle) = self.registry.get(chat) else {
            return Reply::new(ReplyKind::Prompt, messages::no_active_test(&self.catalog));
        };

        self.respond_with(chat, &handle, message)
    }

    /// Applies a message to the session behind `handle`, provided the chat
    /// still owns it once the session lock is held.
    fn respond_with(&self, chat: &ChatId, handle: &SessionHandle, message: &str) -> Reply {
        let turn = {
            let mut session = lock_session(handle);
            if !self.registry.is_current(chat, handle) {
                debug!(chat = %chat, "session finished while the message was queued");
                return Reply::new(ReplyKind::Prompt, messages::no_active_test(&self.catalog));
            }
            self.answer(&mut session, message)
        };

        match turn {
            Turn::Continue(reply) => reply,
            Turn::Finish(reply) => {
                self.registry.remove_if_same(chat, handle);
                reply
            }
        }
    }

    fn answer(&self, session: &mut DiagnosisSession, message: &str) -> Turn {
        let Some(question) = session.current_question().cloned() else {
            return Turn::Finish(Reply::new(ReplyKind::Error, messages::QUESTION_NOT_FOUND));
        };

        if question.parameter_name() == RESPIRATORY_RATE && !session.has_answer_for(IS_VENTILATED)
        {
            return match parse_yes_no(message) {
                Some(ventilated) => {
                    session.record_answer(IS_VENTILATED, i32::from(ventilated));
                    Turn::Continue(Reply::new(
                        ReplyKind::Question,
                        messages::question(session, &question),
                    ))
                }
                None => Turn::Continue(Reply::new(ReplyKind::Prompt, messages::VENTILATION_PROMPT)),
            };
        }

        let Ok(number) = message.parse::<usize>() else {
            return Turn::Continue(Reply::new(ReplyKind::Prompt, messages::ANSWER_NUMBER_PROMPT));
        };
        let Some((label, points)) = question.choice(number) else {
            return Turn::Continue(Reply::new(ReplyKind::Prompt, messages::ANSWER_RANGE_PROMPT));
        };

        debug!(
            parameter = question.parameter_name(),
            answer = label,
            points,
            "answer recorded"
        );
        session.record_answer(question.parameter_name(), points);

        if session.is_complete() {
            Turn::Finish(self.complete(session))
        } else {
            self.ask_next(session)
        }
    }

    /// Serves the next question that is not skipped, recording 0 for every
    /// question passed over.
    fn ask_next(&self, session: &mut DiagnosisSession) -> Turn {
        loop {
            let Some(question) = session.next_question() else {
                if session.current_question_number() == 0 {
                    warn!(test = session.test().name(), "test has no questions");
                    return Turn::Finish(Reply::new(ReplyKind::Error, messages::NO_QUESTIONS));
                }
                return Turn::Finish(self.complete(session));
            };

            if self.skip_policy.should_skip(session, &question) {
                debug!(parameter = question.parameter_name(), "question skipped");
                session.record_answer(question.parameter_name(), 0);
                continue;
            }

            if question.answers().is_empty() {
                warn!(
                    parameter = question.parameter_name(),
                    "question has no answers, scoring as zero"
                );
                session.record_answer(question.parameter_name(), 0);
                continue;
            }

            return Turn::Continue(Reply::new(
                ReplyKind::Question,
                messages::question(session, &question),
            ));
        }
    }

    fn complete(&self, session: &DiagnosisSession) -> Reply {
        let outcome = DiagnosisOutcome::from_session(session);
        info!(
            test = %outcome.test_name,
            total_score = outcome.total_score,
            diagnosis = %outcome.diagnosis,
            "test completed"
        );

        Reply {
            text: messages::completed(&outcome, &self.catalog),
            kind: ReplyKind::Completed,
            outcome: Some(outcome),
        }
    }
}
