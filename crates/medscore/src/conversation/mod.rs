//! Chat-facing driver around the diagnosis core.
//!
//! Transports hand each inbound text to [`ConversationService::handle`] and
//! deliver the returned [`Reply`]; sessions live in the [`SessionRegistry`]
//! only while a test is running.

mod messages;
mod outcome;
pub mod registry;
mod service;

pub use outcome::{score_answers, DiagnosisOutcome};
pub use registry::{ChatId, SessionHandle, SessionRegistry};
pub use service::{ConversationService, Reply, ReplyKind};
