//! Scoring tests, per-user sessions, and the rules that turn a total score
//! into a severity label.

mod definition;
mod mortality;
pub mod parameters;
mod question;
pub mod rules;
mod session;
mod skip;

pub use definition::DiagnosticTest;
pub use mortality::{mortality_risk, APACHE_II, APACHE_III, UNKNOWN_RISK};
pub use question::Question;
pub use rules::{RuleKey, RuleKeyError, ScoreRule, UNDETERMINED};
pub use session::{DiagnosisSession, SessionState};
pub use skip::SkipPolicy;
