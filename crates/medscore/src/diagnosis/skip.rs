use super::parameters::{AADO2, IS_VENTILATED, PAO2};
use super::question::Question;
use super::session::DiagnosisSession;

/// Decides whether a question is bypassed given the answers recorded so far.
struct SkipRule {
    parameter: &'static str,
    applies: fn(&DiagnosisSession) -> bool,
}

fn ventilated(session: &DiagnosisSession) -> bool {
    session.answer_for(IS_VENTILATED) == Some(1)
}

fn not_ventilated(session: &DiagnosisSession) -> bool {
    !ventilated(session)
}

const RESPIRATORY_RULES: &[SkipRule] = &[
    SkipRule {
        parameter: AADO2,
        applies: not_ventilated,
    },
    SkipRule {
        parameter: PAO2,
        applies: ventilated,
    },
];

/// Table of conditional skips keyed by parameter name.
///
/// A skipped question is never shown; the caller records `0` for its
/// parameter before moving on.
#[derive(Clone, Copy)]
pub struct SkipPolicy {
    rules: &'static [SkipRule],
}

impl SkipPolicy {
    /// Oxygenation questions: A-aDO₂ only when ventilated, PaO₂ only when not.
    pub const fn respiratory() -> Self {
        Self {
            rules: RESPIRATORY_RULES,
        }
    }

    #[cfg(test)]
    pub(crate) const fn none() -> Self {
        Self { rules: &[] }
    }

    pub fn should_skip(&self, session: &DiagnosisSession, question: &Question) -> bool {
        self.rules
            .iter()
            .filter(|rule| rule.parameter == question.parameter_name())
            .any(|rule| (rule.applies)(session))
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::respiratory()
    }
}

impl std::fmt::Debug for SkipPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.parameter))
            .finish()
    }
}
