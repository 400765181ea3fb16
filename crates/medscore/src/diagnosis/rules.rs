use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

/// Label returned when no rule covers the score.
pub const UNDETERMINED: &str = "undetermined";

/// Parsed form of a rule key such as `"10-19"`, `">=30"`, `"≥30"` or `"15"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKey {
    Range { min: i32, max: i32 },
    AtLeast { threshold: i32 },
    Exact { value: i32 },
}

impl RuleKey {
    /// Upper bound used to order rules before the first-match scan.
    pub const fn sort_key(self) -> i32 {
        match self {
            RuleKey::Range { max, .. } => max,
            RuleKey::AtLeast { threshold } => threshold,
            RuleKey::Exact { value } => value,
        }
    }

    pub const fn matches(self, score: i32) -> bool {
        match self {
            RuleKey::Range { min, max } => min <= score && score <= max,
            RuleKey::AtLeast { threshold } => score >= threshold,
            RuleKey::Exact { value } => score == value,
        }
    }
}

impl FromStr for RuleKey {
    type Err = RuleKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim();
        let number = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|source| RuleKeyError::Malformed {
                    key: raw.to_string(),
                    source,
                })
        };

        if let Some(rest) = key.strip_prefix(">=").or_else(|| key.strip_prefix('≥')) {
            return Ok(RuleKey::AtLeast {
                threshold: number(rest)?,
            });
        }

        if let Some((min, max)) = key.split_once('-') {
            return Ok(RuleKey::Range {
                min: number(min)?,
                max: number(max)?,
            });
        }

        Ok(RuleKey::Exact {
            value: number(key)?,
        })
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::Range { min, max } => write!(f, "{min}-{max}"),
            RuleKey::AtLeast { threshold } => write!(f, ">={threshold}"),
            RuleKey::Exact { value } => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleKeyError {
    #[error("rule key '{key}' has a non-numeric bound")]
    Malformed {
        key: String,
        #[source]
        source: ParseIntError,
    },
}

/// A parsed rule borrowed from a test definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRule<'a> {
    pub key: RuleKey,
    pub label: &'a str,
}

/// Parses and orders rules ascending by upper bound.
///
/// The sort is stable, so rules sharing a bound keep their authoring order.
/// Keys that fail to parse are logged and left out.
pub fn ordered_rules(rules: &IndexMap<String, String>) -> Vec<ScoreRule<'_>> {
    let mut parsed: Vec<ScoreRule<'_>> = rules
        .iter()
        .filter_map(|(raw, label)| match raw.parse::<RuleKey>() {
            Ok(key) => Some(ScoreRule { key, label }),
            Err(err) => {
                warn!(error = %err, rule = %raw, "skipping malformed diagnosis rule");
                None
            }
        })
        .collect();

    parsed.sort_by_key(|rule| rule.key.sort_key());
    parsed
}

/// Maps a total score to the label of the first matching rule.
pub fn evaluate(score: i32, rules: &IndexMap<String, String>) -> String {
    ordered_rules(rules)
        .into_iter()
        .find(|rule| rule.key.matches(score))
        .map(|rule| rule.label.to_string())
        .unwrap_or_else(|| UNDETERMINED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(key, label)| (key.to_string(), label.to_string()))
            .collect()
    }

    #[test]
    fn parses_every_dialect() {
        assert_eq!(
            "10-20".parse::<RuleKey>().expect("range"),
            RuleKey::Range { min: 10, max: 20 }
        );
        assert_eq!(
            " 10 - 20 ".parse::<RuleKey>().expect("padded range"),
            RuleKey::Range { min: 10, max: 20 }
        );
        assert_eq!(
            ">=30".parse::<RuleKey>().expect("ascii threshold"),
            RuleKey::AtLeast { threshold: 30 }
        );
        assert_eq!(
            "≥ 30".parse::<RuleKey>().expect("unicode threshold"),
            RuleKey::AtLeast { threshold: 30 }
        );
        assert_eq!(
            "15".parse::<RuleKey>().expect("exact"),
            RuleKey::Exact { value: 15 }
        );
    }

    #[test]
    fn rejects_non_numeric_bounds() {
        for raw in ["abc", "10-x", ">=", "≥ten", "-5", ""] {
            assert!(raw.parse::<RuleKey>().is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let key: RuleKey = "10-20".parse().expect("range");
        assert!(key.matches(10));
        assert!(key.matches(20));
        assert!(!key.matches(9));
        assert!(!key.matches(21));
    }

    #[test]
    fn threshold_and_exact_matching() {
        let threshold: RuleKey = ">=30".parse().expect("threshold");
        assert!(threshold.matches(30));
        assert!(threshold.matches(71));
        assert!(!threshold.matches(29));

        let exact: RuleKey = "15".parse().expect("exact");
        assert!(exact.matches(15));
        assert!(!exact.matches(14));
        assert!(!exact.matches(16));
    }

    #[test]
    fn empty_rule_set_is_undetermined() {
        let empty = IndexMap::new();
        for score in [-3, 0, 12, 400] {
            assert_eq!(evaluate(score, &empty), UNDETERMINED);
        }
    }

    #[test]
    fn smallest_upper_bound_wins_on_overlap() {
        let rules = rules(&[("0-40", "Broad"), ("5-12", "Narrow"), (">=50", "Critical")]);
        assert_eq!(evaluate(6, &rules), "Narrow");
        assert_eq!(evaluate(13, &rules), "Broad");
        assert_eq!(evaluate(4, &rules), "Broad");
        assert_eq!(evaluate(55, &rules), "Critical");
        assert_eq!(evaluate(45, &rules), UNDETERMINED);
    }

    #[test]
    fn equal_bounds_keep_authoring_order() {
        let rules = rules(&[("10-20", "First"), ("≥20", "Second"), ("20", "Third")]);
        assert_eq!(evaluate(20, &rules), "First");
        assert_eq!(evaluate(25, &rules), "Second");
    }

    #[test]
    fn mixed_dialects_resolve_together() {
        let rules = rules(&[
            ("≥30", "Extremely severe"),
            ("0-9", "Mild"),
            (">=20", "Severe"),
            ("10-19", "Moderate"),
        ]);
        assert_eq!(evaluate(0, &rules), "Mild");
        assert_eq!(evaluate(15, &rules), "Moderate");
        assert_eq!(evaluate(22, &rules), "Severe");
        assert_eq!(evaluate(35, &rules), "Severe");
    }

    #[test]
    fn malformed_rules_are_excluded_not_fatal() {
        let rules = rules(&[("high", "Broken"), ("0-5", "Low"), ("6-x", "Broken too")]);
        assert_eq!(evaluate(3, &rules), "Low");
        assert_eq!(evaluate(7, &rules), UNDETERMINED);
        assert_eq!(ordered_rules(&rules).len(), 1);
    }

    #[test]
    fn display_round_trips_to_canonical_form() {
        let key: RuleKey = "≥ 7".parse().expect("threshold");
        assert_eq!(key.to_string(), ">=7");
    }
}
