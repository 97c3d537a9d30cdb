//! Cell-scoped rules: judge one raw value at a time.

use crate::error::{ConfigError, ConfigResult};
use crate::rules::{render, MessageCatalog};
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Rule Specs (declarative)
// =============================================================================

/// A rule attached to a column, as written in a definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellRuleSpec {
    /// Raw length must fall within `[min, max]`, bounds inclusive.
    Length {
        #[serde(default)]
        min: usize,
        max: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The whole raw value must match `pattern`, case-insensitively.
    Regex {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl CellRuleSpec {
    /// Compile into a ready-to-run rule.
    ///
    /// Bad parameters surface here, while the definition is being compiled,
    /// never in the middle of a run.
    pub fn compile(&self, catalog: &MessageCatalog) -> ConfigResult<CellRule> {
        match self {
            CellRuleSpec::Length { min, max, message } => Ok(CellRule::Length {
                min: *min,
                max: *max,
                message: message.clone().unwrap_or_else(|| catalog.length.clone()),
            }),
            CellRuleSpec::Regex { pattern, message } => {
                // Anchor the whole value; user patterns stay partial-free
                let re = Regex::new(&format!("(?i)^(?:{})$", pattern)).map_err(|e| {
                    ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        source: Box::new(e),
                    }
                })?;
                Ok(CellRule::Regex {
                    re,
                    pattern: pattern.clone(),
                    message: message.clone().unwrap_or_else(|| catalog.regex.clone()),
                })
            }
        }
    }
}

// =============================================================================
// Compiled Rules
// =============================================================================

/// A compiled cell rule. Cheap to clone into skeleton cells.
#[derive(Debug, Clone)]
pub enum CellRule {
    Length {
        min: usize,
        max: usize,
        message: String,
    },
    Regex {
        re: Regex,
        pattern: String,
        message: String,
    },
}

impl CellRule {
    /// Judge a raw value. Absent values never reach a rule.
    pub fn is_valid(&self, raw: &str) -> bool {
        match self {
            CellRule::Length { min, max, .. } => {
                let len = raw.len();
                len >= *min && len <= *max
            }
            CellRule::Regex { re, .. } => re.is_match(raw),
        }
    }

    /// Rendered failure message for this rule.
    pub fn message(&self) -> String {
        match self {
            CellRule::Length { min, max, message } => render(
                message,
                &[
                    ("minLength", min.to_string().as_str()),
                    ("maxLength", max.to_string().as_str()),
                ],
            ),
            CellRule::Regex {
                pattern, message, ..
            } => render(message, &[("pattern", pattern.as_str())]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(spec: CellRuleSpec) -> CellRule {
        spec.compile(&MessageCatalog::default()).unwrap()
    }

    #[test]
    fn test_length_bounds_inclusive() {
        let rule = compile(CellRuleSpec::Length {
            min: 0,
            max: 12,
            message: None,
        });
        assert!(rule.is_valid(""));
        assert!(rule.is_valid("valid string"));
        assert!(!rule.is_valid("invalid string"));
    }

    #[test]
    fn test_length_minimum() {
        let rule = compile(CellRuleSpec::Length {
            min: 2,
            max: 4,
            message: None,
        });
        assert!(!rule.is_valid("a"));
        assert!(rule.is_valid("ab"));
        assert!(rule.is_valid("abcd"));
        assert!(!rule.is_valid("abcde"));
    }

    #[test]
    fn test_length_message_placeholders() {
        let rule = compile(CellRuleSpec::Length {
            min: 0,
            max: 12,
            message: None,
        });
        assert_eq!(
            rule.message(),
            "must be between 0 and 12 characters long"
        );
    }

    #[test]
    fn test_regex_matches_whole_value() {
        let rule = compile(CellRuleSpec::Regex {
            pattern: r"\d+ string \d+".into(),
            message: None,
        });
        assert!(rule.is_valid("1 string 1"));
        assert!(rule.is_valid("21 string 40"));
        assert!(!rule.is_valid("string"));
        assert!(!rule.is_valid("1 string"));
        assert!(!rule.is_valid("x 1 string 1 x"));
    }

    #[test]
    fn test_regex_case_insensitive() {
        let rule = compile(CellRuleSpec::Regex {
            pattern: "[a-z]+".into(),
            message: None,
        });
        assert!(rule.is_valid("ABC"));
    }

    #[test]
    fn test_regex_alternation_stays_anchored() {
        let rule = compile(CellRuleSpec::Regex {
            pattern: "ab|cd".into(),
            message: None,
        });
        assert!(rule.is_valid("ab"));
        assert!(rule.is_valid("cd"));
        assert!(!rule.is_valid("xab"));
        assert!(!rule.is_valid("cdx"));
    }

    #[test]
    fn test_regex_message_placeholder() {
        let rule = compile(CellRuleSpec::Regex {
            pattern: "[0-9]+".into(),
            message: None,
        });
        assert_eq!(rule.message(), "does not match the pattern [0-9]+");
    }

    #[test]
    fn test_custom_message_wins_over_catalog() {
        let rule = compile(CellRuleSpec::Length {
            min: 1,
            max: 3,
            message: Some("keep it between %minLength% and %maxLength%".into()),
        });
        assert_eq!(rule.message(), "keep it between 1 and 3");
    }

    #[test]
    fn test_malformed_pattern_is_config_error() {
        let result = CellRuleSpec::Regex {
            pattern: "([".into(),
            message: None,
        }
        .compile(&MessageCatalog::default());
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_spec_deserializes_from_tagged_json() {
        let spec: CellRuleSpec =
            serde_json::from_str(r#"{"type": "length", "max": 12}"#).unwrap();
        assert_eq!(
            spec,
            CellRuleSpec::Length {
                min: 0,
                max: 12,
                message: None
            }
        );

        let spec: CellRuleSpec =
            serde_json::from_str(r#"{"type": "regex", "pattern": "[A-Z]+"}"#).unwrap();
        assert!(matches!(spec, CellRuleSpec::Regex { .. }));
    }
}
