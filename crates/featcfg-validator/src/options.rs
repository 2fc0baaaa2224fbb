//! # Validator Options
//!
//! Policy knobs for a [`ConfigValidator`](crate::ConfigValidator). Options
//! deserialize from YAML or JSON with every field defaulted, so an empty
//! document yields the default policy.

use featcfg_core::ValidationStatus;
use serde::{Deserialize, Serialize};

/// How naming-convention violations affect the result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Violations are reported as `Warn`.
    #[default]
    Advisory,
    /// Violations are reported as `Invalid`.
    Strict,
}

impl NamingPolicy {
    /// Status reported when at least one name violates its grammar.
    pub fn violation_status(&self) -> ValidationStatus {
        match self {
            Self::Advisory => ValidationStatus::Warn,
            Self::Strict => ValidationStatus::Invalid,
        }
    }
}

/// Validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    pub naming_policy: NamingPolicy,
}

impl ValidatorOptions {
    /// Parse options from YAML (or JSON) text.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_advisory() {
        let opts = ValidatorOptions::default();
        assert_eq!(opts.naming_policy, NamingPolicy::Advisory);
        assert_eq!(opts.naming_policy.violation_status(), ValidationStatus::Warn);
    }

    #[test]
    fn test_parse_strict() {
        let opts = ValidatorOptions::from_yaml_str("naming_policy: strict\n").unwrap();
        assert_eq!(opts.naming_policy, NamingPolicy::Strict);
        assert_eq!(opts.naming_policy.violation_status(), ValidationStatus::Invalid);
    }

    #[test]
    fn test_empty_text_is_default() {
        assert_eq!(ValidatorOptions::from_yaml_str("").unwrap(), ValidatorOptions::default());
        assert_eq!(ValidatorOptions::from_yaml_str("{}").unwrap(), ValidatorOptions::default());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(ValidatorOptions::from_yaml_str("naming_policy: lenient\n").is_err());
    }
}
