//! # Config Types and Validation Phases
//!
//! The two closed enumerations that shape every validation request.
//! They are orthogonal: not every `(ConfigType, ValidationPhase)` pair is
//! implemented, and the dispatcher rejects unsupported pairs with a fatal
//! error rather than a result.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigValidationError;

/// The kind of configuration document being validated.
///
/// Determines which bundled schema applies and which additional checks
/// run after schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigType {
    /// Feature sources, anchors and derivations.
    FeatureDef,
    /// How feature values are joined onto an observation dataset.
    Join,
    /// Display metadata for features.
    Presentation,
}

impl ConfigType {
    /// Returns all config types in canonical order.
    pub fn all() -> &'static [ConfigType] {
        &[Self::FeatureDef, Self::Join, Self::Presentation]
    }

    /// Returns the identifier for this config type, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeatureDef => "FeatureDef",
            Self::Join => "Join",
            Self::Presentation => "Presentation",
        }
    }
}

impl std::fmt::Display for ConfigType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigType {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FeatureDef" => Ok(Self::FeatureDef),
            "Join" => Ok(Self::Join),
            "Presentation" => Ok(Self::Presentation),
            other => Err(ConfigValidationError::UnknownName {
                kind: "config type",
                name: other.to_string(),
            }),
        }
    }
}

/// Which phase of validation a caller is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPhase {
    /// Structural conformance: parseable, schema-valid, naming conventions.
    Syntactic,
    /// Domain-rule conformance over a fully built object graph.
    Semantic,
}

impl ValidationPhase {
    /// Returns the snake_case identifier for this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntactic => "syntactic",
            Self::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationPhase {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "syntactic" => Ok(Self::Syntactic),
            "semantic" => Ok(Self::Semantic),
            other => Err(ConfigValidationError::UnknownName {
                kind: "validation phase",
                name: other.to_string(),
            }),
        }
    }
}
