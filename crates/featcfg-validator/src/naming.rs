//! # Naming Convention Checker
//!
//! Identifier conventions for FeatureDef configs that JSON Schema cannot
//! express, because they constrain the keys of several sibling sections.
//!
//! - Source and anchor names (the keys of `sources` and `anchors`) must match
//!   [`SOURCE_ANCHOR_NAME_REGEX`].
//! - Feature names (declared by anchors, plus the keys of `derivations`) must
//!   be strict typed references, see [`featcfg_core::typed_ref`].
//!
//! An anchor's `features` field is either a list of names or a mapping keyed
//! by name; both representations yield the same name set. Any other shape
//! is a fatal [`ConfigValidationError::FeatureExtraction`]: the schema should
//! already have rejected it, so reaching the checker means the schema and
//! the checker disagree.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use featcfg_core::tree::{key_name, untagged, value_kind};
use featcfg_core::{
    is_strict_typed_ref, ConfigValidationError, ParsedConfig, RenderError, ValidationPhase,
    ValidationResult, TYPED_REF_BNF,
};
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::options::NamingPolicy;

/// Top-level section holding source definitions.
pub const SOURCES: &str = "sources";
/// Top-level section holding anchor definitions.
pub const ANCHORS: &str = "anchors";
/// Top-level section holding derivation definitions.
pub const DERIVATIONS: &str = "derivations";
/// Anchor field declaring the anchor's features.
pub const FEATURES: &str = "features";

/// Grammar for source and anchor names.
pub const SOURCE_ANCHOR_NAME_REGEX: &str = "^[a-zA-Z][-a-zA-Z0-9_]*$";

static SOURCE_ANCHOR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SOURCE_ANCHOR_NAME_REGEX).expect("source/anchor grammar is a valid regex")
});

/// Returns true if `name` is a valid source or anchor name.
pub fn is_valid_source_anchor_name(name: &str) -> bool {
    SOURCE_ANCHOR_NAME.is_match(name)
}

/// An anchor's `features` field, by representation.
#[derive(Debug, Clone, Copy)]
pub enum AnchorFeatureNames<'a> {
    /// `features: [f1, f2]`: the string elements are the names.
    List(&'a [Value]),
    /// `features: {f1: {...}, f2: {...}}`: the keys are the names.
    Map(&'a Mapping),
}

impl<'a> AnchorFeatureNames<'a> {
    /// Classify the `features` field of one anchor.
    pub fn of_anchor(anchor_name: &str, anchor: &'a Value) -> Result<Self, ConfigValidationError> {
        let extraction_err = |found: String| ConfigValidationError::FeatureExtraction {
            anchor: anchor_name.to_string(),
            found,
        };
        let Value::Mapping(anchor) = untagged(anchor) else {
            return Err(extraction_err(format!("an anchor of type {}", value_kind(anchor))));
        };
        match anchor.get(FEATURES).map(untagged) {
            Some(Value::Sequence(items)) => Ok(Self::List(items.as_slice())),
            Some(Value::Mapping(map)) => Ok(Self::Map(map)),
            Some(other) => Err(extraction_err(value_kind(other).to_string())),
            None => Err(extraction_err("no features field".to_string())),
        }
    }

    /// The declared feature names.
    pub fn names(&self, anchor_name: &str) -> Result<BTreeSet<String>, ConfigValidationError> {
        let extraction_err = |found: String| ConfigValidationError::FeatureExtraction {
            anchor: anchor_name.to_string(),
            found,
        };
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| match untagged(item) {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(extraction_err(format!(
                        "a list containing a {} element",
                        value_kind(other)
                    ))),
                })
                .collect(),
            Self::Map(map) => map
                .keys()
                .map(|k| {
                    key_name(k).ok_or_else(|| {
                        extraction_err("a mapping with a non-scalar key".to_string())
                    })
                })
                .collect(),
        }
    }
}

/// Names declared by a FeatureDef tree, grouped by which grammar applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureDefNames {
    /// Keys of `sources` and `anchors`.
    pub source_anchor_names: BTreeSet<String>,
    /// Anchor-declared feature names and keys of `derivations`.
    pub feature_names: BTreeSet<String>,
}

/// Walk a FeatureDef tree and collect every declared name.
pub fn collect_feature_def_names(
    tree: &ParsedConfig,
) -> Result<FeatureDefNames, ConfigValidationError> {
    let mut names = FeatureDefNames::default();

    if let Some(sources) = section_mapping(tree, SOURCES)? {
        names.source_anchor_names.extend(section_keys(sources)?);
    }

    if let Some(anchors) = section_mapping(tree, ANCHORS)? {
        for (key, anchor) in anchors {
            let anchor_name =
                key_name(key).ok_or_else(|| RenderError::UnsupportedKey(format!("{key:?}")))?;
            let features = AnchorFeatureNames::of_anchor(&anchor_name, anchor)?;
            names.feature_names.extend(features.names(&anchor_name)?);
            names.source_anchor_names.insert(anchor_name);
        }
    }

    if let Some(derivations) = section_mapping(tree, DERIVATIONS)? {
        names.feature_names.extend(section_keys(derivations)?);
    }

    Ok(names)
}

fn section_mapping<'a>(
    tree: &'a ParsedConfig,
    section: &str,
) -> Result<Option<&'a Mapping>, ConfigValidationError> {
    match tree.section(section) {
        None => Ok(None),
        Some(Value::Mapping(map)) => Ok(Some(map)),
        Some(other) => Err(ConfigValidationError::MalformedSection {
            section: section.to_string(),
            found: value_kind(other),
        }),
    }
}

fn section_keys(map: &Mapping) -> Result<Vec<String>, RenderError> {
    map.keys()
        .map(|k| key_name(k).ok_or_else(|| RenderError::UnsupportedKey(format!("{k:?}"))))
        .collect()
}

/// Names that violate their grammar. Both sets are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingViolations {
    pub invalid_feature_names: BTreeSet<String>,
    pub invalid_source_anchor_names: BTreeSet<String>,
}

impl NamingViolations {
    /// Keep only the names that do not conform.
    pub fn find(names: FeatureDefNames) -> Self {
        let FeatureDefNames {
            mut source_anchor_names,
            mut feature_names,
        } = names;
        source_anchor_names.retain(|name| !is_valid_source_anchor_name(name));
        feature_names.retain(|name| !is_strict_typed_ref(name));
        Self {
            invalid_feature_names: feature_names,
            invalid_source_anchor_names: source_anchor_names,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.invalid_feature_names.is_empty() && self.invalid_source_anchor_names.is_empty()
    }

    /// Human-readable report: the feature-name block first, then the
    /// source/anchor block, each present only if it has names.
    pub fn message(&self) -> String {
        let mut blocks = Vec::new();
        if !self.invalid_feature_names.is_empty() {
            blocks.push(format!(
                "The feature references/names in feature configs must conform to the pattern \
                 (shown in BNF syntax): {TYPED_REF_BNF}, where 'namespace' and 'name' must \
                 conform to the pattern (shown as regex) [a-zA-Z][a-zA-Z0-9_]+\n\
                 The following names violate the feature naming convention:\n{}\n",
                join_lines(&self.invalid_feature_names)
            ));
        }
        if !self.invalid_source_anchor_names.is_empty() {
            blocks.push(format!(
                "The source and anchor names in feature configs follow the pattern \
                 (shown as regex) {SOURCE_ANCHOR_NAME_REGEX}\n\
                 The following names violate the source and anchor naming convention:\n{}\n",
                join_lines(&self.invalid_source_anchor_names)
            ));
        }
        blocks.concat()
    }
}

fn join_lines(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
}

/// Check the naming conventions of a FeatureDef tree.
///
/// Returns `Valid` when every name conforms; otherwise a result whose status
/// is chosen by `policy` and whose message lists every violating name.
pub fn check_feature_def_names(
    tree: &ParsedConfig,
    policy: NamingPolicy,
) -> Result<ValidationResult, ConfigValidationError> {
    let violations = NamingViolations::find(collect_feature_def_names(tree)?);
    if violations.is_empty() {
        return Ok(ValidationResult::valid(ValidationPhase::Syntactic));
    }
    tracing::warn!(
        invalid_features = violations.invalid_feature_names.len(),
        invalid_sources_and_anchors = violations.invalid_source_anchor_names.len(),
        ?policy,
        "FeatureDef config violates naming conventions"
    );
    Ok(ValidationResult::with_status(
        ValidationPhase::Syntactic,
        policy.violation_status(),
        violations.message(),
    ))
}
