//! # Typed Config Object Graph
//!
//! Fully built representations of FeatureDef and Join documents, used by
//! semantic validation. The graph is deserialized from the JSON form of a
//! [`ParsedConfig`](crate::ParsedConfig); properties the validator has no
//! rules for are kept as raw JSON so nothing is lost in the round trip.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A FeatureDef document: sources, anchors and derivations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefConfig {
    #[serde(default)]
    pub sources: BTreeMap<String, Value>,
    #[serde(default)]
    pub anchors: BTreeMap<String, AnchorConfig>,
    #[serde(default)]
    pub derivations: BTreeMap<String, DerivationConfig>,
}

impl FeatureDefConfig {
    /// Every feature defined in this document, anchored or derived,
    /// with the names of the places that define it.
    ///
    /// Anchored features are attributed to `anchors.<anchor>`, derived
    /// features to `derivations`.
    pub fn feature_definitions(&self) -> BTreeMap<String, Vec<String>> {
        let mut defs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (anchor_name, anchor) in &self.anchors {
            for feature in anchor.features.names() {
                defs.entry(feature).or_default().push(format!("anchors.{anchor_name}"));
            }
        }
        for name in self.derivations.keys() {
            defs.entry(name.clone()).or_default().push("derivations".to_string());
        }
        defs
    }
}

/// A named binding of a data source to one or more extracted features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Source name or path.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
    pub features: AnchorFeatures,
    /// Remaining anchor properties.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// An anchor's `features` field, written either as a list of names or as a
/// mapping from name to feature definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnchorFeatures {
    List(Vec<String>),
    Map(BTreeMap<String, Value>),
}

impl AnchorFeatures {
    /// Feature names, independent of representation.
    pub fn names(&self) -> BTreeSet<String> {
        match self {
            Self::List(names) => names.iter().cloned().collect(),
            Self::Map(defs) => defs.keys().cloned().collect(),
        }
    }
}

/// A feature computed from other features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivationConfig {
    /// Shorthand: the derivation is a single expression string.
    Expression(String),
    /// Full form with optional declared inputs.
    Spec(DerivationSpec),
}

/// The full form of a derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<DerivationInputs>,
    /// Remaining derivation properties (`definition`, `class`, `type`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DerivationConfig {
    /// Names of the features this derivation declares as inputs.
    pub fn input_features(&self) -> Vec<&str> {
        let inputs = match self {
            Self::Expression(_) => return Vec::new(),
            Self::Spec(spec) => &spec.inputs,
        };
        match inputs {
            None => Vec::new(),
            Some(DerivationInputs::Map(map)) => map.values().map(|i| i.feature.as_str()).collect(),
            Some(DerivationInputs::List(list)) => list.iter().map(|i| i.feature.as_str()).collect(),
        }
    }
}

/// Declared derivation inputs: keyed by argument name, or positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivationInputs {
    Map(BTreeMap<String, DerivationInput>),
    List(Vec<DerivationInput>),
}

/// One input of a derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    pub feature: String,
}

/// A Join document: optional settings plus named feature bags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(flatten)]
    pub feature_bags: BTreeMap<String, Vec<KeyedFeatures>>,
}

/// Features joined on one key within a feature bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedFeatures {
    pub key: Value,
    #[serde(rename = "featureList")]
    pub feature_list: Value,
    #[serde(rename = "overrideTimeDelay", default, skip_serializing_if = "Option::is_none")]
    pub override_time_delay: Option<String>,
}
