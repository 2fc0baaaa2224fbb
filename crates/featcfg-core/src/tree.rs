//! # Parsed Config Trees
//!
//! [`ParsedConfig`] is the hierarchical key/value structure a config builder
//! produces from raw text. The validator reads it and never mutates it.
//!
//! ## Rendering
//!
//! Schema checking runs on a JSON document. [`ParsedConfig::render_json`]
//! produces a faithful, total JSON rendering of the tree: YAML tags are
//! dropped (the tagged value is kept), scalar keys are stringified, and a
//! tree that JSON cannot represent is an error rather than a lossy render.
//! That includes two keys of one mapping that stringify alike (`1` and
//! `"1"`), which would otherwise collapse into one entry.
//! Comments and source positions never reach the tree in the first place.

use serde_yaml::{Mapping, Value};

use crate::error::RenderError;

/// A parsed configuration document with a mapping at its root.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    root: Mapping,
}

impl ParsedConfig {
    /// Wrap an already-parsed root mapping.
    pub fn new(root: Mapping) -> Self {
        Self { root }
    }

    /// An empty document.
    pub fn empty() -> Self {
        Self { root: Mapping::new() }
    }

    /// The root mapping.
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Look up a top-level section by key.
    ///
    /// A key bound to `null` counts as absent, matching how config authors
    /// write an empty section (`sources:` with nothing under it).
    pub fn section(&self, key: &str) -> Option<&Value> {
        match self.root.get(key).map(untagged) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// Convert the tree to its JSON document form.
    pub fn to_json_value(&self) -> Result<serde_json::Value, RenderError> {
        mapping_to_json(&self.root)
    }

    /// Render the tree as pretty-printed JSON text.
    pub fn render_json(&self) -> Result<String, RenderError> {
        let value = self.to_json_value()?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

impl Default for ParsedConfig {
    fn default() -> Self {
        Self::empty()
    }
}

/// Strip any YAML tags wrapping a value.
pub fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

/// The string form of a scalar mapping key, or `None` for a non-scalar key.
pub fn key_name(key: &Value) -> Option<String> {
    match untagged(key) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A short description of a value's type, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match untagged(value) {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

fn mapping_to_json(map: &Mapping) -> Result<serde_json::Value, RenderError> {
    let mut json_map = serde_json::Map::new();
    for (k, v) in map {
        let key = key_name(k).ok_or_else(|| RenderError::UnsupportedKey(format!("{k:?}")))?;
        if json_map.contains_key(&key) {
            return Err(RenderError::DuplicateKey(key));
        }
        json_map.insert(key, yaml_to_json(v)?);
    }
    Ok(serde_json::Value::Object(json_map))
}

fn yaml_to_json(yaml: &Value) -> Result<serde_json::Value, RenderError> {
    match yaml {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(serde_json::Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(serde_json::Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .ok_or(RenderError::NonFiniteFloat(f))
            } else {
                Err(RenderError::UnsupportedNumber(n.to_string()))
            }
        }
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Sequence(seq) => {
            let items: Result<Vec<_>, _> = seq.iter().map(yaml_to_json).collect();
            Ok(serde_json::Value::Array(items?))
        }
        Value::Mapping(map) => mapping_to_json(map),
        Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
