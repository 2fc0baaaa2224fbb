//! # YAML Config Builder
//!
//! Parses config text with `serde_yaml`. YAML is a superset of JSON, so JSON
//! documents build through the same path.
//!
//! ## Failure classification
//!
//! - Unparseable text, text that is not UTF-8, a document whose root is
//!   not a mapping, and a tree JSON cannot represent are
//!   [`BuildError::Syntax`]: the document is at fault.
//! - A provider that cannot be read is [`BuildError::Io`].
//! - A well-formed tree that does not fit the typed object graph is
//!   [`BuildError::Model`].

use std::io::{ErrorKind, Read};

use featcfg_core::{
    BuildError, ConfigBuilder, ConfigDataProvider, ConfigType, FeatureDefConfig, JoinConfig,
    ParsedConfig,
};
use serde::de::DeserializeOwned;
use serde_yaml::Value;

/// Builds config trees and object graphs from YAML or JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlConfigBuilder;

impl YamlConfigBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Parse config text into a tree.
    ///
    /// An empty document is an empty mapping.
    pub fn parse_text(&self, text: &str, data_info: &str) -> Result<ParsedConfig, BuildError> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| BuildError::Syntax {
            data_info: data_info.to_string(),
            source: Box::new(e),
        })?;
        match value {
            Value::Null => Ok(ParsedConfig::empty()),
            Value::Mapping(root) => Ok(ParsedConfig::new(root)),
            Value::Tagged(tagged) => match tagged.value {
                Value::Mapping(root) => Ok(ParsedConfig::new(root)),
                other => Err(non_mapping_root(&other, data_info)),
            },
            other => Err(non_mapping_root(&other, data_info)),
        }
    }

    /// Parse the provider's text and build the Join object graph.
    pub fn build_join(&self, provider: &dyn ConfigDataProvider) -> Result<JoinConfig, BuildError> {
        let data_info = provider.config_data_info();
        let tree = self.parse_text(&read_text(provider)?, &data_info)?;
        build_model(&tree, &data_info)
    }
}

impl ConfigBuilder for YamlConfigBuilder {
    fn build_tree(
        &self,
        config_type: ConfigType,
        provider: &dyn ConfigDataProvider,
    ) -> Result<ParsedConfig, BuildError> {
        let data_info = provider.config_data_info();
        let tree = self.parse_text(&read_text(provider)?, &data_info)?;
        tracing::debug!(%config_type, %data_info, keys = tree.root().len(), "built config tree");
        Ok(tree)
    }

    fn build_feature_def(
        &self,
        provider: &dyn ConfigDataProvider,
    ) -> Result<FeatureDefConfig, BuildError> {
        let data_info = provider.config_data_info();
        let tree = self.parse_text(&read_text(provider)?, &data_info)?;
        build_model(&tree, &data_info)
    }
}

fn read_text(provider: &dyn ConfigDataProvider) -> Result<String, BuildError> {
    let io_err = |source: std::io::Error| BuildError::Io {
        data_info: provider.config_data_info(),
        source,
    };
    let mut reader = provider.open().map_err(io_err)?;
    let mut text = String::new();
    match reader.read_to_string(&mut text) {
        Ok(_) => Ok(text),
        Err(e) if e.kind() == ErrorKind::InvalidData => Err(BuildError::Syntax {
            data_info: provider.config_data_info(),
            source: Box::new(e),
        }),
        Err(e) => Err(io_err(e)),
    }
}

fn build_model<T: DeserializeOwned>(tree: &ParsedConfig, data_info: &str) -> Result<T, BuildError> {
    let model_err = |reason: String| BuildError::Model {
        data_info: data_info.to_string(),
        reason,
    };
    let json = tree.to_json_value().map_err(|e| {
        if e.is_document_defect() {
            BuildError::Syntax {
                data_info: data_info.to_string(),
                source: Box::new(e),
            }
        } else {
            model_err(e.to_string())
        }
    })?;
    serde_json::from_value(json).map_err(|e| model_err(e.to_string()))
}

fn non_mapping_root(value: &Value, data_info: &str) -> BuildError {
    BuildError::Syntax {
        data_info: data_info.to_string(),
        source: format!(
            "config root must be a mapping, got {}",
            featcfg_core::tree::value_kind(value)
        )
        .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featcfg_core::{AnchorFeatures, StringConfigDataProvider};

    fn provider(text: &str) -> StringConfigDataProvider {
        StringConfigDataProvider::new("test", text)
    }

    #[test]
    fn test_build_tree_from_yaml() {
        let tree = YamlConfigBuilder::new()
            .build_tree(
                ConfigType::FeatureDef,
                &provider("anchors:\n  a1:\n    source: s1\n    features: [f1]\n"),
            )
            .unwrap();
        assert!(tree.section("anchors").is_some());
    }

    #[test]
    fn test_build_tree_from_json() {
        let json = r#"{"bag": [{"key": "k", "featureList": ["f1"]}]}"#;
        let tree = YamlConfigBuilder::new()
            .build_tree(ConfigType::Join, &provider(json))
            .unwrap();
        assert!(tree.section("bag").is_some());
    }

    #[test]
    fn test_empty_document_is_empty_tree() {
        let tree = YamlConfigBuilder::new()
            .build_tree(ConfigType::FeatureDef, &provider(""))
            .unwrap();
        assert!(tree.root().is_empty());
    }

    #[test]
    fn test_unterminated_structure_is_syntax_error() {
        let err = YamlConfigBuilder::new()
            .build_tree(ConfigType::FeatureDef, &provider("anchors: {a1: {source: s1\n"))
            .unwrap_err();
        assert!(err.is_syntax(), "expected syntax error, got: {err}");
        assert!(err.to_string().contains("string: test"));
    }

    #[test]
    fn test_scalar_root_is_syntax_error() {
        let err = YamlConfigBuilder::new()
            .build_tree(ConfigType::Presentation, &provider("- just\n- a list\n"))
            .unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("list"));
    }

    #[test]
    fn test_build_feature_def_graph() {
        let cfg = YamlConfigBuilder::new()
            .build_feature_def(&provider(
                r#"
sources:
  members:
    location: {path: /data/members}
anchors:
  memberAnchor:
    source: members
    key: memberId
    features:
      member_age: {def: age}
      member_tenure: {def: tenure}
derivations:
  age_squared: member_age * member_age
"#,
            ))
            .unwrap();
        assert!(matches!(cfg.anchors["memberAnchor"].features, AnchorFeatures::Map(_)));
        assert_eq!(cfg.derivations.len(), 1);
        assert!(cfg.sources.contains_key("members"));
    }

    #[test]
    fn test_build_feature_def_model_error() {
        // An anchor without `source` parses but does not fit the graph.
        let err = YamlConfigBuilder::new()
            .build_feature_def(&provider("anchors:\n  a1:\n    features: [f1]\n"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Model { .. }), "got: {err}");
    }

    #[test]
    fn test_unrepresentable_feature_def_is_syntax_error() {
        let builder = YamlConfigBuilder::new();
        for text in [
            "anchors:\n  a1:\n    source: s\n    features: {f1: {default: .nan}}\n",
            "anchors:\n  \"1\": {source: s, features: [f1]}\n  1: {source: s, features: [f2]}\n",
        ] {
            let err = builder.build_feature_def(&provider(text)).unwrap_err();
            assert!(err.is_syntax(), "{text}: {err}");
        }
    }

    #[test]
    fn test_build_join_graph() {
        let cfg = YamlConfigBuilder::new()
            .build_join(&provider(
                "settings:\n  joinTimeSettings: {timestampColumn: ts}\n\
                 bag1:\n  - key: viewerId\n    featureList: [member_age]\n",
            ))
            .unwrap();
        assert_eq!(cfg.feature_bags["bag1"].len(), 1);
    }

    #[test]
    fn test_unreadable_provider_is_io_error() {
        let p = featcfg_core::FileConfigDataProvider::new("/nonexistent/featcfg/join.yaml");
        let err = YamlConfigBuilder::new().build_tree(ConfigType::Join, &p).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
