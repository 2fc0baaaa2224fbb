//! # Error Types — Fatal Failures
//!
//! Errors in this module mean the validator could not do its job. They are
//! distinct from [`ValidationResult`](crate::ValidationResult), which reports
//! defects in the document under test.
//!
//! ## Design
//!
//! - [`BuildError`] comes from the config builder. Only its `Syntax` variant
//!   is ever turned into a result; everything else propagates.
//! - [`ConfigValidationError::Request`] wraps failures leaving a public entry
//!   point with the config type, phase and data source that were requested.

use thiserror::Error;

use crate::config_type::{ConfigType, ValidationPhase};

/// Fatal validator error.
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    /// The caller asked for a `(config type, phase)` pair with no implementation.
    #[error("unsupported validation request: {phase} validation of {config_type} config")]
    Unsupported {
        /// Requested config type.
        config_type: ConfigType,
        /// Requested phase.
        phase: ValidationPhase,
    },

    /// A documented but unimplemented validation path was invoked.
    #[error("{0} not yet implemented")]
    NotImplemented(&'static str),

    /// An identifier did not name a known enum variant.
    #[error("unknown {kind}: {name:?}")]
    UnknownName {
        /// What was being parsed.
        kind: &'static str,
        /// The unrecognized text.
        name: String,
    },

    /// A bundled schema document could not be read or parsed.
    #[error("error loading {config_type} schema '{resource}': {reason}")]
    SchemaLoad {
        config_type: ConfigType,
        resource: String,
        reason: String,
    },

    /// A bundled schema document parsed but could not be compiled.
    #[error("error compiling {config_type} schema '{resource}': {reason}")]
    SchemaCompile {
        config_type: ConfigType,
        resource: String,
        reason: String,
    },

    /// The parsed tree could not be rendered for schema checking.
    #[error("config rendering error: {0}")]
    Render(#[from] RenderError),

    /// A top-level section had a shape the schema should have rejected.
    #[error("malformed '{section}' section: expected a mapping, got {found}")]
    MalformedSection {
        section: String,
        found: &'static str,
    },

    /// An anchor's `features` field was neither a list nor a mapping.
    #[error("cannot extract features of anchor '{anchor}': expected list or mapping, got {found}")]
    FeatureExtraction {
        anchor: String,
        found: String,
    },

    /// The config builder failed for a reason other than document syntax,
    /// or failed on the semantic path where no failure becomes a result.
    #[error("config build error: {0}")]
    Build(#[from] BuildError),

    /// A fatal failure annotated with the request that triggered it.
    #[error("{phase} validation of {config_type} config from {data_info} failed: {source}")]
    Request {
        config_type: ConfigType,
        phase: ValidationPhase,
        /// Diagnostic label of the config data source.
        data_info: String,
        #[source]
        source: Box<ConfigValidationError>,
    },
}

impl ConfigValidationError {
    /// Wrap this error with request context. Already-wrapped errors are
    /// returned unchanged so context is never stacked twice.
    pub fn in_request(
        self,
        config_type: ConfigType,
        phase: ValidationPhase,
        data_info: impl Into<String>,
    ) -> Self {
        match self {
            wrapped @ Self::Request { .. } => wrapped,
            other => Self::Request {
                config_type,
                phase,
                data_info: data_info.into(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure, with any request context peeled off.
    pub fn root(&self) -> &ConfigValidationError {
        match self {
            Self::Request { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Error raised by a [`ConfigBuilder`](crate::ConfigBuilder).
#[derive(Error, Debug)]
pub enum BuildError {
    /// The document text could not be parsed.
    #[error("invalid config syntax in {data_info}: {source}")]
    Syntax {
        data_info: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The document text could not be read from its provider.
    #[error("cannot read config data from {data_info}: {source}")]
    Io {
        data_info: String,
        #[source]
        source: std::io::Error,
    },

    /// The parsed tree did not fit the typed object graph.
    #[error("cannot build config object from {data_info}: {reason}")]
    Model { data_info: String, reason: String },
}

impl BuildError {
    /// Returns true if this is a document syntax failure.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Error turning a parsed tree into its JSON document form.
///
/// Every variant except `Json` is caused by the document itself; see
/// [`RenderError::is_document_defect`].
#[derive(Error, Debug)]
pub enum RenderError {
    /// A mapping key was not a scalar.
    #[error("unsupported mapping key type: {0}")]
    UnsupportedKey(String),

    /// Two keys of one mapping render to the same JSON key, such as `1` and `"1"`.
    #[error("duplicate mapping key {0:?} after conversion to JSON")]
    DuplicateKey(String),

    /// A float with no JSON representation (NaN or infinite).
    #[error("cannot represent float {0} in JSON")]
    NonFiniteFloat(f64),

    /// A YAML number that fits none of the JSON number types.
    #[error("unsupported number: {0}")]
    UnsupportedNumber(String),

    /// JSON encoding failed.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Returns true if the tree holds content JSON cannot represent, as
    /// opposed to a failure of the encoder.
    pub fn is_document_defect(&self) -> bool {
        !matches!(self, Self::Json(_))
    }
}
