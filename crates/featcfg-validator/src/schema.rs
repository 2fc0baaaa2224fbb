//! # Schema Cache
//!
//! One compiled JSON Schema (Draft 7) per [`ConfigType`], loaded from a
//! bundled schema document on first demand and reused for the lifetime of
//! the cache.
//!
//! ## Schema Resolution
//!
//! Schemas are addressed by logical resource name, never by a user path:
//!
//! | Config type | Resource |
//! |-------------|----------|
//! | `FeatureDef` | `FeatureDefConfigSchema.json` |
//! | `Join` | `JoinConfigSchema.json` |
//! | `Presentation` | `PresentationsConfigSchema.json` |
//!
//! Internal `$ref`s (`#/definitions/<name>`) are resolved by the jsonschema
//! crate natively. Bundled schemas must be self-contained: any reference to
//! an external document fails compilation instead of reaching the network.
//!
//! ## Thread Safety
//!
//! The slot map sits behind a mutex that is held across the load, so
//! "get or load" is atomic: concurrent first requests for one type load the
//! schema once. A failed load stores nothing and the next request retries.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::sync::{Arc, Mutex, PoisonError};

use featcfg_core::{ConfigType, ConfigValidationError};
use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;

const FEATURE_DEF_SCHEMA: &str = include_str!("../schemas/FeatureDefConfigSchema.json");
const JOIN_SCHEMA: &str = include_str!("../schemas/JoinConfigSchema.json");
const PRESENTATION_SCHEMA: &str = include_str!("../schemas/PresentationsConfigSchema.json");

/// The logical resource name of the bundled schema for a config type.
pub fn schema_resource(config_type: ConfigType) -> &'static str {
    match config_type {
        ConfigType::FeatureDef => "FeatureDefConfigSchema.json",
        ConfigType::Join => "JoinConfigSchema.json",
        ConfigType::Presentation => "PresentationsConfigSchema.json",
    }
}

/// Loader for schema documents by logical resource name.
pub trait SchemaSource: Send + Sync {
    /// Open a reader over the named schema document.
    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// The schema documents compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSchemas;

impl SchemaSource for BundledSchemas {
    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + '_>> {
        let text = match resource {
            "FeatureDefConfigSchema.json" => FEATURE_DEF_SCHEMA,
            "JoinConfigSchema.json" => JOIN_SCHEMA,
            "PresentationsConfigSchema.json" => PRESENTATION_SCHEMA,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no bundled schema named '{other}'"),
                ))
            }
        };
        Ok(Box::new(text.as_bytes()))
    }
}

/// Retriever that refuses every external `$ref`.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!(
            "bundled schemas must be self-contained; refusing to retrieve {}",
            uri.as_str()
        )
        .into())
    }
}

/// Lazily loaded, per-type compiled schemas.
pub struct SchemaCache {
    source: Arc<dyn SchemaSource>,
    slots: Mutex<HashMap<ConfigType, Arc<Validator>>>,
}

impl SchemaCache {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// A cache over the bundled schema documents.
    pub fn bundled() -> Self {
        Self::new(Arc::new(BundledSchemas))
    }

    /// Return the compiled schema for `config_type`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError::SchemaLoad` if the document cannot be
    /// read or is not JSON, and `ConfigValidationError::SchemaCompile` if it
    /// is not a usable schema. Neither outcome is cached.
    pub fn get(&self, config_type: ConfigType) -> Result<Arc<Validator>, ConfigValidationError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = slots.get(&config_type) {
            return Ok(Arc::clone(schema));
        }
        let schema = Arc::new(self.load(config_type)?);
        slots.insert(config_type, Arc::clone(&schema));
        tracing::info!(
            %config_type,
            resource = schema_resource(config_type),
            "config schema loaded"
        );
        Ok(schema)
    }

    /// Returns true if the schema for `config_type` has been loaded.
    pub fn is_loaded(&self, config_type: ConfigType) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&config_type)
    }

    fn load(&self, config_type: ConfigType) -> Result<Validator, ConfigValidationError> {
        let resource = schema_resource(config_type);
        let load_err = |reason: String| ConfigValidationError::SchemaLoad {
            config_type,
            resource: resource.to_string(),
            reason,
        };

        // The reader is dropped at the end of this block on every path.
        let raw: Value = {
            let reader = self
                .source
                .open(resource)
                .map_err(|e| load_err(format!("cannot open schema: {e}")))?;
            serde_json::from_reader(reader).map_err(|e| load_err(format!("invalid JSON: {e}")))?
        };

        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft7);
        opts.with_retriever(OfflineRetriever);
        opts.build(&raw).map_err(|e| ConfigValidationError::SchemaCompile {
            config_type,
            resource: resource.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: Vec<ConfigType> = ConfigType::all()
            .iter()
            .copied()
            .filter(|ct| self.is_loaded(*ct))
            .collect();
        f.debug_struct("SchemaCache").field("loaded", &loaded).finish()
    }
}
