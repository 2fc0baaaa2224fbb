//! Integration test: validate config documents end to end through
//! [`ConfigValidator`] with the YAML builder and the FeatureDef rules.
//!
//! Fixture documents live in `tests/fixtures/` and are read through
//! `FileConfigDataProvider`; defective documents are inlined next to the test
//! that uses them.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use featcfg_builder::{FeatureDefRules, YamlConfigBuilder};
use featcfg_core::{
    BuildError, ConfigDataProvider, ConfigType, ConfigValidationError, FileConfigDataProvider,
    StringConfigDataProvider, ValidationPhase, ValidationStatus,
};
use featcfg_validator::{
    BundledSchemas, ConfigValidator, NamingPolicy, SchemaSource, SchemaViolationError,
    ValidatorOptions,
};

fn fixture(name: &str) -> FileConfigDataProvider {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    FileConfigDataProvider::new(path)
}

fn text(label: &str, yaml: &str) -> StringConfigDataProvider {
    StringConfigDataProvider::new(label, yaml)
}

fn validator() -> ConfigValidator {
    ConfigValidator::new(Arc::new(YamlConfigBuilder::new()), Arc::new(FeatureDefRules::new()))
}

/// Bundled schemas, counting how often each is opened.
#[derive(Default)]
struct CountingSchemas {
    opens: AtomicUsize,
}

impl SchemaSource for CountingSchemas {
    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + '_>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        BundledSchemas.open(resource)
    }
}

/// Provider whose reads always fail, recording that it was opened.
#[derive(Default)]
struct BrokenProvider {
    opened: AtomicBool,
}

impl ConfigDataProvider for BrokenProvider {
    fn config_data_info(&self) -> String {
        "broken: disk".to_string()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.opened.store(true, Ordering::SeqCst);
        Err(io::Error::other("device unavailable"))
    }
}

/// Provider that records whether it was ever opened.
struct WatchedProvider {
    inner: StringConfigDataProvider,
    opened: Arc<AtomicBool>,
}

impl ConfigDataProvider for WatchedProvider {
    fn config_data_info(&self) -> String {
        self.inner.config_data_info()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.opened.store(true, Ordering::SeqCst);
        self.inner.open()
    }
}

// ---------------------------------------------------------------------------
// Syntactic phase
// ---------------------------------------------------------------------------

#[test]
fn test_fixtures_are_syntactically_valid() {
    let v = validator();
    for (config_type, name) in [
        (ConfigType::FeatureDef, "feature_def.conf"),
        (ConfigType::Join, "join.conf"),
        (ConfigType::Presentation, "presentation.conf"),
    ] {
        let r = v
            .validate(config_type, ValidationPhase::Syntactic, &fixture(name))
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(r.is_valid(), "{name}: {r}");
        assert_eq!(r.phase(), ValidationPhase::Syntactic);
        assert!(r.message().is_none());
    }
}

#[test]
fn test_bad_anchor_name_warns() {
    let r = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text(
                "bad-anchor",
                "sources:\n  s1: {location: {path: /a}}\n\
                 anchors:\n  1bad:\n    source: s1\n    features: [member_age]\n",
            ),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Warn);
    let msg = r.message().unwrap();
    assert!(msg.contains("source and anchor naming convention:\n1bad\n"), "{msg}");
    assert!(!msg.contains("feature naming convention"));
}

#[test]
fn test_feature_block_reported_before_source_block() {
    let r = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text(
                "both-bad",
                "sources:\n  9src: {location: {path: /a}}\n\
                 anchors:\n  a1:\n    source: 9src\n    features: [x, ns-f2-1]\n",
            ),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Warn);
    let msg = r.message().unwrap();
    let features = msg.find("feature naming convention:\nns-f2-1\nx\n").expect(msg);
    let sources = msg.find("source and anchor naming convention:\n9src\n").expect(msg);
    assert!(features < sources);
}

#[test]
fn test_feature_list_and_map_report_the_same() {
    let v = validator();
    let as_list = "anchors:\n  a1:\n    source: s\n    features: [good_name, x, 2bad]\n";
    let as_map = "anchors:\n  a1:\n    source: s\n    features:\n      \
                  good_name: g\n      x: {def: x}\n      2bad: b\n";
    let list = v
        .validate(ConfigType::FeatureDef, ValidationPhase::Syntactic, &text("list", as_list))
        .unwrap();
    let map = v
        .validate(ConfigType::FeatureDef, ValidationPhase::Syntactic, &text("map", as_map))
        .unwrap();
    assert_eq!(list.status(), ValidationStatus::Warn);
    assert_eq!(list.status(), map.status());
    assert_eq!(list.message(), map.message());
}

#[test]
fn test_strict_naming_policy_invalidates() {
    let v = validator().with_options(ValidatorOptions {
        naming_policy: NamingPolicy::Strict,
    });
    let r = v
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text("strict", "anchors:\n  a1:\n    source: s\n    features: [x]\n"),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Invalid);
    assert!(r.message().unwrap().contains("convention:\nx\n"));
}

#[test]
fn test_malformed_text_is_invalid_result() {
    let r = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text("malformed", "anchors: {a1: [unterminated\n"),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Invalid);
    assert!(r
        .message()
        .unwrap()
        .starts_with("Config parsing failed due to invalid syntax:"));
    let cause = r.cause().expect("parse error attached");
    assert!(cause.downcast_ref::<BuildError>().is_some_and(BuildError::is_syntax));
}

#[test]
fn test_schema_violation_is_invalid_result() {
    let r = validator()
        .validate(
            ConfigType::Join,
            ValidationPhase::Syntactic,
            &text("join", "memberFeatures:\n  - key: viewerId\n    features: [a]\n"),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Invalid);
    let err = r.cause().and_then(|c| c.downcast_ref::<SchemaViolationError>()).unwrap();
    assert_eq!(err.config_type, ConfigType::Join);
    assert!(!err.violations.is_empty());
}

#[test]
fn test_keys_colliding_in_json_are_invalid_result() {
    let r = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text(
                "collide",
                "anchors: {\"1\": {source: s, features: 5}, \
                 1: {source: s, features: [good_name]}}\n",
            ),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Invalid);
    assert!(r.message().unwrap().contains("duplicate mapping key"), "{r}");
}

#[test]
fn test_non_finite_default_is_invalid_result() {
    let r = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text(
                "inf",
                "anchors:\n  a1:\n    source: s\n    features:\n      \
                 member_age: {def: age, default: .inf}\n",
            ),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Invalid);
    assert!(r.cause().is_some());
}

#[test]
fn test_unreadable_provider_is_fatal() {
    let provider = BrokenProvider::default();
    let err = validator()
        .validate(ConfigType::Join, ValidationPhase::Syntactic, &provider)
        .unwrap_err();
    assert!(provider.opened.load(Ordering::SeqCst));
    match &err {
        ConfigValidationError::Request {
            config_type,
            phase,
            data_info,
            ..
        } => {
            assert_eq!(*config_type, ConfigType::Join);
            assert_eq!(*phase, ValidationPhase::Syntactic);
            assert_eq!(data_info, "broken: disk");
        }
        other => panic!("expected request context, got {other:?}"),
    }
    assert!(matches!(
        err.root(),
        ConfigValidationError::Build(BuildError::Io { .. })
    ));
}

#[test]
fn test_missing_file_is_fatal() {
    let err = validator()
        .validate(ConfigType::FeatureDef, ValidationPhase::Syntactic, &fixture("no_such_file.conf"))
        .unwrap_err();
    assert!(err.to_string().contains("no_such_file.conf"), "{err}");
}

// ---------------------------------------------------------------------------
// Semantic phase
// ---------------------------------------------------------------------------

#[test]
fn test_feature_def_semantics_valid() {
    let r = validator()
        .validate(ConfigType::FeatureDef, ValidationPhase::Semantic, &fixture("feature_def.conf"))
        .unwrap();
    assert!(r.is_valid(), "{r}");
    assert_eq!(r.phase(), ValidationPhase::Semantic);
}

#[test]
fn test_feature_def_semantics_duplicate_invalid() {
    let r = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Semantic,
            &text(
                "dup",
                "anchors:\n  a1:\n    source: s\n    features: [member_age]\n\
                 derivations:\n  member_age: age * 1\n",
            ),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Invalid);
    assert!(r
        .message()
        .unwrap()
        .contains("member_age (defined in anchors.a1, derivations)"));
}

#[test]
fn test_feature_def_semantic_build_failure_is_fatal() {
    let err = validator()
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Semantic,
            &text("bad", "anchors: [not, a, mapping\n"),
        )
        .unwrap_err();
    assert!(matches!(err.root(), ConfigValidationError::Build(e) if e.is_syntax()));
}

#[test]
fn test_join_semantics_not_implemented() {
    let err = validator()
        .validate(ConfigType::Join, ValidationPhase::Semantic, &fixture("join.conf"))
        .unwrap_err();
    assert!(matches!(err.root(), ConfigValidationError::NotImplemented(_)));
    assert!(err.to_string().contains("not yet implemented"), "{err}");
}

#[test]
fn test_presentation_semantics_unsupported() {
    let err = validator()
        .validate(
            ConfigType::Presentation,
            ValidationPhase::Semantic,
            &fixture("presentation.conf"),
        )
        .unwrap_err();
    assert!(matches!(
        err.root(),
        ConfigValidationError::Unsupported {
            config_type: ConfigType::Presentation,
            phase: ValidationPhase::Semantic,
        }
    ));
}

// ---------------------------------------------------------------------------
// Schema cache
// ---------------------------------------------------------------------------

#[test]
fn test_schema_loaded_once_per_type() {
    let source = Arc::new(CountingSchemas::default());
    let v = validator().with_schema_source(source.clone());

    for _ in 0..3 {
        v.validate(ConfigType::FeatureDef, ValidationPhase::Syntactic, &fixture("feature_def.conf"))
            .unwrap();
    }
    assert_eq!(source.opens.load(Ordering::SeqCst), 1);
    assert!(!v.schemas().is_loaded(ConfigType::Join));

    v.validate(ConfigType::Join, ValidationPhase::Syntactic, &fixture("join.conf"))
        .unwrap();
    assert_eq!(source.opens.load(Ordering::SeqCst), 2);
}

#[test]
fn test_malformed_text_does_not_load_schema() {
    let source = Arc::new(CountingSchemas::default());
    let v = validator().with_schema_source(source.clone());
    v.validate(ConfigType::Join, ValidationPhase::Syntactic, &text("malformed", "{a: ["))
        .unwrap();
    assert_eq!(source.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_validation_shares_schema() {
    let source = Arc::new(CountingSchemas::default());
    let v = validator().with_schema_source(source.clone());
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let r = v
                    .validate(
                        ConfigType::Presentation,
                        ValidationPhase::Syntactic,
                        &fixture("presentation.conf"),
                    )
                    .unwrap();
                assert!(r.is_valid());
            });
        }
    });
    assert_eq!(source.opens.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Batch validation
// ---------------------------------------------------------------------------

#[test]
fn test_validate_all_syntactic() {
    let mut providers: BTreeMap<ConfigType, Box<dyn ConfigDataProvider>> = BTreeMap::new();
    providers.insert(ConfigType::FeatureDef, Box::new(fixture("feature_def.conf")));
    providers.insert(ConfigType::Join, Box::new(text("join", "memberFeatures: 3\n")));
    providers.insert(ConfigType::Presentation, Box::new(fixture("presentation.conf")));

    let results = validator()
        .validate_all(&providers, ValidationPhase::Syntactic)
        .unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[&ConfigType::FeatureDef].is_valid());
    assert_eq!(results[&ConfigType::Join].status(), ValidationStatus::Invalid);
    assert!(results[&ConfigType::Presentation].is_valid());
}

#[test]
fn test_validate_all_stops_at_first_fatal_error() {
    let later_opened = Arc::new(AtomicBool::new(false));
    let mut providers: BTreeMap<ConfigType, Box<dyn ConfigDataProvider>> = BTreeMap::new();
    providers.insert(ConfigType::FeatureDef, Box::new(BrokenProvider::default()));
    providers.insert(
        ConfigType::Presentation,
        Box::new(WatchedProvider {
            inner: text("presentation", "presentations: {}\n"),
            opened: later_opened.clone(),
        }),
    );

    let err = validator()
        .validate_all(&providers, ValidationPhase::Syntactic)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigValidationError::Request {
            config_type: ConfigType::FeatureDef,
            ..
        }
    ));
    assert!(!later_opened.load(Ordering::SeqCst));
}

#[test]
fn test_validate_all_semantic_join_is_fatal() {
    let mut providers: BTreeMap<ConfigType, Box<dyn ConfigDataProvider>> = BTreeMap::new();
    providers.insert(ConfigType::FeatureDef, Box::new(fixture("feature_def.conf")));
    providers.insert(ConfigType::Join, Box::new(fixture("join.conf")));

    let err = validator()
        .validate_all(&providers, ValidationPhase::Semantic)
        .unwrap_err();
    assert!(matches!(err.root(), ConfigValidationError::NotImplemented(_)));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_injected_dispatch_receives_events() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let v = validator().with_dispatch(tracing::Dispatch::new(subscriber));
    let r = v
        .validate(
            ConfigType::FeatureDef,
            ValidationPhase::Syntactic,
            &text("logged", "anchors:\n  a1:\n    source: s\n    features: [x]\n"),
        )
        .unwrap();
    assert_eq!(r.status(), ValidationStatus::Warn);

    let out = logs.contents();
    assert!(out.contains("performed config validation"), "{out}");
    assert!(out.contains("string: logged"), "{out}");
    assert!(out.contains("violates naming conventions"), "{out}");
    assert!(out.contains("config schema loaded"), "{out}");
}
