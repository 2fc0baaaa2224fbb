//! # Typed Feature References
//!
//! The structured identifier used to reference a feature anywhere in the
//! platform:
//!
//! ```text
//! featureRef ::= [namespace-]name[-majorVersion-minorVersion]
//! ```
//!
//! `namespace` and `name` are an ASCII letter followed by one or more ASCII
//! letters, digits or underscores. Versions are decimal digit strings and
//! appear together or not at all.
//!
//! This grammar is stricter than the one used for source and anchor names:
//! hyphens are delimiters here, so they cannot appear inside a name.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Delimiter between the parts of a typed reference.
pub const DELIM: &str = "-";

/// Pattern for the namespace part.
pub const NAMESPACE_REGEX: &str = "[a-zA-Z][a-zA-Z0-9_]+";

/// Pattern for the name part.
pub const NAME_REGEX: &str = "[a-zA-Z][a-zA-Z0-9_]+";

/// Pattern for a version number.
pub const VERSION_REGEX: &str = "[0-9]+";

/// Human-readable grammar, quoted in naming-convention messages.
pub const TYPED_REF_BNF: &str = "featureRef ::= [namespace-]name[-majorVersion-minorVersion]";

static STRICT_TYPED_REF: LazyLock<Regex> = LazyLock::new(|| {
    let namespace = format!("(?:({NAMESPACE_REGEX}){DELIM})?");
    let version = format!("(?:{DELIM}({VERSION_REGEX}){DELIM}({VERSION_REGEX}))?");
    Regex::new(&format!("^{namespace}({NAME_REGEX}){version}$"))
    .expect("typed ref grammar is a valid regex")
});

/// Returns true if `s` conforms to the strict typed-reference grammar.
pub fn is_strict_typed_ref(s: &str) -> bool {
    STRICT_TYPED_REF.is_match(s)
}

/// A parsed typed feature reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedRef {
    pub namespace: Option<String>,
    pub name: String,
    /// `(major, minor)` version, when present.
    pub version: Option<(u64, u64)>,
}

impl TypedRef {
    /// Parse a reference, returning `None` if it does not conform to the
    /// strict grammar.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = STRICT_TYPED_REF.captures(s)?;
        let version = match (caps.get(3), caps.get(4)) {
            (Some(major), Some(minor)) => {
                Some((major.as_str().parse().ok()?, minor.as_str().parse().ok()?))
            }
            _ => None,
        };
        Some(Self {
            namespace: caps.get(1).map(|m| m.as_str().to_string()),
            name: caps.get(2)?.as_str().to_string(),
            version,
        })
    }
}

impl fmt::Display for TypedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}{DELIM}")?;
        }
        f.write_str(&self.name)?;
        if let Some((major, minor)) = self.version {
            write!(f, "{DELIM}{major}{DELIM}{minor}")?;
        }
        Ok(())
    }
}
