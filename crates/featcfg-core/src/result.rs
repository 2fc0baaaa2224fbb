//! # Validation Results
//!
//! Document-level outcomes. A `ValidationResult` is produced fresh by every
//! validation call, is never mutated afterwards, and is owned by the caller.
//!
//! ## Invariant
//!
//! `message` is present whenever `status` is not [`ValidationStatus::Valid`].
//! The constructors are the only way to build a result, so the invariant
//! holds by construction.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config_type::ValidationPhase;

/// Underlying error attached to a non-valid result.
pub type ValidationCause = Arc<dyn Error + Send + Sync + 'static>;

/// Outcome of a single validation, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// The document conforms.
    Valid,
    /// Proceed, but the document should be fixed.
    Warn,
    /// Reject the document.
    Invalid,
}

impl ValidationStatus {
    /// Returns the snake_case identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Warn => "warn",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable result of validating one config document in one phase.
#[derive(Clone)]
pub struct ValidationResult {
    phase: ValidationPhase,
    status: ValidationStatus,
    message: Option<String>,
    cause: Option<ValidationCause>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid(phase: ValidationPhase) -> Self {
        Self {
            phase,
            status: ValidationStatus::Valid,
            message: None,
            cause: None,
        }
    }

    /// An advisory result. The message explains what should be fixed.
    pub fn warn(phase: ValidationPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            status: ValidationStatus::Warn,
            message: Some(message.into()),
            cause: None,
        }
    }

    /// A rejecting result with no underlying error.
    pub fn invalid(phase: ValidationPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            status: ValidationStatus::Invalid,
            message: Some(message.into()),
            cause: None,
        }
    }

    /// A rejecting result that carries the error which caused it.
    pub fn invalid_with_cause<E>(
        phase: ValidationPhase,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            phase,
            status: ValidationStatus::Invalid,
            message: Some(message.into()),
            cause: Some(Arc::new(cause)),
        }
    }

    /// Build a non-valid result with the given status.
    ///
    /// Used where the severity is decided by policy rather than fixed at the
    /// call site. A `Valid` status discards the message.
    pub fn with_status(
        phase: ValidationPhase,
        status: ValidationStatus,
        message: impl Into<String>,
    ) -> Self {
        match status {
            ValidationStatus::Valid => Self::valid(phase),
            ValidationStatus::Warn => Self::warn(phase, message),
            ValidationStatus::Invalid => Self::invalid(phase, message),
        }
    }

    pub fn phase(&self) -> ValidationPhase {
        self.phase
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns true if the status is `Valid`.
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationResult")
            .field("phase", &self.phase)
            .field("status", &self.status)
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation: {}", self.phase, self.status)?;
        if let Some(message) = &self.message {
            write!(f, "\n{message}")?;
        }
        Ok(())
    }
}
