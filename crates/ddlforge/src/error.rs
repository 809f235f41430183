//! Error types for schema construction, compilation and analysis.

use crate::dialect::Dialect;

/// Errors that can occur while building schema values, compiling DDL or
/// analyzing database metadata.
#[derive(Debug, thiserror::Error)]
pub enum DdlError {
    /// A schema element was constructed incorrectly (missing name, duplicate
    /// name, invalid option set).
    #[error("invalid {kind}: {reason}")]
    Construction {
        /// The element kind ("schema", "table", "column", ...).
        kind: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// The target dialect cannot express the requested construct.
    ///
    /// Callers distinguish this kind by variant, never by message text, so
    /// integration suites can treat it as "skip" rather than "failure".
    #[error("unsupported in {dialect}: {reason}")]
    Unsupported {
        /// The dialect that rejected the construct.
        dialect: Dialect,
        /// Human-readable reason.
        reason: String,
    },

    /// A metadata query failed for a reason other than a capability gap.
    #[error("metadata error: {0}")]
    Metadata(#[from] crate::metadata::MetadataError),

    /// Database error surfaced unchanged from the connection layer.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DdlError {
    /// Shorthand for a construction error.
    pub(crate) fn construction(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Construction {
            kind,
            reason: reason.into(),
        }
    }

    /// Shorthand for an unsupported-operation error.
    pub(crate) fn unsupported(dialect: Dialect, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            reason: reason.into(),
        }
    }

    /// Returns whether this error is the unsupported-operation kind.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type for schema and compilation operations.
pub type Result<T> = std::result::Result<T, DdlError>;
