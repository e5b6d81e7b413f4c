//! Error types for the settings engine
//!
//! Provides error handling for:
//! - Field rule violations (validation)
//! - Import payload problems (parse)
//! - Guarded sub-resource operations (protected records, missing records)
//! - Addressing problems (paths and unknown keys)

use crate::path::PathError;
use crate::registry::KeyError;

/// Boxed error returned by external persistence collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main settings error type
///
/// Every variant is reported to the immediate caller; the store is left
/// exactly as it was before the failing call.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A field rule was violated
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Two related fields disagree
    #[error("'{confirm_field}' does not match '{field}'")]
    ConfirmationMismatch {
        /// Field holding the original value
        field: String,
        /// Field that should repeat it
        confirm_field: String,
    },

    /// Import payload could not be accepted
    #[error("import failed: {0}")]
    Parse(#[from] ParseError),

    /// Built-in record cannot be deleted
    #[error("'{id}' is a built-in template and cannot be deleted")]
    ProtectedRecord {
        /// Id of the protected record
        id: String,
    },

    /// Sub-resource record does not exist
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Collection kind ("preset", "template")
        kind: &'static str,
        /// Requested id
        id: String,
    },

    /// Malformed settings path
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Key not accepted by the registry
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Path addresses a subsection whose current value is not a mapping
    #[error("'{path}' is not a mapping")]
    NotAMapping {
        /// Offending location
        path: String,
    },

    /// A mapping was supplied where the tree only allows a leaf value
    #[error("'{path}' must hold a plain value, not a mapping")]
    MappingValue {
        /// Offending location
        path: String,
    },

    /// External persistence collaborator failed during save
    #[error("persistence failed: {0}")]
    Persistence(#[source] BoxError),
}

impl SettingsError {
    /// Create not-found error
    #[inline]
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Check if error is a rule violation on user input
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::ConfirmationMismatch { .. }
        )
    }

    /// Check if the failed call may succeed when retried unchanged
    ///
    /// Only persistence failures qualify; everything else needs corrected
    /// input.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Field-level rule violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Field that failed
    pub field: String,
    /// Description of the violated rule
    pub message: String,
}

impl ValidationError {
    /// Create validation error for field
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors while decoding an imported document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Text is not valid JSON
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A value that must be an object is not
    #[error("'{0}' must be an object")]
    NotAnObject(String),

    /// Required key is absent
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Key is not part of the settings shape
    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// A subsection nests further mappings
    #[error("'{0}' nests deeper than section.subsection.field")]
    TooDeep(String),

    /// Collection does not match its record layout
    #[error("invalid {key}: {source}")]
    InvalidCollection {
        /// Document key of the collection
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Collection is well formed but its records break an invariant
    #[error("invalid record in {key}: {reason}")]
    InvalidRecord {
        /// Document key of the collection
        key: &'static str,
        /// What is wrong
        reason: String,
    },
}

impl ParseError {
    /// Create invalid-record error
    pub fn invalid_record(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            key,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field() {
        let err = SettingsError::from(ValidationError::new("size", "must be greater than 0"));
        assert_eq!(
            err.to_string(),
            "validation failed: size: must be greater than 0"
        );
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn confirmation_mismatch_counts_as_validation() {
        let err = SettingsError::ConfirmationMismatch {
            field: "newPassword".into(),
            confirm_field: "confirmPassword".into(),
        };
        assert!(err.is_validation());
    }

    #[test]
    fn persistence_is_retryable() {
        let err = SettingsError::Persistence("disk full".into());
        assert!(err.is_retryable());
        assert!(!err.is_validation());
    }

    #[test]
    fn not_found_formats_id() {
        let err = SettingsError::not_found("preset", 7);
        assert_eq!(err.to_string(), "preset '7' not found");
    }
}
