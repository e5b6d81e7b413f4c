//! Credential change validation
//!
//! The engine never stores credentials. It only checks a requested change
//! and hands it back for an external collaborator to apply.

use std::fmt;

use once_cell::sync::Lazy;

use crate::error::SettingsError;
use crate::validation::{password_strength, FieldValue, Fields, Rule, RuleSet};

static CREDENTIAL_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .required("currentPassword")
        .required("newPassword")
        .rule(password_strength("newPassword"))
        .rule(Rule::Differs {
            field: "newPassword",
            other: "currentPassword",
            description: "must differ from the current password",
        })
        .matches("newPassword", "confirmPassword")
});

/// Requested password change
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CredentialChange {
    /// Password in use
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
    /// Repetition of the replacement
    pub confirm_password: String,
}

impl CredentialChange {
    /// Create change request
    pub fn new(
        current_password: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            current_password: current_password.into(),
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Check the change
    ///
    /// # Errors
    /// - [`SettingsError::Validation`] for a blank or weak password, or a
    ///   new password equal to the current one
    /// - [`SettingsError::ConfirmationMismatch`] if the confirmation differs
    pub fn validate(&self) -> Result<(), SettingsError> {
        CREDENTIAL_RULES.validate(self)
    }
}

impl Fields for CredentialChange {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "currentPassword" => FieldValue::Text(&self.current_password),
            "newPassword" => FieldValue::Text(&self.new_password),
            "confirmPassword" => FieldValue::Text(&self.confirm_password),
            _ => FieldValue::Missing,
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for CredentialChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChange").finish_non_exhaustive()
    }
}
