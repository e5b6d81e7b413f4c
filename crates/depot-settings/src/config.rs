//! Engine configuration

use serde::{Deserialize, Serialize};

/// How the path mutator treats keys missing from the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// Reject sections, subsections and fields the registry does not know
    #[default]
    Closed,
    /// Create unknown keys on write without touching their siblings
    Open,
}

/// How imported documents are reconciled with the default shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Every registered key must be present
    #[default]
    Strict,
    /// Missing sections and fields are filled in from the defaults
    MergeWithDefaults,
}

/// Settings engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key handling for writes and imports
    pub key_policy: KeyPolicy,
    /// Shape reconciliation for imports
    pub import_policy: ImportPolicy,
    /// Indent exported documents
    pub pretty_export: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With key policy
    #[inline]
    #[must_use]
    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// With import policy
    #[inline]
    #[must_use]
    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }

    /// With pretty export toggled
    #[inline]
    #[must_use]
    pub fn with_pretty_export(mut self, pretty: bool) -> Self {
        self.pretty_export = pretty;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_policy: KeyPolicy::Closed,
            import_policy: ImportPolicy::Strict,
            pretty_export: true,
        }
    }
}
