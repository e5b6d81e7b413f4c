//! Settings store
//!
//! The command interface over one settings state:
//! - Path-addressed field edits (`apply`)
//! - Preset and template CRUD
//! - Dirty tracking against the last commit (`is_dirty`, `commit`, `rollback`, `save`)
//! - Whole-document `export` and `import`
//!
//! Every command validates first and then swaps in a complete replacement
//! value. A failing command leaves the store exactly as it was.

use serde_json::Value as JsonValue;

use crate::codec::{self, Decoder};
use crate::config::EngineConfig;
use crate::credentials::CredentialChange;
use crate::defaults::default_state;
use crate::dirty::DirtyTracker;
use crate::error::{BoxError, ParseError, SettingsError};
use crate::mutator::PathMutator;
use crate::path::SettingsPath;
use crate::presets::{Preset, PresetCollection, PresetDraft};
use crate::registry::KeyRegistry;
use crate::state::SettingsState;
use crate::templates::{Template, TemplateCollection, TemplateDraft};
use crate::tree::SettingsTree;

/// External collaborator that persists a committed state
pub trait PersistenceSink {
    /// Persist `state`
    ///
    /// # Errors
    /// Any error aborts the save and leaves the store dirty
    fn persist(&mut self, state: &SettingsState) -> Result<(), BoxError>;
}

impl<F> PersistenceSink for F
where
    F: FnMut(&SettingsState) -> Result<(), BoxError>,
{
    fn persist(&mut self, state: &SettingsState) -> Result<(), BoxError> {
        self(state)
    }
}

/// In-memory settings store owned by one caller
#[derive(Debug, Clone)]
pub struct SettingsStore {
    config: EngineConfig,
    registry: KeyRegistry,
    defaults: SettingsState,
    current: SettingsState,
    tracker: DirtyTracker<SettingsState>,
}

impl SettingsStore {
    /// Store initialized from the factory defaults
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_defaults(config, default_state())
    }

    /// Store initialized from `defaults`, which also fix the key set
    #[must_use]
    pub fn with_defaults(config: EngineConfig, defaults: SettingsState) -> Self {
        let registry = KeyRegistry::from_tree(defaults.tree());
        Self {
            config,
            registry,
            tracker: DirtyTracker::new(&defaults),
            current: defaults.clone(),
            defaults,
        }
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Accepted keys
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SettingsState {
        &self.current
    }

    /// Current settings tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &SettingsTree {
        self.current.tree()
    }

    /// Current presets
    #[inline]
    #[must_use]
    pub fn presets(&self) -> &PresetCollection {
        self.current.presets()
    }

    /// Current templates
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &TemplateCollection {
        self.current.templates()
    }

    /// Value of `field` under the dotted `path`
    ///
    /// # Errors
    /// Returns [`SettingsError::Path`] if `path` is malformed
    pub fn get(&self, path: &str, field: &str) -> Result<Option<&JsonValue>, SettingsError> {
        let path: SettingsPath = path.parse()?;
        Ok(self.current.tree.get(&path, field))
    }

    /// Set `field` under the dotted `path` (`"section"` or `"section.subsection"`)
    ///
    /// # Errors
    /// See [`PathMutator::apply`]
    pub fn apply(
        &mut self,
        path: &str,
        field: &str,
        value: impl Into<JsonValue>,
    ) -> Result<(), SettingsError> {
        let path: SettingsPath = path.parse()?;
        self.apply_at(&path, field, value.into())
    }

    /// Set `field` under a parsed `path`
    ///
    /// # Errors
    /// See [`PathMutator::apply`]
    pub fn apply_at(
        &mut self,
        path: &SettingsPath,
        field: &str,
        value: JsonValue,
    ) -> Result<(), SettingsError> {
        let mutator = PathMutator::new(&self.registry, self.config.key_policy);
        let tree = mutator.apply(&self.current.tree, path, field, value)?;
        tracing::debug!("Applied {}", path.describe_field(field));
        self.current.tree = tree;
        Ok(())
    }

    /// Whether the current state differs from the last commit
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty(&self.current)
    }

    /// Last committed state
    #[inline]
    #[must_use]
    pub fn baseline(&self) -> &SettingsState {
        self.tracker.baseline()
    }

    /// Make the current state the baseline
    pub fn commit(&mut self) {
        self.tracker.commit(&self.current);
        tracing::info!("Committed settings");
    }

    /// Discard every change since the last commit
    pub fn rollback(&mut self) {
        self.current = self.tracker.rollback();
        tracing::info!("Rolled back settings to last commit");
    }

    /// Hand the current state to `sink`, committing only if it succeeds
    ///
    /// # Errors
    /// Returns [`SettingsError::Persistence`] if the sink fails
    pub fn save(&mut self, sink: &mut impl PersistenceSink) -> Result<(), SettingsError> {
        if let Err(e) = sink.persist(&self.current) {
            tracing::warn!("Save failed: {}", e);
            return Err(SettingsError::Persistence(e));
        }
        self.tracker.commit(&self.current);
        tracing::info!("Saved settings");
        Ok(())
    }

    /// Replace the current state with the defaults, leaving the baseline alone
    pub fn reset_to_defaults(&mut self) {
        self.current = self.defaults.clone();
        tracing::info!("Reset settings to defaults");
    }

    /// Append a new preset
    ///
    /// # Errors
    /// See [`PresetCollection::create`]
    pub fn create_preset(&mut self, draft: PresetDraft) -> Result<Preset, SettingsError> {
        let mut presets = self.current.presets.clone();
        let preset = presets.create(draft)?;
        tracing::debug!("Created preset {} '{}'", preset.id, preset.name);
        self.current.presets = presets;
        Ok(preset)
    }

    /// Replace the preset with `id`
    ///
    /// # Errors
    /// See [`PresetCollection::update`]
    pub fn update_preset(&mut self, id: u64, draft: PresetDraft) -> Result<Preset, SettingsError> {
        let mut presets = self.current.presets.clone();
        let preset = presets.update(id, draft)?;
        tracing::debug!("Updated preset {}", id);
        self.current.presets = presets;
        Ok(preset)
    }

    /// Remove the preset with `id`
    ///
    /// # Errors
    /// See [`PresetCollection::delete`]
    pub fn delete_preset(&mut self, id: u64) -> Result<Preset, SettingsError> {
        let mut presets = self.current.presets.clone();
        let preset = presets.delete(id)?;
        tracing::debug!("Deleted preset {}", id);
        self.current.presets = presets;
        Ok(preset)
    }

    /// Append a new custom template
    ///
    /// # Errors
    /// See [`TemplateCollection::create`]
    pub fn create_template(&mut self, draft: TemplateDraft) -> Result<Template, SettingsError> {
        let mut templates = self.current.templates.clone();
        let template = templates.create(draft)?;
        tracing::debug!("Created template {}", template.id);
        self.current.templates = templates;
        Ok(template)
    }

    /// Replace the template with `id`
    ///
    /// # Errors
    /// See [`TemplateCollection::update`]
    pub fn update_template(
        &mut self,
        id: &str,
        draft: TemplateDraft,
    ) -> Result<Template, SettingsError> {
        let mut templates = self.current.templates.clone();
        let template = templates.update(id, draft)?;
        tracing::debug!("Updated template {}", id);
        self.current.templates = templates;
        Ok(template)
    }

    /// Remove the custom template with `id`
    ///
    /// # Errors
    /// See [`TemplateCollection::delete`]
    pub fn delete_template(&mut self, id: &str) -> Result<Template, SettingsError> {
        let mut templates = self.current.templates.clone();
        let template = templates.delete(id)?;
        tracing::debug!("Deleted template {}", id);
        self.current.templates = templates;
        Ok(template)
    }

    /// Check a password change request
    ///
    /// # Errors
    /// See [`CredentialChange::validate`]
    pub fn check_credentials(&self, change: &CredentialChange) -> Result<(), SettingsError> {
        change.validate()
    }

    /// Current state as JSON text, indented per [`EngineConfig::pretty_export`]
    #[must_use]
    pub fn export(&self) -> String {
        codec::export(&self.current, self.config.pretty_export)
    }

    /// Current state as compact JSON bytes
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        codec::serialize(&self.current)
    }

    /// Decode a document without touching the store
    ///
    /// # Errors
    /// Returns a [`ParseError`] describing the first problem found
    pub fn parse(&self, bytes: &[u8]) -> Result<SettingsState, ParseError> {
        Decoder::new(
            &self.registry,
            self.defaults.tree(),
            self.config.key_policy,
            self.config.import_policy,
        )
        .parse(bytes)
    }

    /// Replace the whole current state with the document in `text`
    ///
    /// The baseline is not changed; the store is dirty afterwards unless the
    /// document equals the last commit.
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`]; the store is left untouched
    pub fn import(&mut self, text: &str) -> Result<(), SettingsError> {
        self.import_bytes(text.as_bytes())
    }

    /// Byte-level form of [`Self::import`]
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`]; the store is left untouched
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<(), SettingsError> {
        match self.parse(bytes) {
            Ok(state) => {
                self.current = state;
                tracing::info!(
                    "Imported settings: {} sections, {} presets, {} templates",
                    self.current.tree.len(),
                    self.current.presets.len(),
                    self.current.templates.len()
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected import: {}", e);
                Err(e.into())
            }
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
