//! Settings state: the tree together with its sub-resource collections

use crate::presets::PresetCollection;
use crate::templates::TemplateCollection;
use crate::tree::SettingsTree;

/// Everything a store tracks, exports and imports as one unit
///
/// Cloning is cheap; all three parts are persistent structures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsState {
    pub(crate) tree: SettingsTree,
    pub(crate) presets: PresetCollection,
    pub(crate) templates: TemplateCollection,
}

impl SettingsState {
    /// Assemble state from its parts
    #[must_use]
    pub fn new(tree: SettingsTree, presets: PresetCollection, templates: TemplateCollection) -> Self {
        Self {
            tree,
            presets,
            templates,
        }
    }

    /// Settings tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &SettingsTree {
        &self.tree
    }

    /// Unit-size presets
    #[inline]
    #[must_use]
    pub fn presets(&self) -> &PresetCollection {
        &self.presets
    }

    /// Message templates
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &TemplateCollection {
        &self.templates
    }

    /// Whether every part shares storage with `other`
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.tree.ptr_eq(&other.tree)
            && self.presets.ptr_eq(&other.presets)
            && self.templates.ptr_eq(&other.templates)
    }
}
