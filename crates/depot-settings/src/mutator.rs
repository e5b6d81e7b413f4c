//! Path mutator
//!
//! Applies one field-level change to a [`SettingsTree`] and returns the new
//! tree. The input is never modified; every section other than the addressed
//! one is shared with the input.

use serde_json::{Map, Value as JsonValue};

use crate::config::KeyPolicy;
use crate::error::SettingsError;
use crate::path::{validate_key, SettingsPath};
use crate::registry::{KeyError, KeyRegistry};
use crate::tree::{first_nested_mapping, SettingsTree};

/// Path-addressed field writer
#[derive(Debug, Clone, Copy)]
pub struct PathMutator<'r> {
    registry: &'r KeyRegistry,
    policy: KeyPolicy,
}

impl<'r> PathMutator<'r> {
    /// Create mutator checking keys against `registry` under `policy`
    #[inline]
    #[must_use]
    pub fn new(registry: &'r KeyRegistry, policy: KeyPolicy) -> Self {
        Self { registry, policy }
    }

    /// Replace `field` under `path` with `value`
    ///
    /// Returns the input tree itself (shared) when the value is unchanged.
    ///
    /// # Errors
    /// - [`SettingsError::Path`] if `field` is not a valid key
    /// - [`SettingsError::Key`] if the location is unknown under [`KeyPolicy::Closed`],
    ///   or names a registered subsection under either policy
    /// - [`SettingsError::NotAMapping`] if the subsection holds a plain value
    /// - [`SettingsError::MappingValue`] if `value` is a mapping at a registered
    ///   leaf, inside a subsection, or itself holds mappings
    pub fn apply(
        &self,
        tree: &SettingsTree,
        path: &SettingsPath,
        field: &str,
        value: JsonValue,
    ) -> Result<SettingsTree, SettingsError> {
        validate_key(field)?;

        // Open only relaxes unknown locations; registered ones keep their shape.
        let registered = match self.registry.check(path, field) {
            Ok(()) => true,
            Err(KeyError::Unknown(_)) if self.policy == KeyPolicy::Open => false,
            Err(e) => return Err(e.into()),
        };
        if let JsonValue::Object(fields) = &value {
            if registered || path.depth() == 2 {
                return Err(SettingsError::MappingValue {
                    path: path.describe_field(field),
                });
            }
            if let Some(key) = first_nested_mapping(fields) {
                return Err(SettingsError::MappingValue {
                    path: format!("{}.{key}", path.describe_field(field)),
                });
            }
        }

        if tree.get(path, field) == Some(&value) {
            return Ok(tree.clone());
        }

        let mut section = tree
            .section(path.section_name())
            .cloned()
            .unwrap_or_default();

        match path.subsection_name() {
            None => {
                section.insert(field.to_string(), value);
            }
            Some(sub) => {
                let mut fields = match section.get(sub) {
                    Some(JsonValue::Object(existing)) => existing.clone(),
                    Some(_) => {
                        return Err(SettingsError::NotAMapping {
                            path: path.to_string(),
                        })
                    }
                    None => Map::new(),
                };
                fields.insert(field.to_string(), value);
                section.insert(sub.to_string(), JsonValue::Object(fields));
            }
        }

        Ok(tree.with_section(path.section_name().to_string(), section))
    }
}
