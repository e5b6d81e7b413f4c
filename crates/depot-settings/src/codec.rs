//! Whole-document export and import
//!
//! The exported document mirrors the in-memory state: each section sits at
//! the top level under its own name, next to the two collections:
//!
//! ```json
//! {
//!   "business": { "name": "Storage Depot", ... },
//!   "notifications": { "email": { "smtpPort": 587, ... }, ... },
//!   "unitPresets": { "items": [ ... ], "nextId": 5 },
//!   "messageTemplates": { "items": [ ... ] }
//! }
//! ```
//!
//! Decoding is pure: it either yields a complete [`SettingsState`] or a
//! [`ParseError`] and never touches an existing state.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::config::{ImportPolicy, KeyPolicy};
use crate::error::ParseError;
use crate::presets::PresetCollection;
use crate::registry::KeyRegistry;
use crate::state::SettingsState;
use crate::templates::TemplateCollection;
use crate::tree::{first_nested_mapping, section_from_json, SettingsTree};

/// Document key holding the preset collection
pub const PRESETS_KEY: &str = "unitPresets";

/// Document key holding the template collection
pub const TEMPLATES_KEY: &str = "messageTemplates";

/// JSON document for `state`
#[must_use]
pub fn to_document(state: &SettingsState) -> JsonValue {
    let mut document = state.tree.to_json();
    document.insert(PRESETS_KEY.to_string(), to_value(&state.presets));
    document.insert(TEMPLATES_KEY.to_string(), to_value(&state.templates));
    JsonValue::Object(document)
}

/// Export `state` as JSON text
#[must_use]
pub fn export(state: &SettingsState, pretty: bool) -> String {
    let document = to_document(state);
    if pretty {
        format!("{document:#}")
    } else {
        document.to_string()
    }
}

/// Export `state` as compact JSON bytes
#[must_use]
pub fn serialize(state: &SettingsState) -> Vec<u8> {
    export(state, false).into_bytes()
}

// Collections hold only strings, finite numbers and booleans.
fn to_value<T: serde::Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

/// Import document decoder
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    registry: &'a KeyRegistry,
    defaults: &'a SettingsTree,
    key_policy: KeyPolicy,
    import_policy: ImportPolicy,
}

impl<'a> Decoder<'a> {
    /// Create decoder checking keys against `registry` and filling gaps
    /// from `defaults` when the policy allows
    #[must_use]
    pub fn new(
        registry: &'a KeyRegistry,
        defaults: &'a SettingsTree,
        key_policy: KeyPolicy,
        import_policy: ImportPolicy,
    ) -> Self {
        Self {
            registry,
            defaults,
            key_policy,
            import_policy,
        }
    }

    /// Decode a complete state from JSON bytes
    ///
    /// # Errors
    /// Returns a [`ParseError`] describing the first problem found
    pub fn parse(&self, bytes: &[u8]) -> Result<SettingsState, ParseError> {
        let document: JsonValue = serde_json::from_slice(bytes)?;
        let JsonValue::Object(mut root) = document else {
            return Err(ParseError::NotAnObject("<root>".to_string()));
        };

        let presets: PresetCollection = take_collection(&mut root, PRESETS_KEY)?;
        presets
            .check_integrity()
            .map_err(|reason| ParseError::invalid_record(PRESETS_KEY, reason))?;

        let templates: TemplateCollection = take_collection(&mut root, TEMPLATES_KEY)?;
        templates
            .check_integrity()
            .map_err(|reason| ParseError::invalid_record(TEMPLATES_KEY, reason))?;

        let tree = self.decode_tree(root)?;
        Ok(SettingsState::new(tree, presets, templates))
    }

    fn decode_tree(&self, root: Map<String, JsonValue>) -> Result<SettingsTree, ParseError> {
        let mut sections = Vec::with_capacity(root.len());
        for (name, value) in root {
            check_depth(&name, &value)?;
            let section = section_from_json(value).ok_or_else(|| ParseError::NotAnObject(name.clone()))?;
            sections.push((name, section));
        }
        let parsed = SettingsTree::from_sections(sections);

        if self.key_policy == KeyPolicy::Closed {
            if let Some(unknown) = self.registry.first_unknown(&parsed) {
                return Err(ParseError::UnknownKey(unknown));
            }
        }

        match self.import_policy {
            ImportPolicy::Strict => match self.registry.first_missing(&parsed) {
                Some(missing) => Err(ParseError::MissingKey(missing)),
                None => Ok(parsed),
            },
            ImportPolicy::MergeWithDefaults => Ok(self.defaults.overlay(&parsed)),
        }
    }
}

fn take_collection<T: DeserializeOwned>(
    root: &mut Map<String, JsonValue>,
    key: &'static str,
) -> Result<T, ParseError> {
    let value = root
        .remove(key)
        .ok_or_else(|| ParseError::MissingKey(key.to_string()))?;
    serde_json::from_value(value).map_err(|source| ParseError::InvalidCollection { key, source })
}

/// Sections may hold subsections, but subsections hold only plain values
fn check_depth(name: &str, section: &JsonValue) -> Result<(), ParseError> {
    let JsonValue::Object(fields) = section else {
        return Ok(());
    };
    for (field, value) in fields {
        if let JsonValue::Object(sub) = value {
            if let Some(key) = first_nested_mapping(sub) {
                return Err(ParseError::TooDeep(format!("{name}.{field}.{key}")));
            }
        }
    }
    Ok(())
}
