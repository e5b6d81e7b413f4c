//! Settings tree
//!
//! A persistent two-level mapping: section → field → value, where a value may
//! itself be a flat mapping (a subsection). Built on [`im::OrdMap`] so that a
//! cloned or updated tree shares every untouched section with its source.

use im::OrdMap;
use serde_json::{Map, Value as JsonValue};

use crate::path::SettingsPath;

/// One section of the tree: field name → value
pub type Section = OrdMap<String, JsonValue>;

/// Hierarchical settings document
///
/// Cloning is O(1). Equality first checks whether sections share storage,
/// which makes comparing a tree against an ancestor it was derived from cheap.
#[derive(Debug, Clone, Default)]
pub struct SettingsTree {
    sections: OrdMap<String, Section>,
}

impl SettingsTree {
    /// Empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(name, section)` pairs
    pub fn from_sections<I>(sections: I) -> Self
    where
        I: IntoIterator<Item = (String, Section)>,
    {
        Self {
            sections: sections.into_iter().collect(),
        }
    }

    /// Number of sections
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the tree has no sections
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Look up a section by name
    #[inline]
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Iterate sections in key order
    pub fn sections(&self) -> impl Iterator<Item = (&String, &Section)> {
        self.sections.iter()
    }

    /// Value of `field` under `path`, if present
    #[must_use]
    pub fn get(&self, path: &SettingsPath, field: &str) -> Option<&JsonValue> {
        let section = self.sections.get(path.section_name())?;
        match path.subsection_name() {
            None => section.get(field),
            Some(sub) => section.get(sub)?.as_object()?.get(field),
        }
    }

    /// Whether both trees hold the very same section storage for `name`
    ///
    /// True means the section was carried over untouched by an update.
    #[must_use]
    pub fn shares_section(&self, other: &Self, name: &str) -> bool {
        match (self.sections.get(name), other.sections.get(name)) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Whether both trees share their entire storage
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.sections.ptr_eq(&other.sections)
    }

    /// New tree with `name` replaced by `section`; every other section is shared
    #[must_use]
    pub(crate) fn with_section(&self, name: String, section: Section) -> Self {
        Self {
            sections: self.sections.update(name, section),
        }
    }

    /// Overlay `other` on top of `self`
    ///
    /// Sections and fields present in `other` win; subsections are merged
    /// field by field. Used to fill gaps in an imported document.
    #[must_use]
    pub fn overlay(&self, other: &Self) -> Self {
        let mut sections = self.sections.clone();
        for (name, incoming) in &other.sections {
            let merged = match sections.get(name) {
                Some(base) => merge_section(base, incoming),
                None => incoming.clone(),
            };
            sections.insert(name.clone(), merged);
        }
        Self { sections }
    }

    /// JSON object holding every section
    #[must_use]
    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.sections
            .iter()
            .map(|(name, section)| {
                let fields: Map<String, JsonValue> = section
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (name.clone(), JsonValue::Object(fields))
            })
            .collect()
    }
}

impl PartialEq for SettingsTree {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.sections.len() == other.sections.len()
            && self.sections.iter().all(|(name, section)| {
                other
                    .sections
                    .get(name)
                    .is_some_and(|theirs| section.ptr_eq(theirs) || section == theirs)
            })
    }
}

/// Build a section from a JSON object; anything else yields `None`
#[must_use]
pub fn section_from_json(value: JsonValue) -> Option<Section> {
    match value {
        JsonValue::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

/// Key of the first mapping nested inside a subsection's fields
///
/// Subsections hold only plain values; any hit here would be a third level.
pub(crate) fn first_nested_mapping(fields: &Map<String, JsonValue>) -> Option<&str> {
    fields
        .iter()
        .find(|(_, value)| value.is_object())
        .map(|(key, _)| key.as_str())
}

fn merge_section(base: &Section, incoming: &Section) -> Section {
    let mut result = base.clone();
    for (key, value) in incoming {
        let merged = match (result.get(key), value) {
            (Some(JsonValue::Object(old)), JsonValue::Object(new)) => {
                let mut fields = old.clone();
                for (k, v) in new {
                    fields.insert(k.clone(), v.clone());
                }
                JsonValue::Object(fields)
            }
            _ => value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}
