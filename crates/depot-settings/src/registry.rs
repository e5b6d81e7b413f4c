//! Key registry
//!
//! The closed set of section, subsection and field identifiers a store
//! accepts. Derived once from the default tree and consulted at the boundary
//! by the path mutator and the import decoder.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value as JsonValue;

use crate::path::SettingsPath;
use crate::tree::SettingsTree;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SectionKeys {
    fields: BTreeSet<String>,
    subsections: BTreeMap<String, BTreeSet<String>>,
}

/// Known settings identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRegistry {
    sections: BTreeMap<String, SectionKeys>,
}

impl KeyRegistry {
    /// Record every key present in `tree`
    ///
    /// Object-valued fields become subsections; everything else is a leaf.
    #[must_use]
    pub fn from_tree(tree: &SettingsTree) -> Self {
        let sections = tree
            .sections()
            .map(|(name, section)| {
                let mut keys = SectionKeys::default();
                for (field, value) in section {
                    match value {
                        JsonValue::Object(sub) => {
                            keys.subsections
                                .insert(field.clone(), sub.keys().cloned().collect());
                        }
                        _ => {
                            keys.fields.insert(field.clone());
                        }
                    }
                }
                (name.clone(), keys)
            })
            .collect();
        Self { sections }
    }

    /// Whether `name` is a registered section
    #[inline]
    #[must_use]
    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Registered section names in order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Check that `field` under `path` is a registered leaf
    ///
    /// # Errors
    /// - [`KeyError::Unknown`] if any segment is not registered
    /// - [`KeyError::NotAField`] if `field` names a subsection
    pub fn check(&self, path: &SettingsPath, field: &str) -> Result<(), KeyError> {
        let keys = self
            .sections
            .get(path.section_name())
            .ok_or_else(|| KeyError::Unknown(path.section_name().to_string()))?;

        match path.subsection_name() {
            None => {
                if keys.fields.contains(field) {
                    Ok(())
                } else if keys.subsections.contains_key(field) {
                    Err(KeyError::NotAField(path.describe_field(field)))
                } else {
                    Err(KeyError::Unknown(path.describe_field(field)))
                }
            }
            Some(sub) => {
                let fields = keys
                    .subsections
                    .get(sub)
                    .ok_or_else(|| KeyError::Unknown(path.to_string()))?;
                if fields.contains(field) {
                    Ok(())
                } else {
                    Err(KeyError::Unknown(path.describe_field(field)))
                }
            }
        }
    }

    /// First key in `tree` that the registry does not know, as a dotted path
    #[must_use]
    pub fn first_unknown(&self, tree: &SettingsTree) -> Option<String> {
        for (name, section) in tree.sections() {
            let Some(keys) = self.sections.get(name) else {
                return Some(name.clone());
            };
            for (field, value) in section {
                match (keys.subsections.get(field), value) {
                    (Some(known), JsonValue::Object(sub)) => {
                        if let Some(extra) = sub.keys().find(|k| !known.contains(*k)) {
                            return Some(format!("{name}.{field}.{extra}"));
                        }
                    }
                    (None, leaf) if !leaf.is_object() && keys.fields.contains(field) => {}
                    _ => return Some(format!("{name}.{field}")),
                }
            }
        }
        None
    }

    /// First registered key absent from `tree`, as a dotted path
    #[must_use]
    pub fn first_missing(&self, tree: &SettingsTree) -> Option<String> {
        for (name, keys) in &self.sections {
            let Some(section) = tree.section(name) else {
                return Some(name.clone());
            };
            if let Some(field) = keys.fields.iter().find(|f| !section.contains_key(*f)) {
                return Some(format!("{name}.{field}"));
            }
            for (sub, fields) in &keys.subsections {
                let Some(JsonValue::Object(present)) = section.get(sub) else {
                    return Some(format!("{name}.{sub}"));
                };
                if let Some(field) = fields.iter().find(|f| !present.contains_key(*f)) {
                    return Some(format!("{name}.{sub}.{field}"));
                }
            }
        }
        None
    }
}

/// Key lookup failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Key is not part of the registered settings shape
    #[error("unknown settings key: {0}")]
    Unknown(String),

    /// Key names a subsection where a leaf field was expected
    #[error("'{0}' is a subsection; address its fields individually")]
    NotAField(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::section_from_json;
    use serde_json::json;

    fn registry() -> KeyRegistry {
        KeyRegistry::from_tree(&sample())
    }

    fn sample() -> SettingsTree {
        SettingsTree::from_sections([(
            "notifications".to_string(),
            section_from_json(json!({
                "reminderDaysBefore": 3,
                "email": {"enabled": true, "smtpHost": "smtp.example.com"}
            }))
            .unwrap(),
        )])
    }

    #[test]
    fn check_accepts_known_leaves() {
        let reg = registry();
        let section: SettingsPath = "notifications".parse().unwrap();
        let email: SettingsPath = "notifications.email".parse().unwrap();

        assert!(reg.check(&section, "reminderDaysBefore").is_ok());
        assert!(reg.check(&email, "smtpHost").is_ok());
    }

    #[test]
    fn check_rejects_unknown_keys() {
        let reg = registry();
        let unknown_section: SettingsPath = "billing".parse().unwrap();
        let unknown_sub: SettingsPath = "notifications.push".parse().unwrap();
        let email: SettingsPath = "notifications.email".parse().unwrap();

        assert_eq!(
            reg.check(&unknown_section, "x"),
            Err(KeyError::Unknown("billing".to_string()))
        );
        assert_eq!(
            reg.check(&unknown_sub, "enabled"),
            Err(KeyError::Unknown("notifications.push".to_string()))
        );
        assert_eq!(
            reg.check(&email, "smtpPassword"),
            Err(KeyError::Unknown("notifications.email.smtpPassword".to_string()))
        );
    }

    #[test]
    fn check_rejects_subsection_as_field() {
        let reg = registry();
        let section: SettingsPath = "notifications".parse().unwrap();
        assert!(matches!(
            reg.check(&section, "email"),
            Err(KeyError::NotAField(_))
        ));
    }

    #[test]
    fn first_unknown_and_missing_on_matching_tree() {
        let reg = registry();
        assert_eq!(reg.first_unknown(&sample()), None);
        assert_eq!(reg.first_missing(&sample()), None);
    }

    #[test]
    fn first_unknown_reports_nested_extra() {
        let reg = registry();
        let tree = SettingsTree::from_sections([(
            "notifications".to_string(),
            section_from_json(json!({
                "reminderDaysBefore": 3,
                "email": {"enabled": true, "smtpHost": "h", "tls": true}
            }))
            .unwrap(),
        )]);
        assert_eq!(
            reg.first_unknown(&tree),
            Some("notifications.email.tls".to_string())
        );
    }

    #[test]
    fn first_unknown_reports_mapping_at_leaf() {
        let reg = registry();
        let tree = SettingsTree::from_sections([(
            "notifications".to_string(),
            section_from_json(json!({
                "reminderDaysBefore": {"days": 3},
                "email": {"enabled": true, "smtpHost": "h"}
            }))
            .unwrap(),
        )]);
        assert_eq!(
            reg.first_unknown(&tree),
            Some("notifications.reminderDaysBefore".to_string())
        );
    }

    #[test]
    fn first_unknown_reports_plain_value_at_subsection() {
        let reg = registry();
        let tree = SettingsTree::from_sections([(
            "notifications".to_string(),
            section_from_json(json!({"reminderDaysBefore": 3, "email": "off"})).unwrap(),
        )]);
        assert_eq!(
            reg.first_unknown(&tree),
            Some("notifications.email".to_string())
        );
    }

    #[test]
    fn first_missing_reports_nested_gap() {
        let reg = registry();
        let tree = SettingsTree::from_sections([(
            "notifications".to_string(),
            section_from_json(json!({"reminderDaysBefore": 3, "email": {"enabled": true}}))
                .unwrap(),
        )]);
        assert_eq!(
            reg.first_missing(&tree),
            Some("notifications.email.smtpHost".to_string())
        );
    }
}
