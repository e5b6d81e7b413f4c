//! Notification message templates
//!
//! Built-in templates carry reserved ids and cannot be deleted. User-created
//! templates get a time-derived `custom_<millis>` id. Placeholder tokens such
//! as `[CUSTOMER_NAME]` are opaque text here; an external sender fills them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Record};
use crate::error::{SettingsError, ValidationError};
use crate::validation::{FieldValue, Fields, RuleSet};

/// Reserved ids of the built-in templates
pub const BUILT_IN_TEMPLATE_IDS: [&str; 3] = ["contract_expiry", "payment_due", "payment_overdue"];

/// Prefix of generated template ids
pub const CUSTOM_ID_PREFIX: &str = "custom_";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Z][A-Z0-9_]*)\]").expect("static regex"));

static TEMPLATE_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .required("name")
        .required("subject")
        .required("message")
});

/// Stored message template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Reserved or generated id
    pub id: String,
    /// Display name
    pub name: String,
    /// Subject line
    pub subject: String,
    /// Body with placeholder tokens
    pub message: String,
    /// Whether the template was created by a user
    pub is_custom: bool,
}

impl Template {
    /// Whether the template is built in and must not be deleted
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !self.is_custom || is_reserved_id(&self.id)
    }

    /// Distinct placeholder tokens in subject and message, in order of first use
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        for text in [self.subject.as_str(), self.message.as_str()] {
            for capture in PLACEHOLDER.captures_iter(text) {
                if let Some(token) = capture.get(1).map(|m| m.as_str()) {
                    if !found.contains(&token) {
                        found.push(token);
                    }
                }
            }
        }
        found
    }

    /// Editable fields of this template
    #[must_use]
    pub fn draft(&self) -> TemplateDraft {
        TemplateDraft {
            name: self.name.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        }
    }
}

impl Record for Template {
    type Id = String;
    const KIND: &'static str = "template";

    fn id(&self) -> &String {
        &self.id
    }
}

/// Whether `id` begins with a reserved built-in id
#[must_use]
pub fn is_reserved_id(id: &str) -> bool {
    BUILT_IN_TEMPLATE_IDS.iter().any(|reserved| id.starts_with(reserved))
}

/// Caller-supplied template fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Display name
    pub name: String,
    /// Subject line
    pub subject: String,
    /// Body
    pub message: String,
}

impl TemplateDraft {
    /// Create draft
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl Fields for TemplateDraft {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => FieldValue::Text(&self.name),
            "subject" => FieldValue::Text(&self.subject),
            "message" => FieldValue::Text(&self.message),
            _ => FieldValue::Missing,
        }
    }
}

/// Ordered message templates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateCollection {
    items: Collection<Template>,
}

impl TemplateCollection {
    /// Empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection from existing records
    ///
    /// # Errors
    /// Returns [`SettingsError::Validation`] if ids repeat or a record is
    /// invalid
    pub fn from_records(items: Vec<Template>) -> Result<Self, SettingsError> {
        let collection = Self {
            items: items.into_iter().collect(),
        };
        collection
            .check_integrity()
            .map_err(|reason| ValidationError::new("messageTemplates", reason))?;
        Ok(collection)
    }

    /// Records in insertion order
    pub fn list(&self) -> impl Iterator<Item = &Template> {
        self.items.iter()
    }

    /// Record with `id`
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate and append a user template with a fresh id
    ///
    /// # Errors
    /// Returns [`SettingsError::Validation`] if name, subject or message is
    /// blank
    pub fn create(&mut self, draft: TemplateDraft) -> Result<Template, SettingsError> {
        TEMPLATE_RULES.validate(&draft)?;

        let template = Template {
            id: self.fresh_id(chrono::Utc::now().timestamp_millis()),
            name: draft.name,
            subject: draft.subject,
            message: draft.message,
            is_custom: true,
        };
        self.items.push_back(template.clone());
        Ok(template)
    }

    /// Validate and replace the template with `id` in place
    ///
    /// Id and custom flag are preserved.
    ///
    /// # Errors
    /// - [`SettingsError::NotFound`] if no template has `id`
    /// - [`SettingsError::Validation`] as for [`Self::create`]
    pub fn update(&mut self, id: &str, draft: TemplateDraft) -> Result<Template, SettingsError> {
        let existing = self
            .get(id)
            .ok_or_else(|| SettingsError::not_found(Template::KIND, id))?;
        TEMPLATE_RULES.validate(&draft)?;

        let template = Template {
            id: existing.id.clone(),
            name: draft.name,
            subject: draft.subject,
            message: draft.message,
            is_custom: existing.is_custom,
        };
        self.items.replace(&template.id, template.clone());
        Ok(template)
    }

    /// Remove the template with `id`
    ///
    /// # Errors
    /// - [`SettingsError::NotFound`] if no template has `id`
    /// - [`SettingsError::ProtectedRecord`] if the template is built in
    pub fn delete(&mut self, id: &str) -> Result<Template, SettingsError> {
        let existing = self
            .get(id)
            .ok_or_else(|| SettingsError::not_found(Template::KIND, id))?;
        if existing.is_protected() {
            return Err(SettingsError::ProtectedRecord { id: id.to_string() });
        }
        self.items
            .remove(&id.to_string())
            .ok_or_else(|| SettingsError::not_found(Template::KIND, id))
    }

    /// Append a trusted record
    pub(crate) fn push_unchecked(&mut self, template: Template) {
        self.items.push_back(template);
    }

    /// Whether both collections share storage
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.items.ptr_eq(&other.items)
    }

    /// `custom_<millis>`, suffixed with `_n` if already taken
    fn fresh_id(&self, millis: i64) -> String {
        let base = format!("{CUSTOM_ID_PREFIX}{millis}");
        let mut candidate = base.clone();
        let mut n = 1;
        while self.get(&candidate).is_some() {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        candidate
    }

    /// Check record invariants, describing the first violation
    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        if let Some(id) = self.items.first_duplicate() {
            return Err(format!("duplicate template id '{id}'"));
        }
        for template in self.items.iter() {
            if template.id.trim().is_empty() {
                return Err("template id must not be empty".to_string());
            }
            TEMPLATE_RULES
                .validate(&template.draft())
                .map_err(|e| format!("template '{}': {e}", template.id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_in(id: &str) -> Template {
        Template {
            id: id.to_string(),
            name: "Built in".into(),
            subject: "Notice".into(),
            message: "Dear [CUSTOMER_NAME]".into(),
            is_custom: false,
        }
    }

    fn custom(id: &str) -> Template {
        Template {
            is_custom: true,
            ..built_in(id)
        }
    }

    fn draft() -> TemplateDraft {
        TemplateDraft::new("Welcome", "Welcome to [FACILITY_NAME]", "Hi [CUSTOMER_NAME]!")
    }

    #[test]
    fn create_marks_custom_and_generates_id() {
        let mut templates = TemplateCollection::new();
        let created = templates.create(draft()).unwrap();

        assert!(created.is_custom);
        assert!(created.id.starts_with(CUSTOM_ID_PREFIX));
        assert_eq!(templates.list().last(), Some(&created));
    }

    #[test]
    fn create_requires_all_text_fields() {
        let mut templates = TemplateCollection::new();
        for bad in [
            TemplateDraft::new("", "s", "m"),
            TemplateDraft::new("n", " ", "m"),
            TemplateDraft::new("n", "s", ""),
        ] {
            assert!(templates.create(bad).unwrap_err().is_validation());
        }
        assert!(templates.is_empty());
    }

    #[test]
    fn fresh_id_avoids_collisions() {
        let templates =
            TemplateCollection::from_records(vec![custom("custom_42"), custom("custom_42_1")])
                .unwrap();
        assert_eq!(templates.fresh_id(42), "custom_42_2");
        assert_eq!(templates.fresh_id(43), "custom_43");
    }

    #[test]
    fn update_preserves_id_and_flag() {
        let mut templates =
            TemplateCollection::from_records(vec![built_in("payment_due"), custom("custom_1")])
                .unwrap();

        let updated = templates
            .update("payment_due", TemplateDraft::new("Due", "Payment due", "Pay [AMOUNT]"))
            .unwrap();
        assert_eq!(updated.id, "payment_due");
        assert!(!updated.is_custom);

        let ids: Vec<_> = templates.list().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["payment_due", "custom_1"]);
    }

    #[test]
    fn update_validation_failure_changes_nothing() {
        let mut templates = TemplateCollection::from_records(vec![custom("custom_1")]).unwrap();
        let before = templates.clone();
        assert!(templates
            .update("custom_1", TemplateDraft::new("x", "", "y"))
            .is_err());
        assert_eq!(templates, before);
    }

    #[test]
    fn delete_built_in_is_protected() {
        let mut templates =
            TemplateCollection::from_records(vec![built_in("contract_expiry"), custom("custom_17")])
                .unwrap();

        let err = templates.delete("contract_expiry").unwrap_err();
        assert!(matches!(err, SettingsError::ProtectedRecord { ref id } if id == "contract_expiry"));

        templates.delete("custom_17").unwrap();
        assert!(templates.get("custom_17").is_none());
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn reserved_prefix_is_protected_even_if_custom() {
        let mut templates =
            TemplateCollection::from_records(vec![custom("payment_overdue_v2")]).unwrap();
        assert!(matches!(
            templates.delete("payment_overdue_v2"),
            Err(SettingsError::ProtectedRecord { .. })
        ));
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let mut templates = TemplateCollection::new();
        assert!(matches!(
            templates.delete("custom_1"),
            Err(SettingsError::NotFound { kind: "template", .. })
        ));
    }

    #[test]
    fn placeholders_are_distinct_and_ordered() {
        let template = Template {
            id: "custom_1".into(),
            name: "Reminder".into(),
            subject: "[UNIT_NUMBER] reminder".into(),
            message: "Dear [CUSTOMER_NAME], unit [UNIT_NUMBER] is due on [DUE_DATE]. [not_a_token]"
                .into(),
            is_custom: true,
        };
        assert_eq!(
            template.placeholders(),
            vec!["UNIT_NUMBER", "CUSTOMER_NAME", "DUE_DATE"]
        );
    }

    #[test]
    fn from_records_rejects_duplicate_ids() {
        assert!(
            TemplateCollection::from_records(vec![custom("custom_1"), custom("custom_1")]).is_err()
        );
    }

    #[test]
    fn serializes_is_custom_in_camel_case() {
        let json = serde_json::to_value(custom("custom_1")).unwrap();
        assert_eq!(json["isCustom"], true);
    }
}
