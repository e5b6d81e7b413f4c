//! Unit-size presets
//!
//! Named unit sizes with a rate per unit of area, used to seed pricing. Ids
//! come from a monotonic counter that only advances on a successful create
//! and is never rewound by deletes.

use std::ops::Bound;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Record};
use crate::error::{SettingsError, ValidationError};
use crate::validation::{FieldValue, Fields, RuleSet};

/// Stored unit-size preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Allocated id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Unit area, strictly positive
    pub size: f64,
    /// Price per unit of area, non-negative
    pub rate_per_area: f64,
}

impl Preset {
    /// Editable fields of this preset
    #[must_use]
    pub fn draft(&self) -> PresetDraft {
        PresetDraft {
            name: self.name.clone(),
            size: self.size,
            rate_per_area: self.rate_per_area,
        }
    }

    /// Base price of a unit of this size (`size × ratePerArea`)
    #[inline]
    #[must_use]
    pub fn base_rate(&self) -> f64 {
        self.size * self.rate_per_area
    }
}

impl Record for Preset {
    type Id = u64;
    const KIND: &'static str = "preset";

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// Caller-supplied preset fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDraft {
    /// Display name
    pub name: String,
    /// Unit area
    pub size: f64,
    /// Price per unit of area
    pub rate_per_area: f64,
}

impl PresetDraft {
    /// Create draft
    pub fn new(name: impl Into<String>, size: f64, rate_per_area: f64) -> Self {
        Self {
            name: name.into(),
            size,
            rate_per_area,
        }
    }
}

impl Fields for PresetDraft {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => FieldValue::Text(&self.name),
            "size" => FieldValue::Number(self.size),
            "ratePerArea" => FieldValue::Number(self.rate_per_area),
            _ => FieldValue::Missing,
        }
    }
}

static PRESET_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .required("name")
        .range("size", Bound::Excluded(0.0), Bound::Unbounded)
        .range("ratePerArea", Bound::Included(0.0), Bound::Unbounded)
});

/// Ordered presets plus their id counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetCollection {
    items: Collection<Preset>,
    next_id: u64,
}

impl PresetCollection {
    /// Empty collection starting at id 1
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Collection::new(),
            next_id: 1,
        }
    }

    /// Collection from existing records and counter
    ///
    /// # Errors
    /// Returns [`SettingsError::Validation`] if a record is invalid, ids
    /// repeat, or `next_id` does not exceed every id
    pub fn from_parts(items: Vec<Preset>, next_id: u64) -> Result<Self, SettingsError> {
        let collection = Self {
            items: items.into_iter().collect(),
            next_id,
        };
        collection
            .check_integrity()
            .map_err(|reason| ValidationError::new("unitPresets", reason))?;
        Ok(collection)
    }

    /// Records in insertion order
    pub fn list(&self) -> impl Iterator<Item = &Preset> {
        self.items.iter()
    }

    /// Record with `id`
    #[inline]
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Preset> {
        self.items.get(&id)
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

    /// Id the next create will assign
    #[inline]
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Validate and append a new preset
    ///
    /// # Errors
    /// Returns [`SettingsError::Validation`] on an empty or duplicate name,
    /// `size <= 0`, `ratePerArea < 0`, or when no id is left to assign
    pub fn create(&mut self, draft: PresetDraft) -> Result<Preset, SettingsError> {
        self.validate(&draft, None)?;
        let following = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| ValidationError::new("nextId", "preset ids are exhausted"))?;

        let preset = Preset {
            id: self.next_id,
            name: draft.name.trim().to_string(),
            size: draft.size,
            rate_per_area: draft.rate_per_area,
        };
        self.items.push_back(preset.clone());
        self.next_id = following;
        Ok(preset)
    }

    /// Validate and replace the preset with `id` in place
    ///
    /// # Errors
    /// - [`SettingsError::NotFound`] if no preset has `id`
    /// - [`SettingsError::Validation`] as for [`Self::create`]
    pub fn update(&mut self, id: u64, draft: PresetDraft) -> Result<Preset, SettingsError> {
        if !self.items.contains(&id) {
            return Err(SettingsError::not_found(Preset::KIND, id));
        }
        self.validate(&draft, Some(id))?;

        let preset = Preset {
            id,
            name: draft.name.trim().to_string(),
            size: draft.size,
            rate_per_area: draft.rate_per_area,
        };
        self.items.replace(&id, preset.clone());
        Ok(preset)
    }

    /// Remove the preset with `id`
    ///
    /// # Errors
    /// Returns [`SettingsError::NotFound`] if no preset has `id`
    pub fn delete(&mut self, id: u64) -> Result<Preset, SettingsError> {
        self.items
            .remove(&id)
            .ok_or_else(|| SettingsError::not_found(Preset::KIND, id))
    }

    /// Append a trusted record, keeping the counter ahead of its id
    pub(crate) fn push_unchecked(&mut self, preset: Preset) {
        self.next_id = self.next_id.max(preset.id.saturating_add(1));
        self.items.push_back(preset);
    }

    /// Whether both collections share storage and counter
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.next_id == other.next_id && self.items.ptr_eq(&other.items)
    }

    fn validate(&self, draft: &PresetDraft, own_id: Option<u64>) -> Result<(), SettingsError> {
        PRESET_RULES.validate(draft)?;

        let wanted = normalize(&draft.name);
        let taken = self
            .items
            .iter()
            .any(|p| Some(p.id) != own_id && normalize(&p.name) == wanted);
        if taken {
            return Err(ValidationError::new(
                "name",
                format!("a preset named '{}' already exists", draft.name.trim()),
            )
            .into());
        }
        Ok(())
    }

    /// Check record and counter invariants, describing the first violation
    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        if let Some(id) = self.items.first_duplicate() {
            return Err(format!("duplicate preset id {id}"));
        }
        for preset in self.items.iter() {
            if preset.id >= self.next_id {
                return Err(format!(
                    "preset id {} is not below nextId {}",
                    preset.id, self.next_id
                ));
            }
            PRESET_RULES
                .validate(&preset.draft())
                .map_err(|e| format!("preset {}: {e}", preset.id))?;
        }
        Ok(())
    }
}

impl Default for PresetCollection {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> PresetDraft {
        PresetDraft::new("Small", 25.0, 1.2)
    }

    #[test]
    fn create_assigns_next_id_and_appends() {
        let mut presets = PresetCollection::new();
        let a = presets.create(small()).unwrap();
        let b = presets.create(PresetDraft::new("Large", 100.0, 0.9)).unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(presets.next_id(), 3);
        let names: Vec<_> = presets.list().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Small", "Large"]);
    }

    #[test]
    fn create_enforces_bounds() {
        let mut presets = PresetCollection::new();

        let zero = presets.create(PresetDraft::new("Zero", 0.0, 1.0)).unwrap_err();
        assert!(matches!(zero, SettingsError::Validation(ref e) if e.field == "size"));

        let negative = presets.create(PresetDraft::new("Neg", 10.0, -1.0)).unwrap_err();
        assert!(matches!(negative, SettingsError::Validation(ref e) if e.field == "ratePerArea"));

        let blank = presets.create(PresetDraft::new("  ", 10.0, 1.0)).unwrap_err();
        assert!(matches!(blank, SettingsError::Validation(ref e) if e.field == "name"));

        assert!(presets.is_empty());
        assert_eq!(presets.next_id(), 1, "failed creates must not advance the counter");

        let minimal = presets.create(PresetDraft::new("Locker", 1.0, 0.0)).unwrap();
        assert_eq!(minimal.id, 1);
    }

    #[test]
    fn create_rejects_duplicate_name_case_insensitively() {
        let mut presets = PresetCollection::new();
        presets.create(small()).unwrap();
        let err = presets.create(PresetDraft::new(" small ", 30.0, 1.0)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(presets.len(), 1);
    }

    #[test]
    fn update_replaces_in_place_and_excludes_own_name() {
        let mut presets = PresetCollection::new();
        presets.create(small()).unwrap();
        presets.create(PresetDraft::new("Medium", 50.0, 1.0)).unwrap();
        presets.create(PresetDraft::new("Large", 100.0, 0.9)).unwrap();

        let updated = presets
            .update(2, PresetDraft::new("Medium", 60.0, 1.1))
            .unwrap();
        assert_eq!(updated.id, 2);

        let ids: Vec<_> = presets.list().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(presets.get(2).unwrap().size, 60.0);
        assert_eq!(presets.next_id(), 4);
    }

    #[test]
    fn update_rejects_name_of_other_record() {
        let mut presets = PresetCollection::new();
        presets.create(small()).unwrap();
        presets.create(PresetDraft::new("Large", 100.0, 0.9)).unwrap();

        let err = presets.update(2, small()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(presets.get(2).unwrap().name, "Large");
    }

    #[test]
    fn update_and_delete_unknown_id() {
        let mut presets = PresetCollection::new();
        assert!(matches!(
            presets.update(5, small()),
            Err(SettingsError::NotFound { kind: "preset", .. })
        ));
        assert!(matches!(
            presets.delete(5),
            Err(SettingsError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_never_rewinds_counter() {
        let mut presets =
            PresetCollection::from_parts(vec![Preset {
                id: 1,
                name: "Small".into(),
                size: 25.0,
                rate_per_area: 1.2,
            }], 2)
            .unwrap();

        let created = presets.create(PresetDraft::new("Medium", 50.0, 1.0)).unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(presets.next_id(), 3);

        presets.delete(1).unwrap();
        assert_eq!(presets.next_id(), 3);

        let again = presets.create(PresetDraft::new("Small", 25.0, 1.2)).unwrap();
        assert_eq!(again.id, 3);
    }

    #[test]
    fn create_at_end_of_id_space_fails_without_wrapping() {
        let mut presets = PresetCollection::from_parts(Vec::new(), u64::MAX).unwrap();

        let err = presets.create(small()).unwrap_err();
        assert!(matches!(err, SettingsError::Validation(ref e) if e.field == "nextId"));
        assert!(presets.is_empty());
        assert_eq!(presets.next_id(), u64::MAX);
    }

    #[test]
    fn last_id_before_limit_is_assigned() {
        let mut presets = PresetCollection::from_parts(Vec::new(), u64::MAX - 1).unwrap();

        let preset = presets.create(small()).unwrap();
        assert_eq!(preset.id, u64::MAX - 1);
        assert_eq!(presets.next_id(), u64::MAX);
        assert!(presets.create(PresetDraft::new("Large", 100.0, 0.9)).is_err());
    }

    #[test]
    fn from_parts_checks_counter() {
        let preset = Preset {
            id: 4,
            name: "Small".into(),
            size: 25.0,
            rate_per_area: 1.0,
        };
        assert!(PresetCollection::from_parts(vec![preset.clone()], 4).is_err());
        assert!(PresetCollection::from_parts(vec![preset], 5).is_ok());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut presets = PresetCollection::new();
        presets.create(small()).unwrap();
        let json = serde_json::to_value(&presets).unwrap();
        assert_eq!(json["nextId"], 2);
        assert_eq!(json["items"][0]["ratePerArea"], 1.2);
    }

    #[test]
    fn base_rate_multiplies_size_and_rate() {
        let preset = Preset {
            id: 1,
            name: "Small".into(),
            size: 25.0,
            rate_per_area: 2.0,
        };
        assert_eq!(preset.base_rate(), 50.0);
    }
}
