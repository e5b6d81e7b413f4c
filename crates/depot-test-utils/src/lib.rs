//! Testing utilities for the depot settings workspace
//!
//! Shared fixtures for stores, presets and templates.

#![allow(missing_docs)]

use depot_settings::{
    default_templates, default_tree, EngineConfig, Preset, PresetCollection, PresetDraft,
    SettingsState, SettingsStore, Template, TemplateCollection, TemplateDraft,
};

pub const STRONG_PASSWORD: &str = "Str0ng!Passw0rd";

pub fn preset(id: u64, name: &str, size: f64, rate_per_area: f64) -> Preset {
    Preset {
        id,
        name: name.to_string(),
        size,
        rate_per_area,
    }
}

pub fn preset_draft(name: &str) -> PresetDraft {
    PresetDraft::new(name, 50.0, 1.5)
}

pub fn template_draft(name: &str) -> TemplateDraft {
    TemplateDraft::new(
        name,
        "Hello [CUSTOMER_NAME]",
        "Your unit [UNIT_NUMBER] is ready.",
    )
}

pub fn custom_template(id: &str) -> Template {
    Template {
        id: id.to_string(),
        name: format!("Template {id}"),
        subject: "Notice".to_string(),
        message: "Dear [CUSTOMER_NAME]".to_string(),
        is_custom: true,
    }
}

/// Default tree and templates with the given presets and counter
pub fn state_with_presets(presets: Vec<Preset>, next_id: u64) -> SettingsState {
    let presets = PresetCollection::from_parts(presets, next_id).unwrap();
    SettingsState::new(default_tree(), presets, default_templates())
}

/// Default tree and presets with built-in templates followed by `extra`
pub fn state_with_templates(extra: Vec<Template>) -> SettingsState {
    let records = default_templates().list().cloned().chain(extra).collect();
    let templates = TemplateCollection::from_records(records).unwrap();
    let defaults = depot_settings::default_state();
    SettingsState::new(defaults.tree().clone(), defaults.presets().clone(), templates)
}

/// Clean store whose baseline is `state`
pub fn store_with_state(state: SettingsState) -> SettingsStore {
    SettingsStore::with_defaults(EngineConfig::new(), state)
}

pub fn setup_test_store() -> SettingsStore {
    SettingsStore::new(EngineConfig::new())
}

/// Export of `store` parsed back into JSON for structural assertions
pub fn exported_json(store: &SettingsStore) -> serde_json::Value {
    serde_json::from_str(&store.export()).unwrap()
}
