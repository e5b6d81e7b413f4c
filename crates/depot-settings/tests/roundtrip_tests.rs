//! Export/import round-trip properties

use depot_settings::prelude::*;
use depot_test_utils::setup_test_store;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn text() -> impl Strategy<Value = String> {
    "\\PC{0,24}"
}

fn finite() -> impl Strategy<Value = f64> {
    -1.0e9_f64..1.0e9_f64
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn section() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("business".to_string()),
        Just("notifications".to_string()),
        Just("appearance".to_string()),
        key(),
    ]
}

/// Scalars, flat mappings, and mappings that would add a third level
fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        text().prop_map(Value::from),
        finite().prop_map(Value::from),
        prop::collection::btree_map(key(), any::<i32>(), 0..3).prop_map(|m| {
            Value::Object(m.into_iter().map(|(k, v)| (k, json!(v))).collect())
        }),
        (key(), key(), any::<i32>()).prop_map(|(outer, inner, n)| {
            let nested: Map<String, Value> = [(inner, json!(n))].into_iter().collect();
            Value::Object([(outer, Value::Object(nested))].into_iter().collect())
        }),
    ]
}

fn open_store() -> SettingsStore {
    SettingsStore::new(EngineConfig::new().with_key_policy(KeyPolicy::Open))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_export_import_round_trips(
        name in text(),
        tax_rate in finite(),
        grace_days in any::<i32>(),
        sms_enabled in any::<bool>(),
        presets in prop::collection::vec(("[A-Za-z][A-Za-z ]{0,12}", 0.001_f64..1.0e6, 0.0_f64..1.0e3), 0..6),
        templates in prop::collection::vec((text(), text(), text()), 0..4),
        deletes in prop::collection::vec(1_u64..10, 0..3),
    ) {
        let mut store = setup_test_store();
        store.apply("business", "name", name).unwrap();
        store.apply("pricing", "taxRate", tax_rate).unwrap();
        store.apply("pricing", "lateFeeGraceDays", grace_days).unwrap();
        store.apply("notifications.sms", "enabled", sms_enabled).unwrap();

        for (i, (preset_name, size, rate)) in presets.into_iter().enumerate() {
            // duplicates are rejected; the store must stay consistent either way
            let _ = store.create_preset(PresetDraft::new(format!("{preset_name} {i}"), size, rate));
        }
        for id in deletes {
            let _ = store.delete_preset(id);
        }
        for (name, subject, message) in templates {
            let _ = store.create_template(TemplateDraft::new(name, subject, message));
        }

        let mut copy = setup_test_store();
        copy.import(&store.export()).unwrap();
        prop_assert_eq!(copy.state(), store.state());

        let mut compact = SettingsStore::new(EngineConfig::new().with_pretty_export(false));
        compact.import_bytes(&store.serialize()).unwrap();
        prop_assert_eq!(compact.state(), store.state());
    }

    #[test]
    fn prop_open_policy_edits_round_trip(
        edits in prop::collection::vec((section(), prop::option::of(key()), key(), value()), 1..8),
    ) {
        let mut store = open_store();
        for (section, subsection, field, value) in edits {
            let path = match subsection {
                Some(sub) => format!("{section}.{sub}"),
                None => section,
            };
            let nested = value
                .as_object()
                .is_some_and(|m| m.values().any(Value::is_object));
            let result = store.apply(&path, &field, value);
            if nested {
                prop_assert!(result.is_err(), "third-level mapping accepted at {path}.{field}");
            }
        }

        let mut copy = open_store();
        copy.import(&store.export()).unwrap();
        prop_assert_eq!(copy.state(), store.state());
    }

    #[test]
    fn prop_failed_import_is_atomic(garbage in "\\PC{0,64}") {
        let mut store = setup_test_store();
        store.apply("appearance", "theme", "dark").unwrap();
        let before = store.state().clone();

        if store.import(&garbage).is_err() {
            prop_assert!(store.state().ptr_eq(&before));
            prop_assert!(store.is_dirty());
        }
    }
}
