//! Factory defaults
//!
//! The default tree also defines the closed key set: a
//! [`KeyRegistry`](crate::registry::KeyRegistry) built from it accepts exactly
//! these sections, subsections and fields.

use serde_json::{json, Value as JsonValue};

use crate::presets::{Preset, PresetCollection};
use crate::state::SettingsState;
use crate::templates::{Template, TemplateCollection};
use crate::tree::{section_from_json, SettingsTree};

/// Default settings tree
#[must_use]
pub fn default_tree() -> SettingsTree {
    let document = json!({
        "business": {
            "name": "Storage Depot",
            "email": "office@storage-depot.example",
            "phone": "",
            "address": "",
            "currency": "USD",
            "timezone": "UTC",
            "dateFormat": "YYYY-MM-DD"
        },
        "pricing": {
            "taxRate": 0.0,
            "lateFeeAmount": 25.0,
            "lateFeeGraceDays": 5,
            "depositMonths": 1,
            "prorateFirstMonth": true
        },
        "notifications": {
            "reminderDaysBefore": 3,
            "contractExpiryDaysBefore": 30,
            "email": {
                "enabled": true,
                "smtpHost": "",
                "smtpPort": 587,
                "senderAddress": "",
                "useTls": true
            },
            "sms": {
                "enabled": false,
                "provider": "",
                "senderId": ""
            }
        },
        "appearance": {
            "theme": "light",
            "language": "en",
            "compactTables": false
        },
        "security": {
            "sessionTimeoutMinutes": 30,
            "requireStrongPasswords": true,
            "twoFactorEnabled": false
        }
    });

    let JsonValue::Object(sections) = document else {
        return SettingsTree::new();
    };
    SettingsTree::from_sections(
        sections
            .into_iter()
            .filter_map(|(name, value)| section_from_json(value).map(|s| (name, s))),
    )
}

/// Default unit-size presets
#[must_use]
pub fn default_presets() -> PresetCollection {
    let presets = [
        ("Small (5x5)", 25.0, 2.0),
        ("Medium (5x10)", 50.0, 1.8),
        ("Large (10x10)", 100.0, 1.5),
        ("Extra Large (10x20)", 200.0, 1.25),
    ];
    let mut collection = PresetCollection::new();
    for (id, (name, size, rate_per_area)) in (1_u64..).zip(presets) {
        collection.push_unchecked(Preset {
            id,
            name: name.to_string(),
            size,
            rate_per_area,
        });
    }
    collection
}

/// Built-in message templates
#[must_use]
pub fn default_templates() -> TemplateCollection {
    let built_ins = [
        (
            "contract_expiry",
            "Contract expiry",
            "Your contract for unit [UNIT_NUMBER] expires soon",
            "Dear [CUSTOMER_NAME],\n\nYour rental contract for unit [UNIT_NUMBER] \
             expires on [EXPIRY_DATE]. Please contact us to renew.\n\n[FACILITY_NAME]",
        ),
        (
            "payment_due",
            "Payment due",
            "Payment due for unit [UNIT_NUMBER]",
            "Dear [CUSTOMER_NAME],\n\nA payment of [AMOUNT] for unit [UNIT_NUMBER] \
             is due on [DUE_DATE].\n\n[FACILITY_NAME]",
        ),
        (
            "payment_overdue",
            "Payment overdue",
            "Overdue payment for unit [UNIT_NUMBER]",
            "Dear [CUSTOMER_NAME],\n\nYour payment of [AMOUNT] for unit [UNIT_NUMBER] \
             was due on [DUE_DATE] and is now overdue. Late fees may apply.\n\n[FACILITY_NAME]",
        ),
    ];
    let mut collection = TemplateCollection::new();
    for (id, name, subject, message) in built_ins {
        collection.push_unchecked(Template {
            id: id.to_string(),
            name: name.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            is_custom: false,
        });
    }
    collection
}

/// Full default state
#[must_use]
pub fn default_state() -> SettingsState {
    SettingsState::new(default_tree(), default_presets(), default_templates())
}
