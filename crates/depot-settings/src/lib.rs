//! Depot Settings - configuration engine for the storage-facility dashboard
//!
//! A hierarchical, in-memory settings store with:
//! - Path-addressed partial updates over a persistent tree
//! - Dirty tracking against the last committed baseline
//! - Unit-size presets and message templates with validated CRUD
//! - Lossless whole-document JSON export and all-or-nothing import
//!
//! # Example
//!
//! ```rust
//! use depot_settings::prelude::*;
//!
//! # fn example() -> Result<(), SettingsError> {
//! let mut store = SettingsStore::new(EngineConfig::new());
//!
//! store.apply("notifications.email", "smtpHost", "mail.example.com")?;
//! store.create_preset(PresetDraft::new("Locker", 4.0, 3.5))?;
//! assert!(store.is_dirty());
//!
//! let document = store.export();
//! store.commit();
//!
//! let mut copy = SettingsStore::default();
//! copy.import(&document)?;
//! assert_eq!(copy.state(), store.state());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod codec;
pub mod collection;
pub mod config;
pub mod credentials;
pub mod defaults;
pub mod dirty;
pub mod error;
pub mod mutator;
pub mod path;
pub mod presets;
pub mod registry;
pub mod state;
pub mod store;
pub mod templates;
pub mod tree;
pub mod validation;

// Re-exports for convenience
pub use codec::{export, serialize, to_document, Decoder, PRESETS_KEY, TEMPLATES_KEY};
pub use collection::{Collection, Record};
pub use config::{EngineConfig, ImportPolicy, KeyPolicy};
pub use credentials::CredentialChange;
pub use defaults::{default_presets, default_state, default_templates, default_tree};
pub use dirty::DirtyTracker;
pub use error::{BoxError, ParseError, SettingsError, ValidationError};
pub use mutator::PathMutator;
pub use path::{PathError, SettingsPath};
pub use presets::{Preset, PresetCollection, PresetDraft};
pub use registry::{KeyError, KeyRegistry};
pub use state::SettingsState;
pub use store::{PersistenceSink, SettingsStore};
pub use templates::{Template, TemplateCollection, TemplateDraft, BUILT_IN_TEMPLATE_IDS};
pub use tree::{Section, SettingsTree};
pub use validation::{FieldValue, Fields, Rule, RuleSet};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the settings store
    pub use crate::{
        CredentialChange, EngineConfig, ImportPolicy, KeyPolicy, ParseError, PresetDraft,
        SettingsError, SettingsState, SettingsStore, TemplateDraft,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
