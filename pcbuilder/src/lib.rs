//! PC Builder - component catalog and compatibility checking library
//!
//! This library keeps a catalog of PC components in SQLite, assembles them
//! into named configurations, and checks configurations for the classic
//! build mistakes: CPU/motherboard socket mismatch, unsupported memory,
//! a motherboard that does not fit the case, and an undersized power supply.
//!
//! # Quick Start
//!
//! ```no_run
//! use pcbuilder::{Database, PcBuilderCore};
//! use std::path::Path;
//!
//! let db = Database::new(Path::new("pc_configurator.db")).unwrap();
//! db.seed_sample_data().unwrap();
//!
//! let config = db.create_configuration("Office PC", &[1, 3, 5]).unwrap();
//! let report = PcBuilderCore::check_configuration(&config);
//!
//! for issue in &report.issues {
//!     println!("{}", issue);
//! }
//! ```
//!
//! # Features
//!
//! - **Compatibility rules**: socket, memory type, form factor, power supply
//! - **Atomic assembly**: a configuration and its items are stored in one transaction
//! - **Catalog**: component CRUD, search and an inventory report

pub mod analyzer;
pub mod config;
pub mod core;
pub mod db;
pub mod model;

// Re-export main types
pub use crate::analyzer::rules::{Issue, Rule, RuleId, RulesEngine, Severity};
pub use crate::config::{discover_settings, load_settings_from_path, Settings, SettingsError};
pub use crate::core::{CompatibilityReport, PcBuilderCore, PcBuilderError, ReportStats};
pub use crate::db::{Database, DatabaseError, InventoryReport, KindInventory};
pub use crate::model::{CompatibilityStatus, Component, ComponentKind, Configuration, ModelError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CompatibilityReport, CompatibilityStatus, Component, ComponentKind, Configuration,
        Database, Issue, PcBuilderCore, PcBuilderError, RuleId, Severity,
    };
}
