//! Core compatibility checking shared by the CLI and library users.

use serde::Serialize;

use crate::analyzer::rules::{Issue, RulesEngine, Severity};
use crate::config::{Settings, SettingsError};
use crate::db::{Database, DatabaseError};
use crate::model::{CompatibilityStatus, Component, Configuration};

#[derive(Debug, thiserror::Error)]
pub enum PcBuilderError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration {0} not found")]
    ConfigurationNotFound(i64),
}

/// Issue counts per severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

/// Outcome of one compatibility pass over a set of components.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    pub configuration_id: Option<i64>,
    pub configuration_name: Option<String>,
    pub issues: Vec<Issue>,
    pub stats: ReportStats,
}

impl CompatibilityReport {
    fn new(issues: Vec<Issue>) -> Self {
        let stats = issues_to_stats(&issues);
        Self {
            configuration_id: None,
            configuration_name: None,
            issues,
            stats,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }

    pub fn has_warnings_or_errors(&self) -> bool {
        self.stats.errors > 0 || self.stats.warnings > 0
    }

    pub fn total_issues(&self) -> usize {
        self.stats.errors + self.stats.warnings + self.stats.info
    }

    /// Status a caller should record: any error makes the build incompatible,
    /// warnings alone do not.
    pub fn status(&self) -> CompatibilityStatus {
        if self.has_errors() {
            CompatibilityStatus::Incompatible
        } else {
            CompatibilityStatus::Compatible
        }
    }
}

fn issues_to_stats(issues: &[Issue]) -> ReportStats {
    let mut stats = ReportStats::default();
    for issue in issues {
        match issue.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Info => stats.info += 1,
        }
    }
    stats
}

/// Core API used by the CLI.
pub struct PcBuilderCore;

impl PcBuilderCore {
    /// Open the database named in `settings`, loading sample data if asked to.
    pub fn open_database(settings: &Settings) -> Result<Database, PcBuilderError> {
        let db = Database::new(&settings.database_path)?;
        if settings.seed_sample_data {
            db.seed_sample_data()?;
        }
        Ok(db)
    }

    /// Run the rule set over components. Never fails and never touches storage.
    pub fn check_components(components: &[Component]) -> CompatibilityReport {
        let issues = RulesEngine::new().analyze(components);
        CompatibilityReport::new(issues)
    }

    /// Run the rule set over an in-memory configuration.
    pub fn check_configuration(config: &Configuration) -> CompatibilityReport {
        let mut report = Self::check_components(&config.components);
        report.configuration_id = config.id;
        report.configuration_name = Some(config.name.clone());
        report
    }

    /// Load a stored configuration, check it and record the resulting status.
    pub fn check_stored_configuration(
        db: &Database,
        id: i64,
    ) -> Result<CompatibilityReport, PcBuilderError> {
        let config = db
            .get_configuration(id)?
            .ok_or(PcBuilderError::ConfigurationNotFound(id))?;

        let report = Self::check_configuration(&config);
        let status = report.status();
        db.set_compatibility_status(id, status)?;
        tracing::info!(
            id,
            status = %status,
            errors = report.stats.errors,
            warnings = report.stats.warnings,
            "configuration checked"
        );
        Ok(report)
    }
}
