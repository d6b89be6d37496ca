//! Configuration validation
//!
//! Range checks for values read from a configuration file. Structural
//! invariants (one status per repository) are enforced by [`StatusTable`]
//! itself and hold for programmatic configs too.
//!
//! [`StatusTable`]: super::StatusTable

use super::error::{ConfigError, ConfigResult};
use super::status::StatusConfig;
use super::RetentionConfig;

pub const MIN_DAYS_TO_LIVE: u32 = 5;
pub const MIN_MAX_PACKAGES: usize = 5;
pub const MAX_PRIORITY: u32 = 1000;

/// Trait for validatable configuration objects
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;
}

impl Validatable for StatusConfig {
    fn validate(&self) -> ConfigResult<()> {
        let field = |name: &str| format!("statuses.{}.{}", self.name, name);

        if self.priority > MAX_PRIORITY {
            return Err(ConfigError::range_with_hint(
                field("priority"),
                self.priority,
                0,
                MAX_PRIORITY,
                "Higher priority statuses are evaluated first",
            ));
        }

        if self.days_to_live < MIN_DAYS_TO_LIVE {
            return Err(ConfigError::range_with_hint(
                field("days_to_live"),
                self.days_to_live,
                MIN_DAYS_TO_LIVE,
                u32::MAX,
                "Fresh uploads must survive at least a few days",
            ));
        }

        if self.max_packages < MIN_MAX_PACKAGES {
            return Err(ConfigError::range_with_hint(
                field("max_packages"),
                self.max_packages,
                MIN_MAX_PACKAGES,
                usize::MAX,
                "Keep enough recent versions to roll back",
            ));
        }

        if self.repositories.is_empty() {
            return Err(ConfigError::empty(
                field("repo_list"),
                "List at least one aptly repository",
            ));
        }

        Ok(())
    }
}

impl Validatable for RetentionConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.statuses.is_empty() {
            return Err(ConfigError::empty(
                "statuses",
                "Declare at least one status section",
            ));
        }

        if self.search_dirs.is_empty() {
            return Err(ConfigError::empty(
                "repo_info.search_dirs",
                "Artifacts are located through these directories",
            ));
        }

        for dir in &self.search_dirs {
            let pattern = dir.to_string_lossy();
            glob::Pattern::new(&pattern).map_err(|source| ConfigError::Pattern {
                field: "repo_info.search_dirs".to_string(),
                pattern: pattern.to_string(),
                source,
            })?;
        }

        if self.aptly_bin.trim().is_empty() {
            return Err(ConfigError::empty(
                "repo_info.aptly_bin",
                "Omit the field to use 'aptly' from PATH",
            ));
        }

        for status in &self.statuses {
            status.validate()?;
        }

        Ok(())
    }
}
