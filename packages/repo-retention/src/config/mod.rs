//! Retention configuration
//!
//! A YAML file (schema v1) describes the global search directories and one
//! section per status:
//!
//! ```yaml
//! version: 1
//! repo_info:
//!   run_user: aptly
//!   search_dirs: [/data/uploads]
//! statuses:
//!   stable:
//!     priority: 100
//!     days_to_live: 30
//!     max_packages: 5
//!     repo_list: [stable-main]
//!   testing:
//!     priority: 10
//!     days_to_live: 7
//!     max_packages: 5
//!     repo_list: [testing-main]
//! ```
//!
//! Files are validated on load; configs assembled in code only have to
//! satisfy the structural checks of [`StatusTable`].

pub mod error;
pub mod io;
pub mod status;
pub mod validation;

use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, RepoInfoSection, StatusSection};
pub use status::{StatusConfig, StatusTable};
pub use validation::Validatable;

use crate::error::{Result, RetentionError};

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Validated configuration consumed by the engine and the orphan finder
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub statuses: StatusTable,
    pub search_dirs: Vec<PathBuf>,
    /// Scan `<dir>/*/` in addition to `<dir>/`
    pub deep_scan: bool,
    pub run_user: Option<String>,
    pub aptly_bin: String,
}

impl RetentionConfig {
    pub fn new(statuses: StatusTable, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            statuses,
            search_dirs,
            deep_scan: true,
            run_user: None,
            aptly_bin: io::DEFAULT_APTLY_BIN.to_string(),
        }
    }

    pub fn with_deep_scan(mut self, deep_scan: bool) -> Self {
        self.deep_scan = deep_scan;
        self
    }

    pub fn with_run_user(mut self, user: impl Into<String>) -> Self {
        self.run_user = Some(user.into());
        self
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: ConfigFileV1) -> ConfigResult<Self> {
        match file.version {
            None => return Err(ConfigError::MissingVersion),
            Some(found) if !SUPPORTED_VERSIONS.contains(&found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                })
            }
            Some(_) => {}
        }

        let statuses = file
            .statuses
            .into_iter()
            .map(|(name, section)| StatusConfig {
                name,
                priority: section.priority,
                days_to_live: section.days_to_live,
                max_packages: section.max_packages,
                reference_only: section.reference_only,
                distribution: section.distribution,
                repositories: section.repo_list,
            })
            .collect();

        let config = Self {
            statuses: StatusTable::new(statuses)?,
            search_dirs: file.repo_info.search_dirs,
            deep_scan: file.repo_info.deep_scan,
            run_user: file.repo_info.run_user,
            aptly_bin: file.repo_info.aptly_bin,
        };
        config.validate()?;
        Ok(config)
    }

    /// Refuse to run as anyone but the configured user unless forced
    pub fn check_run_user(&self, current: Option<&str>, force: bool) -> Result<()> {
        let Some(expected) = self.run_user.as_deref() else {
            return Ok(());
        };
        if force || current == Some(expected) {
            return Ok(());
        }
        Err(RetentionError::InvalidUser {
            expected: expected.to_string(),
            actual: current.unwrap_or("<unknown>").to_string(),
        })
    }
}

/// Login name of the invoking user, from the environment
pub fn current_user() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()
        .filter(|user| !user.is_empty())
}
