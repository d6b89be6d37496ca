//! Configuration file schema (YAML v1)
//!
//! Defines YAML schema types only. Conversion into [`RetentionConfig`] lives in
//! `mod.rs` next to validation.
//!
//! [`RetentionConfig`]: super::RetentionConfig

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_APTLY_BIN: &str = "aptly";
pub(crate) const DEFAULT_DISTRIBUTION: &str = "wheezy";

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    pub repo_info: RepoInfoSection,

    /// Status name -> retention parameters
    pub statuses: BTreeMap<String, StatusSection>,
}

/// Global settings shared by every status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoInfoSection {
    /// Only this user may run the cleaner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_user: Option<String>,

    #[serde(default = "default_aptly_bin")]
    pub aptly_bin: String,

    /// Also scan one level of subdirectories
    #[serde(default = "default_deep_scan")]
    pub deep_scan: bool,

    pub search_dirs: Vec<PathBuf>,
}

/// One retention tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusSection {
    pub priority: u32,
    pub days_to_live: u32,
    pub max_packages: usize,

    #[serde(default)]
    pub reference_only: bool,

    #[serde(default = "default_distribution")]
    pub distribution: String,

    pub repo_list: Vec<String>,
}

fn default_aptly_bin() -> String {
    DEFAULT_APTLY_BIN.to_string()
}

fn default_deep_scan() -> bool {
    true
}

fn default_distribution() -> String {
    DEFAULT_DISTRIBUTION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
version: 1
repo_info:
  search_dirs: [/data/uploads]
statuses:
  stable:
    priority: 100
    days_to_live: 30
    max_packages: 5
    repo_list: [stable-main]
"#;
        let file: ConfigFileV1 = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.version, Some(1));
        assert_eq!(file.repo_info.aptly_bin, "aptly");
        assert!(file.repo_info.deep_scan);
        assert!(file.repo_info.run_user.is_none());

        let stable = &file.statuses["stable"];
        assert!(!stable.reference_only);
        assert_eq!(stable.distribution, "wheezy");
        assert_eq!(stable.repo_list, vec!["stable-main".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
version: 1
repo_info:
  search_dirs: [/data/uploads]
statuses:
  stable:
    priority: 100
    days_to_live: 30
    max_packages: 5
    max_age: 3
    repo_list: [stable-main]
"#;
        let result: Result<ConfigFileV1, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
