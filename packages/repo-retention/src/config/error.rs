//! Configuration error types

use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Range validation error
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    /// Required list or string is empty
    #[error("Field '{field}' must not be empty. {hint}")]
    Empty { field: String, hint: String },

    /// Missing version field in YAML
    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    /// Unsupported version
    #[error("Unsupported configuration version {found}. Supported versions: {}", supported.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    /// Same status name declared twice
    #[error("Status '{0}' is declared more than once")]
    DuplicateStatus(String),

    /// A repository may belong to a single status only
    #[error("Repository '{repository}' is listed under both '{first}' and '{second}'")]
    DuplicateRepository {
        repository: String,
        first: String,
        second: String,
    },

    /// Search dir that is not a valid glob pattern
    #[error("Invalid pattern '{pattern}' in '{field}': {source}")]
    Pattern {
        field: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a range error with a hint
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    pub fn empty(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Empty {
            field: field.into(),
            hint: hint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_message() {
        let err = ConfigError::range_with_hint(
            "statuses.stable.priority",
            2000,
            0,
            1000,
            "Priorities are compared across all statuses",
        );
        let msg = err.to_string();
        assert!(msg.contains("statuses.stable.priority"));
        assert!(msg.contains("2000 not in 0..=1000"));
    }

    #[test]
    fn test_unsupported_version_lists_supported() {
        let err = ConfigError::UnsupportedVersion {
            found: 3,
            supported: vec![1],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported configuration version 3. Supported versions: 1"
        );
    }

    #[test]
    fn test_duplicate_repository_message() {
        let err = ConfigError::DuplicateRepository {
            repository: "main".to_string(),
            first: "stable".to_string(),
            second: "testing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Repository 'main' is listed under both 'stable' and 'testing'"
        );
    }
}
