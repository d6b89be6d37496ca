//! Error types for repo-retention

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, RetentionError>;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Failed to build package cache for repository '{repository}'{}: {message}",
        status.as_ref().map(|s| format!(" of status '{}'", s)).unwrap_or_default()
    )]
    CacheBuild {
        /// Status the repository belongs to, once known
        status: Option<String>,
        repository: String,
        message: String,
        #[source]
        source: Option<CatalogError>,
    },

    #[error("Failed to remove '{}' from filesystem: {source}", path.display())]
    FilesystemRemoval {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog {operation} failed: {source}")]
    CatalogMaintenance {
        operation: String,
        #[source]
        source: CatalogError,
    },

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: String, to: String },

    #[error(
        "Invalid user '{actual}' (expected '{expected}'). \
         Use --force-invalid-user to run as the current user"
    )]
    InvalidUser { expected: String, actual: String },
}

impl RetentionError {
    pub fn cache_build(repository: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CacheBuild {
            status: None,
            repository: repository.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attach the owning status to a cache-build error
    pub fn in_status(mut self, name: &str) -> Self {
        if let Self::CacheBuild { status, .. } = &mut self {
            *status = Some(name.to_string());
        }
        self
    }

    pub fn severity(&self) -> Severity {
        match self {
            RetentionError::FilesystemRemoval { .. } | RetentionError::CatalogMaintenance { .. } => {
                Severity::Recoverable
            }
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Whether an error aborts the run or is logged and skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run
    Fatal,
    /// Log and continue
    Recoverable,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Recoverable => "recoverable",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// The catalog command could not be started
    Spawn,
    /// The catalog command exited unsuccessfully
    Command,
    /// The catalog answered with something unusable
    InvalidOutput,
}

impl CatalogErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogErrorKind::Spawn => "spawn",
            CatalogErrorKind::Command => "command",
            CatalogErrorKind::InvalidOutput => "invalid_output",
        }
    }
}

impl fmt::Display for CatalogErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned by catalog collaborators
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct CatalogError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: CatalogErrorKind,
    pub message: String,
}

impl CatalogError {
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn spawn(command: impl Into<String>, err: std::io::Error) -> Self {
        Self::new(
            CatalogErrorKind::Spawn,
            format!("Failed to run '{}': {}", command.into(), err),
        )
        .with_source(err)
    }

    pub fn command(command: impl Into<String>, status: Option<i32>, stderr: &str) -> Self {
        let status = status.map_or_else(|| "signal".to_string(), |code| code.to_string());
        Self::new(
            CatalogErrorKind::Command,
            format!(
                "'{}' exited with {}: {}",
                command.into(),
                status,
                stderr.trim()
            ),
        )
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::InvalidOutput, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cache_build_is_fatal() {
        let err = RetentionError::cache_build("stable-main", "invalid response: []");
        assert!(err.is_fatal());

        let msg = err.to_string();
        assert!(msg.contains("stable-main"));
        assert!(msg.contains("invalid response"));
    }

    #[test]
    fn test_cache_build_names_status() {
        let err = RetentionError::cache_build("stable-main", "invalid response: []").in_status("stable");
        assert_eq!(
            err.to_string(),
            "Failed to build package cache for repository 'stable-main' of status 'stable': invalid response: []"
        );

        // other errors are left untouched
        let err = RetentionError::InvalidPhaseTransition {
            from: "init".to_string(),
            to: "sweep".to_string(),
        }
        .in_status("stable");
        assert!(matches!(err, RetentionError::InvalidPhaseTransition { .. }));
    }

    #[test]
    fn test_recoverable_errors() {
        let fs_err = RetentionError::FilesystemRemoval {
            path: PathBuf::from("/data/uploads/foo_1.0_amd64.deb"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(fs_err.severity(), Severity::Recoverable);
        assert!(fs_err.to_string().contains("foo_1.0_amd64.deb"));

        let maint = RetentionError::CatalogMaintenance {
            operation: "db cleanup".to_string(),
            source: CatalogError::command("aptly db cleanup", Some(1), "locked\n"),
        };
        assert!(!maint.is_fatal());
        assert!(maint.to_string().contains("db cleanup"));
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::command("aptly repo search stable", Some(2), "  no such repo \n");
        assert_eq!(err.kind, CatalogErrorKind::Command);
        assert_eq!(
            err.to_string(),
            "[command] 'aptly repo search stable' exited with 2: no such repo"
        );
    }

    #[test]
    fn test_catalog_error_source_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "aptly not found");
        let err = CatalogError::spawn("aptly", io_err);

        assert_eq!(err.kind, CatalogErrorKind::Spawn);
        let source = err.source().unwrap();
        assert!(source.to_string().contains("aptly not found"));
    }

    #[test]
    fn test_severity_as_str() {
        assert_eq!(Severity::Fatal.as_str(), "fatal");
        assert_eq!(Severity::Recoverable.to_string(), "recoverable");
    }
}
