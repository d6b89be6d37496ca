//! Package records and artifact naming

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Extension of every artifact the cleaner manages
pub const ARTIFACT_EXTENSION: &str = "deb";

/// One catalog entry, as listed by `aptly repo search <repo> Name`
///
/// # Examples
///
/// ```rust
/// use repo_retention::domain::PackageEntry;
///
/// let entry = PackageEntry::parse("google-chrome-stable_50.0.0_amd64").unwrap();
/// assert_eq!(entry.name, "google-chrome-stable");
/// assert_eq!(entry.version, "50.0.0");
/// assert_eq!(entry.architecture, "amd64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageEntry {
    pub name: String,
    pub version: String,
    pub architecture: String,
}

impl PackageEntry {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
        }
    }

    /// Parse a `name_version_arch` line
    ///
    /// Returns `None` for lines that do not have exactly three non-empty
    /// underscore-separated fields.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.trim().split('_');
        let name = parts.next().filter(|s| !s.is_empty())?;
        let version = parts.next().filter(|s| !s.is_empty())?;
        let architecture = parts.next().filter(|s| !s.is_empty())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(name, version, architecture))
    }
}

/// Cached versions of one package within one repository
///
/// `versions` is ascending; the newest version is last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionRecord {
    pub architecture: String,
    pub versions: Vec<String>,
}

impl PackageVersionRecord {
    pub fn new(architecture: impl Into<String>) -> Self {
        Self {
            architecture: architecture.into(),
            versions: Vec::new(),
        }
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Versions outside the newest `keep`
    ///
    /// ```rust
    /// use repo_retention::domain::PackageVersionRecord;
    ///
    /// let mut record = PackageVersionRecord::new("amd64");
    /// record.versions = vec!["1".into(), "2".into(), "3".into(), "4".into()];
    /// assert_eq!(record.removal_candidates(2), ["1", "2"]);
    /// assert!(record.removal_candidates(4).is_empty());
    /// ```
    pub fn removal_candidates(&self, keep: usize) -> &[String] {
        let cut = self.versions.len().saturating_sub(keep);
        &self.versions[..cut]
    }
}

/// File name pattern `<package>_<version>_<arch>.deb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTemplate {
    pub package: String,
    pub architecture: String,
}

impl ArtifactTemplate {
    pub fn new(package: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            architecture: architecture.into(),
        }
    }

    pub fn file_name(&self, version: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            self.package, version, self.architecture, ARTIFACT_EXTENSION
        )
    }
}

/// Artifact file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

impl ArtifactFile {
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            path: path.into(),
            modified,
            size,
        }
    }

    pub fn version(&self) -> Option<String> {
        version_from_name(&self.path.to_string_lossy())
    }
}

/// Extract the version from an artifact path or an aptly package reference
///
/// Handles `/data/uploads/foo_1.0_amd64.deb` and `foo (= 1.0)`.
pub fn version_from_name(name: &str) -> Option<String> {
    if let Some(rest) = name.strip_suffix(')') {
        let (_, version) = rest.split_once("(= ")?;
        return Some(version.to_string()).filter(|v| !v.is_empty());
    }

    let file_name = Path::new(name).file_name()?.to_str()?;
    let mut parts = file_name.rsplit('_');
    let _arch = parts.next()?;
    let version = parts.next().filter(|v| !v.is_empty())?;
    let _name = parts.next()?;
    Some(version.to_string())
}

/// Split an artifact file name into (package, version)
pub fn name_and_version(path: &Path) -> Option<(String, String)> {
    let file_name = path.file_name()?.to_str()?;
    let mut parts = file_name.split('_');
    let name = parts.next().filter(|s| !s.is_empty())?;
    let version = parts.next().filter(|s| !s.is_empty())?;
    Some((name.to_string(), version.to_string()))
}

/// aptly package query for a single version
pub fn package_reference(package: &str, version: &str) -> String {
    format!("{} (= {})", package, version)
}
