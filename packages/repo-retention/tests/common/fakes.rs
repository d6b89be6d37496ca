//! In-memory collaborators
//!
//! `MockCatalog` serves fixed listings and records every call it receives;
//! `MockScanner` serves a fixed set of files and records deletions.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use repo_retention::domain::{ArtifactFile, ArtifactScanner, ArtifactTemplate, Catalog};
use repo_retention::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    List(String),
    Remove {
        repository: String,
        package: String,
        version: String,
    },
    Publish {
        distribution: String,
        repository: String,
    },
    DbCleanup,
}

impl CatalogCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, CatalogCall::List(_))
    }
}

#[derive(Debug, Default)]
pub struct MockCatalog {
    listings: HashMap<String, Vec<String>>,
    unreachable: HashSet<String>,
    fail_remove: bool,
    fail_publish: bool,
    fail_cleanup: bool,
    calls: RefCell<Vec<CatalogCall>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `repository` lists `package` at each of `versions` (amd64)
    pub fn with_versions(mut self, repository: &str, package: &str, versions: &[&str]) -> Self {
        let lines = self.listings.entry(repository.to_string()).or_default();
        lines.extend(
            versions
                .iter()
                .map(|version| format!("{}_{}_amd64", package, version)),
        );
        self
    }

    /// Raw listing lines for `repository`
    pub fn with_lines(mut self, repository: &str, lines: &[&str]) -> Self {
        self.listings
            .entry(repository.to_string())
            .or_default()
            .extend(lines.iter().map(|l| l.to_string()));
        self
    }

    /// Listing `repository` fails outright
    pub fn unreachable(mut self, repository: &str) -> Self {
        self.unreachable.insert(repository.to_string());
        self
    }

    pub fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub fn failing_cleanup(mut self) -> Self {
        self.fail_cleanup = true;
        self
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.borrow().clone()
    }

    pub fn list_calls(&self, repository: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, CatalogCall::List(r) if r == repository))
            .count()
    }

    pub fn mutations(&self) -> Vec<CatalogCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    pub fn removed(&self) -> Vec<(String, String, String)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                CatalogCall::Remove {
                    repository,
                    package,
                    version,
                } => Some((repository.clone(), package.clone(), version.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                CatalogCall::Publish { repository, .. } => Some(repository.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: CatalogCall) {
        self.calls.borrow_mut().push(call);
    }

    fn refused(operation: &str) -> CatalogError {
        CatalogError::command(format!("aptly {}", operation), Some(1), "ERROR: refused")
    }
}

impl Catalog for MockCatalog {
    fn list_packages(&self, repository: &str) -> Result<Vec<String>, CatalogError> {
        self.record(CatalogCall::List(repository.to_string()));
        if self.unreachable.contains(repository) {
            return Err(Self::refused("repo search"));
        }
        Ok(self.listings.get(repository).cloned().unwrap_or_default())
    }

    fn remove_version(
        &self,
        repository: &str,
        package: &str,
        version: &str,
    ) -> Result<(), CatalogError> {
        self.record(CatalogCall::Remove {
            repository: repository.to_string(),
            package: package.to_string(),
            version: version.to_string(),
        });
        if self.fail_remove {
            return Err(Self::refused("repo remove"));
        }
        Ok(())
    }

    fn publish(&self, distribution: &str, repository: &str) -> Result<(), CatalogError> {
        self.record(CatalogCall::Publish {
            distribution: distribution.to_string(),
            repository: repository.to_string(),
        });
        if self.fail_publish {
            return Err(Self::refused("publish update"));
        }
        Ok(())
    }

    fn db_cleanup(&self) -> Result<(), CatalogError> {
        self.record(CatalogCall::DbCleanup);
        if self.fail_cleanup {
            return Err(Self::refused("db cleanup"));
        }
        Ok(())
    }
}

/// Files "on disk" without a disk
#[derive(Debug, Default)]
pub struct MockScanner {
    files: Vec<ArtifactFile>,
    failing: HashSet<PathBuf>,
    removed: RefCell<Vec<PathBuf>>,
}

impl MockScanner {
    pub fn new(files: Vec<ArtifactFile>) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    /// Deleting `path` fails with permission denied
    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.borrow().clone()
    }

    fn present(&self) -> Vec<ArtifactFile> {
        let removed = self.removed.borrow();
        self.files
            .iter()
            .filter(|file| !removed.contains(&file.path))
            .cloned()
            .collect()
    }

    fn is_under(file: &ArtifactFile, dir: &Path, deep: bool) -> bool {
        let Some(parent) = file.path.parent() else {
            return false;
        };
        parent == dir || (deep && parent.parent() == Some(dir))
    }
}

impl ArtifactScanner for MockScanner {
    fn find_candidates<'a>(
        &'a self,
        dir: &'a Path,
        template: &'a ArtifactTemplate,
        versions: &'a [String],
        deep: bool,
    ) -> Box<dyn Iterator<Item = ArtifactFile> + 'a> {
        let present = self.present();
        let mut found = Vec::new();
        for version in versions {
            let file_name = template.file_name(version);
            found.extend(
                present
                    .iter()
                    .filter(|file| Self::is_under(file, dir, deep))
                    .filter(|file| file.path.file_name().is_some_and(|n| n == file_name.as_str()))
                    .cloned(),
            );
        }
        Box::new(found.into_iter())
    }

    fn list_artifacts(&self, dir: &Path, deep: bool) -> Vec<ArtifactFile> {
        self.present()
            .into_iter()
            .filter(|file| Self::is_under(file, dir, deep))
            .filter(|file| file.path.extension().is_some_and(|ext| ext == "deb"))
            .collect()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.failing.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        self.removed.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
