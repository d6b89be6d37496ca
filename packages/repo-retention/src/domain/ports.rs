//! Collaborator traits consumed by the retention core
//!
//! The engine only talks to the outside world through these two traits.
//! Calls are synchronous and issued one at a time.

use std::path::Path;

use super::package::{ArtifactFile, ArtifactTemplate};
use crate::error::CatalogError;

/// Package repository catalog (aptly)
pub trait Catalog {
    /// All `name_version_arch` lines currently cataloged in `repository`
    fn list_packages(&self, repository: &str) -> Result<Vec<String>, CatalogError>;

    /// Remove one version of a package from `repository`
    fn remove_version(
        &self,
        repository: &str,
        package: &str,
        version: &str,
    ) -> Result<(), CatalogError>;

    /// Publish/update `repository` for `distribution`
    fn publish(&self, distribution: &str, repository: &str) -> Result<(), CatalogError>;

    /// Drop unreferenced files from the catalog's package pool
    fn db_cleanup(&self) -> Result<(), CatalogError>;
}

/// Filesystem access for artifact files
pub trait ArtifactScanner {
    /// Artifact files for `versions` (in the given order) under `dir`
    ///
    /// Looks for `template.file_name(version)` in `dir` and, when `deep` is
    /// set, in each immediate subdirectory of `dir`. Files that do not exist
    /// are skipped.
    fn find_candidates<'a>(
        &'a self,
        dir: &'a Path,
        template: &'a ArtifactTemplate,
        versions: &'a [String],
        deep: bool,
    ) -> Box<dyn Iterator<Item = ArtifactFile> + 'a>;

    /// Every artifact file under `dir` (and its immediate subdirectories when `deep`)
    fn list_artifacts(&self, dir: &Path, deep: bool) -> Vec<ArtifactFile>;

    fn remove_file(&self, path: &Path) -> std::io::Result<()>;
}
