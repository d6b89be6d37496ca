//! Artifact files no repository references
//!
//! Builds the same version cache as the retention engine, then lists every
//! `.deb` under the search directories and keeps the ones whose
//! (package, version) appears in no cached repository at all.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::cache::VersionCache;
use crate::config::RetentionConfig;
use crate::domain::{name_and_version, ArtifactFile, ArtifactScanner, Catalog};
use crate::engine::format_reclaimed;
use crate::error::{Result, RetentionError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanOptions {
    /// Delete orphaned files
    pub remove: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OrphanReport {
    /// Sorted by path
    pub orphans: Vec<ArtifactFile>,
    pub total_bytes: u64,
    pub removed: usize,
    pub failures: usize,
}

impl OrphanReport {
    pub fn total(&self) -> String {
        format_reclaimed(self.total_bytes)
    }
}

pub struct OrphanFinder<'a> {
    config: &'a RetentionConfig,
    catalog: &'a dyn Catalog,
    scanner: &'a dyn ArtifactScanner,
    options: OrphanOptions,
    cache: VersionCache,
}

impl<'a> OrphanFinder<'a> {
    pub fn new(
        config: &'a RetentionConfig,
        catalog: &'a dyn Catalog,
        scanner: &'a dyn ArtifactScanner,
        options: OrphanOptions,
    ) -> Self {
        Self {
            config,
            catalog,
            scanner,
            options,
            cache: VersionCache::for_statuses(&config.statuses),
        }
    }

    pub fn build_cache(&mut self) -> Result<()> {
        let config = self.config;
        for (status, repository) in config.statuses.repositories() {
            self.cache
                .ensure_populated(repository, self.catalog)
                .map_err(|e| e.in_status(&status.name))?;
        }
        Ok(())
    }

    /// Unreferenced artifacts across all search directories
    pub fn find(&self) -> Vec<ArtifactFile> {
        // the same file can be reached from overlapping search dirs
        let mut files: BTreeMap<PathBuf, ArtifactFile> = BTreeMap::new();
        for dir in &self.config.search_dirs {
            for file in self.scanner.list_artifacts(dir, self.config.deep_scan) {
                files.entry(file.path.clone()).or_insert(file);
            }
        }

        files
            .into_values()
            .filter(|file| match name_and_version(&file.path) {
                Some((package, version)) => !self.cache.references(&package, &version),
                None => {
                    warn!("ignoring unrecognised artifact name {}", file.path.display());
                    false
                }
            })
            .collect()
    }

    pub fn run(mut self) -> Result<OrphanReport> {
        self.build_cache()?;

        let mut report = OrphanReport::default();
        for file in self.find() {
            debug!("package {} is not in cache", file.path.display());
            report.total_bytes += file.size;

            if self.options.remove && !self.options.dry_run {
                match self.scanner.remove_file(&file.path) {
                    Ok(()) => report.removed += 1,
                    Err(source) => {
                        let err = RetentionError::FilesystemRemoval {
                            path: file.path.clone(),
                            source,
                        };
                        warn!("{}", err);
                        report.failures += 1;
                    }
                }
            }
            report.orphans.push(file);
        }

        info!(
            "{} unreferenced artifacts, overall spoiled: {}",
            report.orphans.len(),
            report.total()
        );
        Ok(report)
    }
}
