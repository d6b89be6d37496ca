//! Retention engine
//!
//! Drives one run through `Init → CacheBuild → Sweep → Publish → Cleanup →
//! Done`. The cache is built for every repository of every status before
//! the sweep looks at any of them; the phase machine refuses to sweep
//! otherwise.
//!
//! ```rust,ignore
//! let config = RetentionConfig::from_yaml("retention.yaml")?;
//! let catalog = AptlyCatalog::new(&config.aptly_bin);
//! let scanner = FsArtifactScanner::new();
//!
//! let report = RetentionEngine::new(&config, &catalog, &scanner, EngineOptions::new().dry_run(true))
//!     .run()?;
//! println!("{} versions, {}", report.removals.len(), report.reclaimed());
//! ```

mod phase;
mod report;

pub use phase::{PhaseMachine, RunPhase};
pub use report::{format_reclaimed, Removal, RetentionReport};

use tracing::{debug, info, warn};

use crate::cache::VersionCache;
use crate::config::{RetentionConfig, StatusConfig};
use crate::domain::{ArtifactFile, ArtifactScanner, ArtifactTemplate, Catalog};
use crate::error::{Result, RetentionError};
use crate::matching::MatchingRule;
use crate::policy::{within_quota, RetentionClock};

/// Side-effect switches for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Decide and log, but mutate nothing
    pub dry_run: bool,
    /// Sum up reclaimable space; implies dry-run
    pub calculate: bool,
    /// Delete artifact files as well as catalog entries
    pub remove_files: bool,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self {
            dry_run: false,
            calculate: false,
            remove_files: true,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn calculate(mut self, calculate: bool) -> Self {
        self.calculate = calculate;
        self
    }

    /// Only remove from the catalog, keep files on disk
    pub fn only_from_repo(mut self, only_from_repo: bool) -> Self {
        self.remove_files = !only_from_repo;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run || self.calculate
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RetentionEngine<'a> {
    config: &'a RetentionConfig,
    catalog: &'a dyn Catalog,
    scanner: &'a dyn ArtifactScanner,
    options: EngineOptions,
    clock: RetentionClock,
    cache: VersionCache,
    phase: PhaseMachine,
    swept: Vec<(&'a StatusConfig, &'a str)>,
    report: RetentionReport,
}

impl<'a> RetentionEngine<'a> {
    pub fn new(
        config: &'a RetentionConfig,
        catalog: &'a dyn Catalog,
        scanner: &'a dyn ArtifactScanner,
        options: EngineOptions,
    ) -> Self {
        if options.is_dry_run() {
            info!("dry-run is active, will not delete anything");
        }

        Self {
            config,
            catalog,
            scanner,
            options,
            clock: RetentionClock::new(),
            cache: VersionCache::for_statuses(&config.statuses),
            phase: PhaseMachine::new(),
            swept: Vec::new(),
            report: RetentionReport {
                dry_run: options.is_dry_run(),
                ..Default::default()
            },
        }
    }

    /// Judge ages against a fixed time instead of the construction time
    pub fn with_clock(mut self, clock: RetentionClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase.current()
    }

    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    pub fn report(&self) -> &RetentionReport {
        &self.report
    }

    pub fn into_report(self) -> RetentionReport {
        self.report
    }

    /// Run every phase and return the report
    pub fn run(mut self) -> Result<RetentionReport> {
        self.build_cache()?;
        self.sweep()?;
        self.publish()?;
        self.cleanup()?;
        Ok(self.report)
    }

    /// Populate the cache for every repository of every status
    pub fn build_cache(&mut self) -> Result<()> {
        self.phase.advance(RunPhase::CacheBuild)?;

        let config = self.config;
        for (status, repository) in config.statuses.repositories() {
            if let Err(e) = self.cache.ensure_populated(repository, self.catalog) {
                self.phase.fail();
                return Err(e.in_status(&status.name));
            }
        }

        debug!(
            "package cache built for {} repositories",
            self.cache.repository_count()
        );
        Ok(())
    }

    /// Remove outdated, unreferenced versions beyond each status's quota
    pub fn sweep(&mut self) -> Result<()> {
        self.phase.advance(RunPhase::Sweep)?;

        let config = self.config;
        for status in &config.statuses {
            if status.reference_only {
                info!(
                    "{} status is reference only, skipping cleanup",
                    status.name
                );
                continue;
            }

            for repository in &status.repositories {
                self.sweep_repository(status, repository);
                self.swept.push((status, repository.as_str()));
                debug!("{}", "-".repeat(20));
            }
        }

        Ok(())
    }

    fn sweep_repository(&mut self, status: &'a StatusConfig, repository: &'a str) {
        let over_quota: Vec<(String, ArtifactTemplate, Vec<String>)> = self
            .cache
            .packages(repository)
            .filter(|(_, record)| !within_quota(record.len(), status))
            .map(|(package, record)| {
                (
                    package.to_string(),
                    ArtifactTemplate::new(package, record.architecture.as_str()),
                    record.removal_candidates(status.max_packages).to_vec(),
                )
            })
            .collect();

        let config = self.config;
        let scanner = self.scanner;
        for (package, template, candidates) in &over_quota {
            debug!(
                "[{}][{}] {}: {} candidate versions",
                status.name,
                repository,
                package,
                candidates.len()
            );

            for dir in &config.search_dirs {
                for file in scanner.find_candidates(dir, template, candidates, config.deep_scan) {
                    self.consider(status, repository, package, file);
                }
            }
        }
    }

    fn consider(&mut self, status: &StatusConfig, repository: &str, package: &str, file: ArtifactFile) {
        let Some(version) = file.version() else {
            debug!("no version in file name {}", file.path.display());
            return;
        };

        let rule = MatchingRule::new(&self.config.statuses, &self.cache, &self.clock);
        if !rule.may_remove(status, repository, package, &version, file.modified) {
            return;
        }

        if self.options.calculate {
            self.report.reclaimed_bytes += file.size;
        }
        self.remove_package(status, repository, package, &version, file);
    }

    fn remove_package(
        &mut self,
        status: &StatusConfig,
        repository: &str,
        package: &str,
        version: &str,
        file: ArtifactFile,
    ) {
        let dry_run = self.options.is_dry_run();

        debug!("repo remove {}, {} ({})", repository, package, version);
        // a second copy of the same artifact only needs its file removed
        let still_cataloged = self.cache.remove_version(repository, package, version);

        let mut catalog_removed = false;
        if still_cataloged && !dry_run {
            match self.catalog.remove_version(repository, package, version) {
                Ok(()) => catalog_removed = true,
                Err(e) => {
                    warn!(
                        "failed to remove {} ({}) from {}: {}",
                        package, version, repository, e
                    );
                    self.report.catalog_failures += 1;
                }
            }
        }

        let mut file_removed = false;
        if self.options.remove_files {
            debug!("removed from fs {}", file.path.display());
            if !dry_run {
                match self.scanner.remove_file(&file.path) {
                    Ok(()) => file_removed = true,
                    Err(source) => {
                        let err = RetentionError::FilesystemRemoval {
                            path: file.path.clone(),
                            source,
                        };
                        warn!("{}", err);
                        self.report.filesystem_failures += 1;
                    }
                }
            }
        }

        self.report.removals.push(Removal {
            status: status.name.clone(),
            repository: repository.to_string(),
            package: package.to_string(),
            version: version.to_string(),
            path: file.path,
            version_removed: still_cataloged,
            catalog_removed,
            file_removed,
        });
    }

    /// Publish every swept repository
    pub fn publish(&mut self) -> Result<()> {
        self.phase.advance(RunPhase::Publish)?;

        let swept = std::mem::take(&mut self.swept);
        for (status, repository) in swept {
            debug!("publishing repo {} ({})", repository, status.distribution);
            if self.options.is_dry_run() {
                self.report.published.push(repository.to_string());
                continue;
            }

            match self.catalog.publish(&status.distribution, repository) {
                Ok(()) => self.report.published.push(repository.to_string()),
                Err(source) => {
                    let err = RetentionError::CatalogMaintenance {
                        operation: format!("publish of {}", repository),
                        source,
                    };
                    warn!("{}", err);
                    self.report.maintenance_failures += 1;
                }
            }
        }

        Ok(())
    }

    /// Catalog database cleanup, then report the reclaimed space
    pub fn cleanup(&mut self) -> Result<()> {
        self.phase.advance(RunPhase::Cleanup)?;

        debug!("db cleanup");
        if !self.options.is_dry_run() {
            if let Err(source) = self.catalog.db_cleanup() {
                let err = RetentionError::CatalogMaintenance {
                    operation: "db cleanup".to_string(),
                    source,
                };
                warn!("{}", err);
                self.report.maintenance_failures += 1;
            }
        }

        self.phase.advance(RunPhase::Done)?;
        info!(
            "removed {} package versions ({} artifacts), overall reclaimed: {}",
            self.report.removed_version_count(),
            self.report.removals.len(),
            self.report.reclaimed()
        );
        Ok(())
    }
}
