//! Per-repository package version cache
//!
//! `repository -> (package -> PackageVersionRecord)`, filled from the catalog
//! once per repository and kept for the whole run. Removals made during a
//! sweep are applied to the cache so later matching sees them.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::config::StatusTable;
use crate::domain::{compare_versions, Catalog, PackageEntry, PackageVersionRecord};
use crate::error::{Result, RetentionError};

/// Packages of one repository, ordered by name
pub type RepositoryPackages = BTreeMap<String, PackageVersionRecord>;

#[derive(Debug, Default)]
pub struct VersionCache {
    repositories: HashMap<String, RepositoryPackages>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty entries for every repository of every status
    pub fn for_statuses(statuses: &StatusTable) -> Self {
        let repositories = statuses
            .repositories()
            .map(|(_, repo)| (repo.to_string(), RepositoryPackages::new()))
            .collect();
        Self { repositories }
    }

    /// Fill the entry for `repository` unless it already holds packages
    ///
    /// # Errors
    ///
    /// `RetentionError::CacheBuild` when the catalog call fails or returns no
    /// parseable `name_version_arch` lines. An empty repository is treated
    /// as a broken response.
    pub fn ensure_populated<C>(&mut self, repository: &str, catalog: &C) -> Result<()>
    where
        C: Catalog + ?Sized,
    {
        if self.is_populated(repository) {
            debug!("cache is already generated for repository {}", repository);
            return Ok(());
        }

        debug!("generating package cache for repository {}", repository);
        let lines = catalog
            .list_packages(repository)
            .map_err(|e| RetentionError::CacheBuild {
                status: None,
                repository: repository.to_string(),
                message: "catalog query failed".to_string(),
                source: Some(e),
            })?;

        let mut entries = Vec::with_capacity(lines.len());
        for line in lines.iter().filter(|l| !l.trim().is_empty()) {
            match PackageEntry::parse(line) {
                Some(entry) => entries.push(entry),
                None => warn!(
                    "skipping unparseable catalog line for repository {}: {:?}",
                    repository, line
                ),
            }
        }

        if entries.is_empty() {
            return Err(RetentionError::cache_build(
                repository,
                format!("invalid response: {:?}", lines),
            ));
        }

        let records = group_entries(entries);
        debug!(
            "cached {} packages for repository {}",
            records.len(),
            repository
        );
        self.repositories.insert(repository.to_string(), records);
        Ok(())
    }

    pub fn is_populated(&self, repository: &str) -> bool {
        self.repositories
            .get(repository)
            .is_some_and(|packages| !packages.is_empty())
    }

    pub fn lookup(&self, repository: &str, package: &str) -> Option<&PackageVersionRecord> {
        self.repositories.get(repository)?.get(package)
    }

    /// Packages of `repository` by name; empty if not populated
    pub fn packages(&self, repository: &str) -> impl Iterator<Item = (&str, &PackageVersionRecord)> {
        self.repositories
            .get(repository)
            .into_iter()
            .flat_map(|packages| packages.iter().map(|(name, record)| (name.as_str(), record)))
    }

    /// Drop one occurrence of `version`; returns whether it was cached
    pub fn remove_version(&mut self, repository: &str, package: &str, version: &str) -> bool {
        let Some(record) = self
            .repositories
            .get_mut(repository)
            .and_then(|packages| packages.get_mut(package))
        else {
            return false;
        };

        match record.versions.iter().position(|v| v == version) {
            Some(idx) => {
                record.versions.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether any cached repository still lists `package` at `version`
    pub fn references(&self, package: &str, version: &str) -> bool {
        self.repositories
            .values()
            .filter_map(|packages| packages.get(package))
            .any(|record| record.contains(version))
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }
}

/// Sort by (name, version) and fold each name run into one record
///
/// The architecture of a record is that of the first entry of its run.
fn group_entries(mut entries: Vec<PackageEntry>) -> RepositoryPackages {
    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| compare_versions(&a.version, &b.version))
    });

    let mut records = RepositoryPackages::new();
    for entry in entries {
        records
            .entry(entry.name)
            .or_insert_with(|| PackageVersionRecord::new(entry.architecture))
            .versions
            .push(entry.version);
    }
    records
}
