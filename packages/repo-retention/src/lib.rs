//! Retention-policy enforcement for tiered aptly package repositories
//!
//! Repositories are grouped into *statuses* (release tiers) ordered by
//! priority. A run caches every repository's package listing, then removes
//! versions that are over quota, old enough, and not listed by any other
//! repository at the same or a higher tier.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repo_retention::{AptlyCatalog, EngineOptions, FsArtifactScanner, RetentionConfig, RetentionEngine};
//!
//! let config = RetentionConfig::from_yaml("/etc/repo-retention.yaml")?;
//! let catalog = AptlyCatalog::new(&config.aptly_bin);
//! let scanner = FsArtifactScanner::new();
//!
//! let report = RetentionEngine::new(&config, &catalog, &scanner, EngineOptions::new()).run()?;
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod infrastructure;
pub mod matching;
pub mod orphans;
pub mod policy;

pub use cache::VersionCache;
pub use config::{ConfigError, RetentionConfig, StatusConfig, StatusTable};
pub use domain::{ArtifactFile, ArtifactScanner, ArtifactTemplate, Catalog};
pub use engine::{EngineOptions, RetentionEngine, RetentionReport, RunPhase};
pub use error::{CatalogError, Result, RetentionError, Severity};
pub use matching::{Blocker, MatchingRule};
pub use orphans::{OrphanFinder, OrphanOptions, OrphanReport};
pub use policy::RetentionClock;

#[cfg(feature = "aptly")]
pub use infrastructure::AptlyCatalog;
pub use infrastructure::FsArtifactScanner;
