//! Cross-repository matching rule
//!
//! A version may leave a repository only if no *other* repository at an
//! equal or higher priority still lists that exact version string. Lower
//! tiers never block. Version strings are compared for equality only.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::VersionCache;
use crate::config::{StatusConfig, StatusTable};
use crate::policy::RetentionClock;

/// Why a removal was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker<'a> {
    /// The artifact is not old enough for its status
    TooRecent,
    /// Another repository still lists the version
    Referenced { repository: &'a str, status: &'a str },
    /// A repository that could hold the version was never cached
    NotCached { repository: &'a str },
}

pub struct MatchingRule<'a> {
    statuses: &'a StatusTable,
    cache: &'a VersionCache,
    clock: &'a RetentionClock,
}

impl<'a> MatchingRule<'a> {
    pub fn new(statuses: &'a StatusTable, cache: &'a VersionCache, clock: &'a RetentionClock) -> Self {
        Self {
            statuses,
            cache,
            clock,
        }
    }

    /// Whether `version` of `package` may be removed from `from_repo`
    pub fn may_remove(
        &self,
        from_status: &StatusConfig,
        from_repo: &str,
        package: &str,
        version: &str,
        modified: DateTime<Utc>,
    ) -> bool {
        match self.blocker(from_status, from_repo, package, version, modified) {
            None => true,
            Some(Blocker::TooRecent) => false,
            Some(Blocker::Referenced { repository, .. }) => {
                debug!(
                    "package {} ({}) from {} matched in {}",
                    package, version, from_repo, repository
                );
                false
            }
            Some(Blocker::NotCached { repository }) => {
                warn!(
                    "package {} ({}) from {} kept: repository {} is not cached",
                    package, version, from_repo, repository
                );
                false
            }
        }
    }

    /// First reason found that forbids the removal, if any
    pub fn blocker(
        &self,
        from_status: &StatusConfig,
        from_repo: &str,
        package: &str,
        version: &str,
        modified: DateTime<Utc>,
    ) -> Option<Blocker<'a>> {
        if !self.clock.is_outdated(modified, from_status) {
            return Some(Blocker::TooRecent);
        }

        let cutoff = from_status.priority;
        for status in self
            .statuses
            .iter()
            .take_while(|status| status.priority >= cutoff)
        {
            for repository in &status.repositories {
                if repository == from_repo && status.priority == cutoff {
                    continue;
                }

                if !self.cache.is_populated(repository) {
                    return Some(Blocker::NotCached { repository });
                }

                let Some(record) = self.cache.lookup(repository, package) else {
                    continue;
                };

                if record.contains(version) {
                    return Some(Blocker::Referenced {
                        repository,
                        status: &status.name,
                    });
                }
            }
        }

        None
    }
}
