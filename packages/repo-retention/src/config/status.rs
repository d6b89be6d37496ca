//! Retention tiers and their priority ordering

use std::collections::HashMap;

use super::error::{ConfigError, ConfigResult};
use super::io::DEFAULT_DISTRIBUTION;

/// A named retention tier
///
/// Repositories inherit the priority and thresholds of the status that lists
/// them.
///
/// # Examples
///
/// ```rust
/// use repo_retention::config::StatusConfig;
///
/// let stable = StatusConfig::new("stable", 100)
///     .days_to_live(30)
///     .max_packages(5)
///     .repository("stable-main");
/// assert_eq!(stable.repositories, vec!["stable-main".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    pub name: String,
    /// Higher priority is evaluated first and retains more strongly
    pub priority: u32,
    /// Minimum artifact age in whole days before it may be removed
    pub days_to_live: u32,
    /// Newest versions per package that are always kept
    pub max_packages: usize,
    /// Cached for matching, never cleaned
    pub reference_only: bool,
    /// Used when publishing the status's repositories
    pub distribution: String,
    pub repositories: Vec<String>,
}

impl StatusConfig {
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            days_to_live: 5,
            max_packages: 5,
            reference_only: false,
            distribution: DEFAULT_DISTRIBUTION.to_string(),
            repositories: Vec::new(),
        }
    }

    pub fn days_to_live(mut self, days: u32) -> Self {
        self.days_to_live = days;
        self
    }

    pub fn max_packages(mut self, max: usize) -> Self {
        self.max_packages = max;
        self
    }

    pub fn reference_only(mut self, reference_only: bool) -> Self {
        self.reference_only = reference_only;
        self
    }

    pub fn distribution(mut self, distribution: impl Into<String>) -> Self {
        self.distribution = distribution.into();
        self
    }

    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repositories.push(repository.into());
        self
    }

    pub fn repositories<I, S>(mut self, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repositories
            .extend(repositories.into_iter().map(Into::into));
        self
    }
}

/// Statuses in evaluation order
///
/// Sorted by priority descending; equal priorities fall back to the status
/// name, descending, so iteration is total and repeatable. Every repository
/// maps to exactly one status.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    statuses: Vec<StatusConfig>,
    by_name: HashMap<String, usize>,
    by_repository: HashMap<String, usize>,
}

impl StatusTable {
    pub fn new(mut statuses: Vec<StatusConfig>) -> ConfigResult<Self> {
        statuses.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.name.cmp(&a.name))
        });

        let mut by_name = HashMap::with_capacity(statuses.len());
        let mut by_repository = HashMap::new();

        for (idx, status) in statuses.iter().enumerate() {
            if by_name.insert(status.name.clone(), idx).is_some() {
                return Err(ConfigError::DuplicateStatus(status.name.clone()));
            }

            for repo in &status.repositories {
                if let Some(prev) = by_repository.insert(repo.clone(), idx) {
                    let (first, second) = if prev == idx {
                        (status.name.clone(), status.name.clone())
                    } else {
                        (statuses[prev].name.clone(), status.name.clone())
                    };
                    return Err(ConfigError::DuplicateRepository {
                        repository: repo.clone(),
                        first,
                        second,
                    });
                }
            }
        }

        Ok(Self {
            statuses,
            by_name,
            by_repository,
        })
    }

    /// Statuses by descending priority
    pub fn iter(&self) -> std::slice::Iter<'_, StatusConfig> {
        self.statuses.iter()
    }

    pub fn get(&self, name: &str) -> Option<&StatusConfig> {
        self.by_name.get(name).map(|&idx| &self.statuses[idx])
    }

    /// Status owning `repository`
    pub fn status_of(&self, repository: &str) -> Option<&StatusConfig> {
        self.by_repository
            .get(repository)
            .map(|&idx| &self.statuses[idx])
    }

    /// Every (status, repository) pair in evaluation order
    pub fn repositories(&self) -> impl Iterator<Item = (&StatusConfig, &str)> + '_ {
        self.statuses.iter().flat_map(|status| {
            status
                .repositories
                .iter()
                .map(move |repo| (status, repo.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl<'a> IntoIterator for &'a StatusTable {
    type Item = &'a StatusConfig;
    type IntoIter = std::slice::Iter<'a, StatusConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(table: &StatusTable) -> Vec<&str> {
        table.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_priority_descending() {
        let table = StatusTable::new(vec![
            StatusConfig::new("testing", 10).repository("t"),
            StatusConfig::new("stable", 100).repository("s"),
            StatusConfig::new("staging", 50).repository("g"),
        ])
        .unwrap();

        assert_eq!(names(&table), vec!["stable", "staging", "testing"]);
    }

    #[test]
    fn test_equal_priority_order_is_total() {
        let a = StatusTable::new(vec![
            StatusConfig::new("alpha", 10),
            StatusConfig::new("beta", 10),
        ])
        .unwrap();
        let b = StatusTable::new(vec![
            StatusConfig::new("beta", 10),
            StatusConfig::new("alpha", 10),
        ])
        .unwrap();

        assert_eq!(names(&a), names(&b));
        assert_eq!(names(&a), vec!["beta", "alpha"]);
    }

    #[test]
    fn test_repository_lookup() {
        let table = StatusTable::new(vec![
            StatusConfig::new("stable", 100).repositories(["main", "contrib"]),
            StatusConfig::new("testing", 10).repository("unstable"),
        ])
        .unwrap();

        assert_eq!(table.status_of("contrib").unwrap().name, "stable");
        assert_eq!(table.status_of("unstable").unwrap().name, "testing");
        assert!(table.status_of("missing").is_none());

        let pairs: Vec<_> = table
            .repositories()
            .map(|(s, r)| (s.name.as_str(), r))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("stable", "main"),
                ("stable", "contrib"),
                ("testing", "unstable")
            ]
        );
    }

    #[test]
    fn test_repository_in_two_statuses_rejected() {
        let result = StatusTable::new(vec![
            StatusConfig::new("stable", 100).repository("main"),
            StatusConfig::new("testing", 10).repository("main"),
        ]);

        match result {
            Err(ConfigError::DuplicateRepository {
                repository,
                first,
                second,
            }) => {
                assert_eq!(repository, "main");
                assert_eq!(first, "stable");
                assert_eq!(second, "testing");
            }
            other => panic!("expected DuplicateRepository, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_status_rejected() {
        let result = StatusTable::new(vec![
            StatusConfig::new("stable", 100),
            StatusConfig::new("stable", 90),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateStatus(name)) if name == "stable"));
    }
}
