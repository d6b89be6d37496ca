//! Age and count eligibility predicates

use chrono::{DateTime, Utc};

use crate::config::StatusConfig;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// The single "now" a run judges every artifact against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionClock {
    now: DateTime<Utc>,
}

impl RetentionClock {
    /// Capture the current time
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Whole days since `timestamp`, rounded down
    pub fn age_in_days(&self, timestamp: DateTime<Utc>) -> i64 {
        (self.now - timestamp)
            .num_seconds()
            .div_euclid(SECONDS_PER_DAY)
    }

    /// Older than the status's `days_to_live`
    pub fn is_outdated(&self, timestamp: DateTime<Utc>, status: &StatusConfig) -> bool {
        self.age_in_days(timestamp) > i64::from(status.days_to_live)
    }
}

impl Default for RetentionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// At most `max_packages` versions: nothing to clean
pub fn within_quota(version_count: usize, status: &StatusConfig) -> bool {
    version_count <= status.max_packages
}
