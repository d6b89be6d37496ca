//! Test data builders

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use repo_retention::config::{RetentionConfig, StatusConfig, StatusTable};
use repo_retention::domain::ArtifactFile;
use repo_retention::policy::RetentionClock;

pub const UPLOADS: &str = "/data/uploads";

/// Fixed "now" for every scenario
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn clock() -> RetentionClock {
    RetentionClock::at(now())
}

/// `<dir>/<package>_<version>_amd64.deb`, `age_days` old
pub fn artifact(dir: &str, package: &str, version: &str, age_days: i64, size: u64) -> ArtifactFile {
    let path = Path::new(dir).join(format!("{}_{}_amd64.deb", package, version));
    ArtifactFile::new(path, now() - Duration::days(age_days), size)
}

pub fn upload_path(package: &str, version: &str) -> PathBuf {
    Path::new(UPLOADS).join(format!("{}_{}_amd64.deb", package, version))
}

/// Config over `statuses`, searching `/data/uploads` (deep scan on)
pub fn config(statuses: Vec<StatusConfig>) -> RetentionConfig {
    RetentionConfig::new(
        StatusTable::new(statuses).unwrap(),
        vec![PathBuf::from(UPLOADS)],
    )
}

/// status a (priority 10, keep 2, 5 days) holding repo "stable",
/// status b (priority 20) holding repo "testing"
pub fn two_tier_config() -> RetentionConfig {
    config(vec![
        StatusConfig::new("a", 10)
            .days_to_live(5)
            .max_packages(2)
            .repository("stable"),
        StatusConfig::new("b", 20)
            .days_to_live(5)
            .max_packages(2)
            .repository("testing"),
    ])
}
