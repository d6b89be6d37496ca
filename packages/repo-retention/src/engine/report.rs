use std::path::PathBuf;

const MIB: f64 = 1024.0 * 1024.0;

/// One package version removed (or, under dry-run, selected for removal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub status: String,
    pub repository: String,
    pub package: String,
    pub version: String,
    pub path: PathBuf,
    /// First removal of this version from the repository; false for further
    /// on-disk copies of an artifact already handled
    pub version_removed: bool,
    /// The catalog accepted the removal
    pub catalog_removed: bool,
    /// The artifact file was deleted
    pub file_removed: bool,
}

/// Outcome of a retention run
#[derive(Debug, Clone, Default)]
pub struct RetentionReport {
    pub removals: Vec<Removal>,
    /// Only accumulated in calculate mode
    pub reclaimed_bytes: u64,
    pub published: Vec<String>,
    pub catalog_failures: usize,
    pub filesystem_failures: usize,
    pub maintenance_failures: usize,
    pub dry_run: bool,
}

impl RetentionReport {
    pub fn reclaimed(&self) -> String {
        format_reclaimed(self.reclaimed_bytes)
    }

    /// Distinct package versions dropped from their repositories
    pub fn removed_version_count(&self) -> usize {
        self.removals.iter().filter(|r| r.version_removed).count()
    }

    /// (repository, package, version) of every removal, in sweep order
    pub fn removed_versions(&self) -> Vec<(&str, &str, &str)> {
        self.removals
            .iter()
            .map(|r| (r.repository.as_str(), r.package.as_str(), r.version.as_str()))
            .collect()
    }
}

/// `12.500 MBs`, or `GBs` above 1024 MB
pub fn format_reclaimed(bytes: u64) -> String {
    let mut amount = bytes as f64 / MIB;
    let mut unit = "MBs";
    if amount > 1024.0 {
        amount /= 1024.0;
        unit = "GBs";
    }
    format!("{:.3} {}", amount, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_reclaimed(0), "0.000 MBs");
        assert_eq!(format_reclaimed(1024 * 1024 * 5 / 2), "2.500 MBs");
        assert_eq!(format_reclaimed(1024 * 1024 * 1024), "1024.000 MBs");
    }

    #[test]
    fn test_format_gigabytes() {
        assert_eq!(format_reclaimed(3 * 1024 * 1024 * 1024), "3.000 GBs");
    }
}
