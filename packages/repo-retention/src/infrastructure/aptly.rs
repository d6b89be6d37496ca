use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::domain::{package_reference, Catalog};
use crate::error::CatalogError;

/// Catalog backed by the `aptly` command line tool
#[derive(Debug, Clone)]
pub struct AptlyCatalog {
    bin: PathBuf,
}

impl AptlyCatalog {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Run aptly with `args` and return its stdout
    fn run(&self, args: &[&str]) -> Result<String, CatalogError> {
        let command = format!("{} {}", self.bin.display(), args.join(" "));
        debug!("running '{}'", command);

        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .map_err(|e| CatalogError::spawn(&command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CatalogError::command(&command, output.status.code(), &stderr));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            CatalogError::invalid_output(format!("'{}' printed non UTF-8 output", command))
                .with_source(e)
        })
    }
}

/// Arguments for `aptly publish update` of `repository`
///
/// Repositories are published as `<distribution>-<repository>` unless the
/// name already carries the distribution prefix, in which case the
/// distribution and the repository are passed separately.
pub fn publish_target(distribution: &str, repository: &str) -> String {
    if distribution.is_empty() {
        return repository.to_string();
    }
    if repository.starts_with(&format!("{}-", distribution)) {
        format!("{} {}", distribution, repository)
    } else {
        format!("{}-{}", distribution, repository)
    }
}

impl Catalog for AptlyCatalog {
    fn list_packages(&self, repository: &str) -> Result<Vec<String>, CatalogError> {
        let stdout = self.run(&["repo", "search", repository, "Name"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn remove_version(
        &self,
        repository: &str,
        package: &str,
        version: &str,
    ) -> Result<(), CatalogError> {
        let query = package_reference(package, version);
        self.run(&["repo", "remove", repository, &query])?;
        Ok(())
    }

    fn publish(&self, distribution: &str, repository: &str) -> Result<(), CatalogError> {
        let target = publish_target(distribution, repository);
        let mut args = vec!["publish", "update"];
        args.extend(target.split_whitespace());
        self.run(&args)?;
        Ok(())
    }

    fn db_cleanup(&self) -> Result<(), CatalogError> {
        self.run(&["db", "cleanup", "-verbose"])?;
        Ok(())
    }
}
