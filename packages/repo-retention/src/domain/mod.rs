//! Domain layer
//!
//! # Domain Models
//!
//! - `PackageEntry`: one `name_version_arch` catalog line
//! - `PackageVersionRecord`: cached versions of a package in one repository
//! - `ArtifactTemplate` / `ArtifactFile`: `.deb` files on disk
//!
//! # Port Traits
//!
//! - `Catalog`: the aptly repository catalog
//! - `ArtifactScanner`: filesystem lookup and deletion of artifacts

mod package;
mod ports;
mod version;

pub use package::{
    name_and_version, package_reference, version_from_name, ArtifactFile, ArtifactTemplate,
    PackageEntry, PackageVersionRecord, ARTIFACT_EXTENSION,
};
pub use ports::{ArtifactScanner, Catalog};
pub use version::compare_versions;
