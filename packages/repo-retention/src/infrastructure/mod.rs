//! Concrete collaborators
//!
//! - `FsArtifactScanner`: artifact lookup on the local filesystem
//! - `AptlyCatalog`: shells out to the `aptly` CLI (feature `aptly`)

#[cfg(feature = "aptly")]
mod aptly;
mod fs_scan;

#[cfg(feature = "aptly")]
pub use aptly::{publish_target, AptlyCatalog};
pub use fs_scan::FsArtifactScanner;
