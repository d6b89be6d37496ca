use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::domain::{ArtifactFile, ArtifactScanner, ArtifactTemplate, ARTIFACT_EXTENSION};

/// Artifact lookup on the local filesystem
///
/// A search dir may be a glob pattern (`/srv/*/uploads`); every directory it
/// matches is searched. Only looks one level down: `dir/<file>` and
/// `dir/<sub>/<file>`. Hidden entries are ignored and symlinked
/// subdirectories are followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsArtifactScanner;

impl FsArtifactScanner {
    pub fn new() -> Self {
        Self
    }

    fn walk(dir: &Path, max_depth: usize) -> impl Iterator<Item = DirEntry> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping unreadable entry: {}", e);
                    None
                }
            })
    }

    /// Directories matched by the `dir` pattern, in path order
    fn expand(dir: &Path) -> Vec<PathBuf> {
        let pattern = dir.to_string_lossy();
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("invalid search dir pattern {}: {}", pattern, e);
                return Vec::new();
            }
        };

        let dirs: Vec<PathBuf> = paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!("skipping unreadable match: {}", e);
                    None
                }
            })
            .filter(|path| path.is_dir())
            .collect();
        if dirs.is_empty() {
            debug!("search dir {} matches no directory", pattern);
        }
        dirs
    }

    /// Each matched directory, then its immediate subdirectories when `deep`
    fn search_dirs(dir: &Path, deep: bool) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for base in Self::expand(dir) {
            if deep {
                let subdirs: Vec<PathBuf> = Self::walk(&base, 1)
                    .filter(|e| e.file_type().is_dir())
                    .map(DirEntry::into_path)
                    .collect();
                dirs.push(base);
                dirs.extend(subdirs);
            } else {
                dirs.push(base);
            }
        }
        dirs
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn stat(path: &Path) -> Option<ArtifactFile> {
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    let modified = DateTime::<Utc>::from(metadata.modified().ok()?);
    Some(ArtifactFile::new(path, modified, metadata.len()))
}

impl ArtifactScanner for FsArtifactScanner {
    fn find_candidates<'a>(
        &'a self,
        dir: &'a Path,
        template: &'a ArtifactTemplate,
        versions: &'a [String],
        deep: bool,
    ) -> Box<dyn Iterator<Item = ArtifactFile> + 'a> {
        let dirs = Self::search_dirs(dir, deep);
        Box::new(versions.iter().flat_map(move |version| {
            let file_name = template.file_name(version);
            dirs.iter()
                .filter_map(|d| stat(&d.join(&file_name)))
                .collect::<Vec<_>>()
        }))
    }

    fn list_artifacts(&self, dir: &Path, deep: bool) -> Vec<ArtifactFile> {
        let max_depth = if deep { 2 } else { 1 };
        Self::expand(dir)
            .iter()
            .flat_map(|base| Self::walk(base, max_depth))
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext == ARTIFACT_EXTENSION)
            })
            .filter_map(|e| stat(e.path()))
            .collect()
    }

    fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }
}
