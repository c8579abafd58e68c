//! The export job list.
//!
//! An ordered, path-deduplicated list of source photos. Ingestion accepts
//! individual files, whole directories (non-recursive, filtered to common
//! raster extensions), and mixed drops of both — the seam behind any
//! file-picker or drag-and-drop front end.

use std::path::{Path, PathBuf};

use crate::config::ModelError;

/// Extensions accepted by ingestion, matched case-insensitively.
pub const RASTER_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// True if the path carries one of the accepted raster extensions.
pub fn has_raster_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            RASTER_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Ordered, deduplicated list of photos queued for export.
#[derive(Debug, Clone, Default)]
pub struct JobList {
    jobs: Vec<PathBuf>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single file. Returns false for duplicates and for paths
    /// without a raster extension.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !has_raster_extension(&path) || self.jobs.contains(&path) {
            return false;
        }
        self.jobs.push(path);
        true
    }

    /// Add every raster file directly inside a directory (non-recursive).
    /// Returns the number of newly added files.
    pub fn add_directory(&mut self, dir: &Path) -> Result<usize, ModelError> {
        let entries = std::fs::read_dir(dir).map_err(|e| ModelError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_raster_extension(path))
            .collect();
        // Directory iteration order is filesystem-dependent.
        found.sort();

        let mut added = 0;
        for path in found {
            if self.add_file(path) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Ingest a mixed set of dropped paths: files are taken as-is (subject
    /// to the extension filter), directories are expanded one level.
    /// Returns the number of newly added files.
    pub fn add_dropped(&mut self, paths: &[PathBuf]) -> usize {
        let mut added = 0;
        for path in paths {
            if path.is_dir() {
                match self.add_directory(path) {
                    Ok(n) => added += n,
                    Err(e) => tracing::warn!("Skipping dropped directory: {}", e),
                }
            } else if self.add_file(path.clone()) {
                added += 1;
            }
        }
        added
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.jobs.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.jobs.iter().map(PathBuf::as_path)
    }
}

impl<'a> IntoIterator for &'a JobList {
    type Item = &'a Path;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, PathBuf>, fn(&'a PathBuf) -> &'a Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates_and_non_raster() {
        let mut jobs = JobList::new();
        assert!(jobs.add_file("a.jpg"));
        assert!(!jobs.add_file("a.jpg"));
        assert!(jobs.add_file("b.PNG"));
        assert!(!jobs.add_file("notes.txt"));
        assert!(!jobs.add_file("no_extension"));
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut jobs = JobList::new();
        jobs.add_file("z.jpg");
        jobs.add_file("a.jpg");
        let order: Vec<_> = jobs.iter().collect();
        assert_eq!(order[0], Path::new("z.jpg"));
        assert_eq!(order[1], Path::new("a.jpg"));
    }

    #[test]
    fn directory_scan_is_non_recursive_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("two.tiff"), b"x").unwrap();
        std::fs::write(dir.path().join("skip.txt"), b"x").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("three.png"), b"x").unwrap();

        let mut jobs = JobList::new();
        let added = jobs.add_directory(dir.path()).unwrap();
        assert_eq!(added, 2);
        assert!(jobs.iter().all(|p| p.parent() == Some(dir.path())));
    }

    #[test]
    fn dropped_paths_expand_directories_one_level() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("in_dir.png"), b"x").unwrap();
        let loose = dir.path().join("loose.jpg");
        std::fs::write(&loose, b"x").unwrap();

        let mut jobs = JobList::new();
        let added = jobs.add_dropped(&[dir.path().to_path_buf(), loose.clone()]);
        // loose.jpg sits inside the dropped directory too, so it is already
        // present when the file entry is processed.
        assert_eq!(added, 2);
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let mut jobs = JobList::new();
        assert!(jobs.add_directory(Path::new("/no/such/dir")).is_err());
    }
}
