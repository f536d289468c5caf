//! Local JSON file and directory source

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{decode_listings, ListingSource, SourceLoad};
use crate::types::{HomescoreError, LoadWarning, Result};

/// Reads listings from a `.json` file, or from every `*.json` file directly
/// inside a directory
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        let name = path.display().to_string();
        Self { path, name }
    }

    /// JSON files of a directory source, sorted by file name
    fn collect_files(&self) -> Vec<PathBuf> {
        let pattern = self.path.join("*.json");
        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| paths.filter_map(|e| e.ok()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    fn fetch_file(path: &Path) -> Result<SourceLoad> {
        let mut bytes = read_locked(path)?;
        decode_listings(&mut bytes).map_err(|e| match e {
            HomescoreError::Parse(msg) => {
                HomescoreError::Parse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    fn fetch_dir(&self) -> Result<SourceLoad> {
        let mut load = SourceLoad::default();
        for file in self.collect_files() {
            match Self::fetch_file(&file) {
                Ok(file_load) => load.extend(file_load),
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "skipping unreadable listing file");
                    load.warnings.push(LoadWarning::UnreadableFile(e.to_string()));
                }
            }
        }

        // Keep the first occurrence of each id; records without an id are kept
        let mut seen: HashSet<String> = HashSet::new();
        let mut deduped = Vec::with_capacity(load.listings.len());
        for listing in load.listings {
            match listing.id.as_deref() {
                Some(id) if !seen.insert(id.to_string()) => {
                    load.warnings.push(LoadWarning::DuplicateId(id.to_string()));
                }
                _ => deduped.push(listing),
            }
        }
        load.listings = deduped;
        Ok(load)
    }
}

impl ListingSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<SourceLoad> {
        if self.path.is_dir() {
            self.fetch_dir()
        } else {
            Self::fetch_file(&self.path)
        }
    }

    fn watch_paths(&self) -> Vec<PathBuf> {
        if self.path.is_dir() {
            // The directory itself changes when files are added or removed
            let mut paths = vec![self.path.clone()];
            paths.extend(self.collect_files());
            paths
        } else {
            vec![self.path.clone()]
        }
    }
}

/// Read a whole file under a shared advisory lock so a concurrent writer
/// holding an exclusive lock is never observed half-written
fn read_locked(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    FileExt::lock_shared(&file)?;

    let mut bytes = Vec::new();
    let read = file.read_to_end(&mut bytes);
    let _ = FileExt::unlock(&file);
    read?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_fetch_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "listings.json", r#"[{"id": "1"}, {"id": "2"}]"#);
        let source = FileSource::new(path.clone());

        let load = source.fetch().unwrap();
        assert_eq!(load.listings.len(), 2);
        assert_eq!(source.watch_paths(), vec![path]);
        assert!(!source.is_remote());
    }

    #[test]
    fn test_fetch_alongside_other_reader() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "listings.json", r#"[{"id": "a"}]"#);

        let reader = File::open(&path).unwrap();
        FileExt::lock_shared(&reader).unwrap();
        let load = FileSource::new(path).fetch().unwrap();
        FileExt::unlock(&reader).unwrap();

        assert_eq!(load.listings.len(), 1);
    }

    #[test]
    fn test_fetch_missing_file() {
        let source = FileSource::new(PathBuf::from("/nonexistent/listings.json"));
        assert!(matches!(source.fetch(), Err(HomescoreError::Io(_))));
    }

    #[test]
    fn test_fetch_invalid_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "[{");
        let err = FileSource::new(path).fetch().unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_fetch_directory_sorted_and_deduped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.json", r#"[{"id": "2", "titre": "second copy"}, {"id": "3"}]"#);
        write(&dir, "a.json", r#"[{"id": "1"}, {"id": "2", "titre": "first copy"}]"#);
        write(&dir, "notes.txt", "not json");

        let load = FileSource::new(dir.path().to_path_buf()).fetch().unwrap();
        let ids: Vec<_> = load.listings.iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(load.listings[1].title.as_deref(), Some("first copy"));
        assert_eq!(load.warnings, vec![LoadWarning::DuplicateId("2".into())]);
    }

    #[test]
    fn test_fetch_directory_skips_broken_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", r#"[{"id": "1"}]"#);
        write(&dir, "b.json", "oops");

        let load = FileSource::new(dir.path().to_path_buf()).fetch().unwrap();
        assert_eq!(load.listings.len(), 1);
        assert_eq!(load.warnings.len(), 1);
        assert!(matches!(load.warnings[0], LoadWarning::UnreadableFile(_)));
    }

    #[test]
    fn test_directory_watch_paths() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", "[]");
        let source = FileSource::new(dir.path().to_path_buf());
        let paths = source.watch_paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], dir.path());
    }

    #[test]
    fn test_directory_keeps_listings_without_id() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", r#"[{"titre": "x"}, {"titre": "y"}]"#);
        let load = FileSource::new(dir.path().to_path_buf()).fetch().unwrap();
        assert_eq!(load.listings.len(), 2);
    }
}
