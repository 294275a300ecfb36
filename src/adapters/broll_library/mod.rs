//! Local cutaway footage library
//!
//! Clips live flat in one directory; a clip matches a keyword when its
//! lowercased file name contains the sanitized keyword and ends in `.mp4`.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::rules::sanitize_keyword;
use crate::ports::*;

/// Directory-backed B-roll lookup
pub struct BrollLibrary {
    root: PathBuf,
}

impl BrollLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn lookup(&self, keyword: &str) -> Result<Option<PathBuf>, DomainError> {
        let needle = sanitize_keyword(keyword);
        if needle.is_empty() || !self.root.is_dir() {
            return Ok(None);
        }

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                DomainError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if name.ends_with(".mp4") && name.to_lowercase().contains(&needle) {
                debug!("B-roll for '{}': {}", keyword, entry.path().display());
                return Ok(Some(entry.into_path()));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl BrollLibraryPort for BrollLibrary {
    async fn find_broll(&self, keyword: &str) -> Result<Option<PathBuf>, DomainError> {
        self.lookup(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_find_broll_matches_first_sorted_mp4() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_Coffee_pour.mp4", "a_coffee.mov", "c_coffee_beans.mp4", "beach.mp4"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("coffee_dir.mp4")).unwrap();

        let library = BrollLibrary::new(dir.path());
        let found = library.find_broll("Coffee").await.unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "b_Coffee_pour.mp4");

        assert!(library.find_broll("mountain").await.unwrap().is_none());
        assert!(library.find_broll("!!").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_broll_missing_directory() {
        let library = BrollLibrary::new("/definitely/not/a/dir");
        assert!(library.find_broll("coffee").await.unwrap().is_none());
    }
}
