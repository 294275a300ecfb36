// Import interactor - Copy local media into the upload and music stores

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::*;

/// Where the imported copy landed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedFile {
    pub file_id: String,
    pub filename: String,
    pub path: PathBuf,
}

/// Stores files as `{root}/{file_id}/{filename}` under a fresh uuid
pub struct ImportInteractor {
    upload_dir: PathBuf,
    music_dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl ImportInteractor {
    pub fn new(upload_dir: impl Into<PathBuf>, music_dir: impl Into<PathBuf>, allowed_extensions: Vec<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            music_dir: music_dir.into(),
            allowed_extensions,
        }
    }

    /// Import a source video; only configured extensions are accepted
    pub async fn import_video(&self, source: &Path) -> Result<ImportedFile, DomainError> {
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
            return Err(DomainError::InvalidRequest(format!(
                "Unsupported video type '.{}', allowed: {}",
                extension,
                self.allowed_extensions.join(", ")
            )));
        }
        self.import_into(&self.upload_dir, source).await
    }

    /// Import a background music track
    pub async fn import_music(&self, source: &Path) -> Result<ImportedFile, DomainError> {
        self.import_into(&self.music_dir, source).await
    }

    async fn import_into(&self, root: &Path, source: &Path) -> Result<ImportedFile, DomainError> {
        if !source.is_file() {
            return Err(DomainError::asset_not_found(source));
        }
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| DomainError::MissingInput(format!("{} has no file name", source.display())))?;

        let file_id = Uuid::new_v4().to_string();
        let dir = root.join(&file_id);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&filename);
        let bytes = tokio::fs::copy(source, &path).await?;

        info!(file_id = %file_id, "Imported {} ({} bytes) to {}", filename, bytes, path.display());
        Ok(ImportedFile { file_id, filename, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interactor(root: &Path) -> ImportInteractor {
        ImportInteractor::new(
            root.join("uploads"),
            root.join("bg_music"),
            vec!["mp4".to_string(), "mov".to_string()],
        )
    }

    #[tokio::test]
    async fn test_import_video_layout() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Talk.MP4");
        std::fs::write(&source, b"video").unwrap();

        let imported = interactor(dir.path()).import_video(&source).await.unwrap();
        assert_eq!(imported.filename, "Talk.MP4");
        assert_eq!(
            imported.path,
            dir.path().join("uploads").join(&imported.file_id).join("Talk.MP4")
        );
        assert_eq!(std::fs::read(&imported.path).unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_import_rejects_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"text").unwrap();

        let err = interactor(dir.path()).import_video(&source).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_import_music_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = interactor(dir.path())
            .import_music(&dir.path().join("absent.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AssetNotFound { .. }));
    }
}
