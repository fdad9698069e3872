//! Filesystem-backed photo library.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;

use super::{AssetInfo, MediaLibrary, RawAsset};
use crate::{Error, Result};

/// Treats the image files of one directory as the device gallery.
///
/// Photos are ordered by modification time, newest first. A missing
/// directory is an empty gallery.
#[derive(Debug, Clone)]
pub struct DirectoryMediaLibrary {
    root: PathBuf,
}

impl DirectoryMediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn list_images(&self) -> Result<Vec<(SystemTime, PathBuf)>> {
        if !fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut images = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_image_path(&path) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            images.push((modified, path));
        }

        images.sort_by(|(left_time, left_path), (right_time, right_path)| {
            right_time
                .cmp(left_time)
                .then_with(|| left_path.cmp(right_path))
        });
        Ok(images)
    }
}

#[async_trait]
impl MediaLibrary for DirectoryMediaLibrary {
    async fn recent_photos(&self, offset: usize, count: usize) -> Result<Vec<RawAsset>> {
        let images = self.list_images().await?;
        Ok(images
            .into_iter()
            .skip(offset)
            .take(count)
            .map(|(_, path)| RawAsset {
                id: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                uri: path.display().to_string(),
            })
            .collect())
    }

    async fn asset_info(&self, asset: &RawAsset) -> Result<AssetInfo> {
        let local = fs::canonicalize(&asset.uri).await.map_err(|error| {
            Error::Platform(format!("cannot resolve gallery asset {}: {error}", asset.uri))
        })?;
        Ok(AssetInfo {
            local_uri: Some(local.display().to_string()),
        })
    }
}

fn is_image_path(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first_raw()
        .is_some_and(|mime| mime.starts_with("image/"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn touch(dir: &Path, name: &str, age_secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, b"jpeg").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[tokio::test]
    async fn lists_images_newest_first() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "old.jpg", 300);
        touch(temp.path(), "new.png", 10);
        touch(temp.path(), "middle.jpeg", 100);
        touch(temp.path(), "notes.txt", 1);

        let library = DirectoryMediaLibrary::new(temp.path());
        let photos = library.recent_photos(0, 10).await.unwrap();

        let ids = photos.iter().map(|asset| asset.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["new.png", "middle.jpeg", "old.jpg"]);
    }

    #[tokio::test]
    async fn pages_with_offset() {
        let temp = tempfile::tempdir().unwrap();
        for (index, name) in ["a.jpg", "b.jpg", "c.jpg"].iter().enumerate() {
            touch(temp.path(), name, (index as u64 + 1) * 10);
        }

        let library = DirectoryMediaLibrary::new(temp.path());
        let page = library.recent_photos(1, 5).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "b.jpg");
    }

    #[tokio::test]
    async fn missing_directory_is_empty_gallery() {
        let temp = tempfile::tempdir().unwrap();
        let library = DirectoryMediaLibrary::new(temp.path().join("nope"));

        assert!(library.recent_photos(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn asset_info_resolves_canonical_path() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "pier.jpg", 0);
        let library = DirectoryMediaLibrary::new(temp.path());

        let asset = library.recent_photos(0, 1).await.unwrap().remove(0);
        let info = library.asset_info(&asset).await.unwrap();

        let expected = std::fs::canonicalize(temp.path().join("pier.jpg")).unwrap();
        assert_eq!(info.local_uri, Some(expected.display().to_string()));
    }

    #[tokio::test]
    async fn asset_info_fails_for_vanished_file() {
        let library = DirectoryMediaLibrary::new("/tmp");
        let asset = RawAsset {
            id: "gone.jpg".to_string(),
            uri: "/definitely/not/here/gone.jpg".to_string(),
        };

        assert!(library.asset_info(&asset).await.is_err());
    }
}
