use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::paths::{self, FrameLabel};

/// Where accepted frames end up.
#[async_trait::async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Make sure the camera's location exists. Idempotent.
    async fn ensure_location(&self, camera_id: &str) -> anyhow::Result<()>;

    /// Write a frame, replacing any earlier copy under the same label.
    async fn persist(
        &self,
        camera_id: &str,
        label: &FrameLabel,
        bytes: &[u8],
    ) -> anyhow::Result<PathBuf>;
}

/// `<root>/<camera id>/<label>.jpg` on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl ArchiveStore for DirectoryStore {
    async fn ensure_location(&self, camera_id: &str) -> anyhow::Result<()> {
        let dir = paths::camera_dir(&self.root, camera_id);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create camera directory {}", dir.display()))
    }

    /// The frame is written to a `.part` sibling first and renamed into
    /// place, so an interrupted run never leaves a truncated `.jpg` behind.
    async fn persist(
        &self,
        camera_id: &str,
        label: &FrameLabel,
        bytes: &[u8],
    ) -> anyhow::Result<PathBuf> {
        let path = paths::frame_path(&self.root, camera_id, label);
        let part_path = path.with_extension(format!("{}.part", paths::IMAGE_EXTENSION));

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&part_path)
            .await
            .with_context(|| format!("Failed to open {}", part_path.display()))?;
        file.write_all(bytes)
            .await
            .with_context(|| format!("Failed to write {}", part_path.display()))?;
        file.flush().await?;
        drop(file);

        fs::rename(&part_path, &path)
            .await
            .with_context(|| format!("Failed to move frame into place at {}", path.display()))?;
        Ok(path)
    }
}
