use crate::common::error::ProvisionError;
use crate::common::result::{IoResultExt, ProvisionResult};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Outcome of a create-if-absent write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provisioned {
    /// The file did not exist and was written
    Created,
    /// The file was already there and was left untouched
    Existed,
}

impl Provisioned {
    pub fn created(&self) -> bool {
        matches!(self, Provisioned::Created)
    }
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// A file written at most once.
///
/// Contents are written to a staging file next to the target and then
/// hard-linked into place, so the target only ever appears complete. The
/// link fails when the target exists: when several runs share one home
/// directory the first writer wins and every later writer sees
/// [`Provisioned::Existed`]. Existing content is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedFile {
    path: PathBuf,
    mode: u32,
}

impl ProvisionedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: 0o644,
        }
    }

    /// Unix permission bits for a newly created file
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }

    /// Write `contents` unless the file already exists.
    pub async fn create(&self, contents: &str) -> ProvisionResult<Provisioned> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_path("Failed to create directory", parent)?;
        }
        if self.exists().await {
            tracing::debug!("{} already exists, skipped", self.path.display());
            return Ok(Provisioned::Existed);
        }

        let staging = self.staging_path();
        let outcome = self.publish(&staging, contents).await;
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", staging.display(), e);
            }
        }
        outcome
    }

    /// `.<name>.<pid>.<seq>.tmp` beside the target
    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }

    async fn publish(&self, staging: &Path, contents: &str) -> ProvisionResult<Provisioned> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(self.mode);

        let mut file = options
            .open(staging)
            .await
            .with_path("Failed to create file", staging)?;
        file.write_all(contents.as_bytes())
            .await
            .with_path("Failed to write file", staging)?;
        file.flush()
            .await
            .with_path("Failed to write file", staging)?;
        drop(file);

        // The umask may have narrowed the mode given to open().
        set_mode(staging, self.mode).await?;

        match tokio::fs::hard_link(staging, &self.path).await {
            Ok(()) => Ok(Provisioned::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("{} already exists, skipped", self.path.display());
                Ok(Provisioned::Existed)
            }
            Err(e) => Err(ProvisionError::filesystem_error_with_source(
                "Failed to create file",
                Some(self.path.clone()),
                e,
            )),
        }
    }
}

#[cfg(unix)]
pub(crate) async fn set_mode(path: &Path, mode: u32) -> ProvisionResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .with_path("Failed to set permissions", path)
}

#[cfg(not(unix))]
pub(crate) async fn set_mode(_path: &Path, _mode: u32) -> ProvisionResult<()> {
    Ok(())
}
