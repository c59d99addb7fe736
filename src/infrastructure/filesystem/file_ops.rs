use super::provisioned_file::set_mode;
use crate::common::result::{IoResultExt, ProvisionResult};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

pub async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Remove a directory tree. Returns false when there was nothing to remove.
pub async fn remove_dir(path: &Path) -> ProvisionResult<bool> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_path("Failed to remove directory", path),
    }
}

/// Create a directory (and parents) and set its mode.
pub async fn make_dir(path: &Path, mode: u32) -> ProvisionResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_path("Failed to create directory", path)?;
    set_mode(path, mode).await
}

/// Append to a file, creating it with `mode` when absent.
pub async fn append_file(path: &Path, contents: &str, mode: u32) -> ProvisionResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_path("Failed to create directory", parent)?;
    }
    let existed = exists(path).await;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_path("Failed to open file", path)?;
    file.write_all(contents.as_bytes())
        .await
        .with_path("Failed to write file", path)?;
    file.flush().await.with_path("Failed to write file", path)?;

    if !existed {
        set_mode(path, mode).await?;
    }
    Ok(())
}
