//! Private temporary copies of uploaded images.
//!
//! Front ends stage the image before scoring so the user can move or delete
//! the original meanwhile. The copy lives in its own temp directory which is
//! removed when the [`StagedImage`] drops, whether the request finished,
//! failed, timed out or was interrupted.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::error::AdapterError;

#[derive(Debug)]
pub struct StagedImage {
    _dir: TempDir,
    path: PathBuf,
}

impl StagedImage {
    pub fn copy_from(source: &Path) -> Result<Self> {
        if !source.is_file() {
            return Err(AdapterError::image_not_found(source).into());
        }
        let name = source
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| "image".into());

        let dir = tempfile::Builder::new()
            .prefix("ielts-coach-")
            .tempdir()
            .context("failed to create staging directory")?;
        let path = dir.path().join(name);
        std::fs::copy(source, &path).context("failed to stage image")?;

        debug!(staged = %path.display(), "image staged");
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_keeps_name_and_bytes() {
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("chart.png");
        std::fs::write(&src, b"pixels").unwrap();

        let staged = StagedImage::copy_from(&src).unwrap();
        assert_ne!(staged.path(), src.as_path());
        assert_eq!(staged.path().file_name().unwrap(), "chart.png");
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"pixels");
    }

    #[test]
    fn drop_removes_copy() {
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("chart.jpg");
        std::fs::write(&src, b"pixels").unwrap();

        let staged = StagedImage::copy_from(&src).unwrap();
        let copy = staged.path().to_path_buf();
        assert!(copy.exists());
        drop(staged);
        assert!(!copy.exists());
        assert!(src.exists());
    }

    #[test]
    fn missing_source_is_not_found() {
        let err = StagedImage::copy_from(Path::new("/definitely/not/here.png")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AdapterError>(),
            Some(&AdapterError::ImageNotFound {
                name: "here.png".to_string()
            })
        );
    }
}
