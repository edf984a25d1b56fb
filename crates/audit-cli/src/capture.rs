//! Capture collaborator for the terminal: the "camera" is a photo file the
//! user already has on disk.

use std::path::PathBuf;

use async_trait::async_trait;

use audit_core::errors::PortError;
use audit_core::ports::{CaptureDevice, CaptureOutcome, Permission};

/// Treats `--photo` as the captured file.
///
/// A missing or unreadable file refuses permission. An empty path is a
/// cancellation.
pub struct FileCapture {
    photo: PathBuf,
}

impl FileCapture {
    #[must_use]
    pub fn new(photo: impl Into<PathBuf>) -> Self {
        Self {
            photo: photo.into(),
        }
    }

    /// A capture device for commands that never capture.
    #[must_use]
    pub fn none() -> Self {
        Self::new(PathBuf::new())
    }

    fn is_cancel(&self) -> bool {
        self.photo.as_os_str().is_empty()
    }
}

#[async_trait]
impl CaptureDevice for FileCapture {
    async fn request_permission(&self) -> Result<Permission, PortError> {
        if self.is_cancel() {
            return Ok(Permission::Granted);
        }
        match tokio::fs::metadata(&self.photo).await {
            Ok(meta) if meta.is_file() => match tokio::fs::File::open(&self.photo).await {
                Ok(_) => Ok(Permission::Granted),
                Err(error) => {
                    tracing::debug!(path = %self.photo.display(), %error, "photo not readable");
                    Ok(Permission::Denied)
                }
            },
            Ok(_) => Ok(Permission::Denied),
            Err(error) => {
                tracing::debug!(path = %self.photo.display(), %error, "photo not found");
                Ok(Permission::Denied)
            }
        }
    }

    async fn capture(&self) -> Result<CaptureOutcome, PortError> {
        if self.is_cancel() {
            return Ok(CaptureOutcome::Cancelled);
        }
        // Stored paths must survive a change of working directory.
        let path = tokio::fs::canonicalize(&self.photo)
            .await
            .map_err(|e| PortError::Io(format!("{}: {e}", self.photo.display())))?;
        Ok(CaptureOutcome::Captured(path))
    }
}
