//! Snapshot acquisition.

use super::VisionError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, instrument};

/// One photograph of the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
    media_type: &'static str,
}

impl Frame {
    /// Wraps encoded image bytes.
    pub fn new(bytes: Vec<u8>, media_type: &'static str) -> Self {
        Self { bytes, media_type }
    }

    /// Encoded image.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of the encoding.
    pub fn media_type(&self) -> &'static str {
        self.media_type
    }
}

/// Reads the snapshot file, refreshing it first with an optional command.
#[derive(Debug, Clone)]
pub struct FrameSource {
    image_path: PathBuf,
    command: Vec<String>,
}

impl FrameSource {
    /// Creates a frame source; an empty `command` reads the file as is.
    pub fn new(image_path: PathBuf, command: Vec<String>) -> Self {
        Self {
            image_path,
            command,
        }
    }

    /// Refreshes and reads the snapshot.
    #[instrument(skip(self), fields(path = %self.image_path.display()))]
    pub async fn capture(&self) -> Result<Frame, VisionError> {
        if let Some((program, args)) = self.command.split_first() {
            debug!(%program, "Running capture command");
            let status = Command::new(program)
                .args(args)
                .status()
                .await
                .map_err(|e| VisionError::new(format!("Failed to run {}: {}", program, e)))?;
            if !status.success() {
                return Err(VisionError::new(format!(
                    "Capture command {} exited with {}",
                    program, status
                )));
            }
        }

        let bytes = tokio::fs::read(&self.image_path).await.map_err(|e| {
            VisionError::new(format!(
                "Failed to read snapshot {}: {}",
                self.image_path.display(),
                e
            ))
        })?;
        if bytes.is_empty() {
            return Err(VisionError::new("Snapshot file is empty".to_string()));
        }
        Ok(Frame::new(bytes, media_type_of(&self.image_path)))
    }
}

fn media_type_of(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(media_type_of(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(media_type_of(Path::new("a.webp")), "image/webp");
        assert_eq!(media_type_of(Path::new("capture")), "image/png");
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_an_error() {
        let source = FrameSource::new(PathBuf::from("/nonexistent/inkplay.png"), Vec::new());
        let err = source.capture().await.unwrap_err();
        assert!(err.message.contains("Failed to read snapshot"));
    }
}
