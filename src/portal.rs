//! The input surface: decides whether an offered file may reach the controller.
//!
//! Only images are accepted, and only while the controller is `Idle` or
//! `Failed`. The controller itself never re-validates what it is handed.

use std::path::Path;

use image::ImageFormat;
use tokio::sync::watch;

use crate::error::CropError;
use crate::gateway::ImageFile;
use crate::state_machine::RitualState;

pub struct Portal {
    state: watch::Receiver<RitualState>,
}

impl Portal {
    pub fn new(state: watch::Receiver<RitualState>) -> Self {
        Self { state }
    }

    /// Whether the controller is ready for a new file.
    pub fn is_open(&self) -> bool {
        self.state.borrow().accepts_input()
    }

    /// Accept `file` for submission, or refuse it.
    pub fn offer(&self, file: ImageFile) -> Result<ImageFile, CropError> {
        let state = *self.state.borrow();
        if !state.accepts_input() {
            return Err(CropError::PortalClosed(state));
        }
        if !file.mime.starts_with("image/") {
            return Err(CropError::NotAnImage(file.mime));
        }
        Ok(file)
    }

    /// Read `path` from disk and offer it.
    ///
    /// The MIME type comes from the extension, falling back to sniffing the
    /// first bytes of the content.
    pub fn offer_path(&self, path: &Path) -> Result<ImageFile, CropError> {
        let state = *self.state.borrow();
        if !state.accepts_input() {
            return Err(CropError::PortalClosed(state));
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let mime = detect_mime(path, &bytes);
        tracing::debug!(%name, %mime, len = bytes.len(), "file offered");

        self.offer(ImageFile::new(name, mime, bytes))
    }
}

fn detect_mime(path: &Path, bytes: &[u8]) -> String {
    ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}
