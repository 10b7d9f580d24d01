use std::path::PathBuf;

/// Camera binding and capture failures
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("no camera source at {}", .0.display())]
    NotFound(PathBuf),

    #[error("camera source {} contains no images", .0.display())]
    Empty(PathBuf),

    #[error("camera is already in use")]
    Busy,

    #[error("camera is not bound")]
    NotBound,

    #[error("capture failed: {0}")]
    Capture(String),
}

/// Failures of the clipboard and URL-open boundaries
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("could not open {url}: {reason}")]
    Open { url: String, reason: String },
}
