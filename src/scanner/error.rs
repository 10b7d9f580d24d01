use crate::platform::CameraError;

/// Reasons the frame supplier could not start
#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    #[error("camera permission has not been granted")]
    PermissionRequired,

    #[error("could not bind camera: {0}")]
    Bind(#[from] CameraError),

    #[error("camera was lost by an earlier failure")]
    CameraLost,

    #[error("could not start capture thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// Decoder failures. These never reach the user; they count as "no result".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("symbol found but could not be decoded: {0}")]
    Malformed(String),

    #[error("decoder panicked")]
    Panicked,

    #[error("decode task was cancelled")]
    Cancelled,
}
