//! Host platform boundaries
//!
//! Everything the scanning core consumes from the outside world goes through
//! the traits in this module:
//!
//! - **Camera**: frame source with a bind/capture/unbind lifecycle
//! - **PermissionPlatform**: camera access check and single-shot request
//! - **Clipboard** / **UrlOpener**: follow-on actions for a decoded payload
//! - **Notifier**: transient and persistent user notices
//!
//! Desktop implementations live in the submodules.

mod browser;
mod camera;
mod clipboard;
mod error;
mod permission;

pub use browser::SystemBrowser;
pub use camera::ImageSequenceCamera;
pub use clipboard::SystemClipboard;
pub use error::{CameraError, PlatformError};
pub use permission::{PromptMode, SettingsPermission};

use image::DynamicImage;

use crate::scanner::Rotation;

/// Image as delivered by the camera driver
pub struct RawFrame {
    pub image: DynamicImage,
    pub rotation: Rotation,
}

/// Result of one capture call
pub enum Capture {
    Frame(RawFrame),
    /// Nothing new yet; the caller may check for shutdown and try again
    Pending,
    /// The source will not produce any more frames
    Ended,
}

/// Camera hardware abstraction.
///
/// `capture` is called from a dedicated capture thread and should not block
/// much longer than one frame interval, so that a stop request is honored promptly.
pub trait Camera: Send + 'static {
    /// Acquire exclusive access to the device
    fn bind(&mut self) -> Result<(), CameraError>;

    fn capture(&mut self) -> Result<Capture, CameraError>;

    /// Release the device. Must be safe to call when not bound.
    fn unbind(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Camera permission as managed by the host platform
#[allow(async_fn_in_trait)]
pub trait PermissionPlatform {
    fn check(&self) -> PermissionStatus;

    /// Show exactly one permission prompt and report the answer
    async fn request(&mut self) -> PermissionStatus;
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError>;
}

pub trait UrlOpener {
    fn open(&mut self, url: &str) -> Result<(), PlatformError>;
}

/// How long a notice stays on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeDuration {
    Short,
    Long,
    /// Stays until withdrawn
    Persistent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: NoticeDuration,
}

impl Notice {
    pub fn short(message: impl Into<String>) -> Self {
        Self { message: message.into(), duration: NoticeDuration::Short }
    }

    pub fn long(message: impl Into<String>) -> Self {
        Self { message: message.into(), duration: NoticeDuration::Long }
    }

    pub fn persistent(message: impl Into<String>) -> Self {
        Self { message: message.into(), duration: NoticeDuration::Persistent }
    }
}

/// Sink for user-visible notices
pub trait Notifier {
    fn notify(&mut self, notice: Notice);

    /// Withdraw notices posted as persistent
    fn withdraw_persistent(&mut self) {}
}
