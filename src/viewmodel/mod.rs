mod notices;
mod presentation;
mod scan_viewmodel;

pub use notices::NoticeBoard;
pub use presentation::{LinkOutcome, PresentationGate, COPIED, COPY_FAILED, NOT_A_LINK, OPEN_FAILED};
pub use scan_viewmodel::{
    Action, CameraState, ScanEvent, ScanPlatform, ScanSnapshot, ScanViewModel, CAMERA_FAILED,
};
