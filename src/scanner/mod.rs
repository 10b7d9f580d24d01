//! QR code scanning core
//!
//! Turns a live camera feed into a stream of distinct decoded payloads.
//!
//! # Architecture
//!
//! - **frame**: `Frame` values and the `FrameLedger` that accounts for their release
//! - **slot**: keep-only-latest handoff between the capture thread and the consumer
//! - **supplier**: owns the camera and its capture thread for the lifetime of a scan
//! - **decoder**: `BarcodeDecoder` trait and the qrism-backed implementation
//! - **controller**: single in-flight decode slot and duplicate suppression
//! - **permission**: camera authorization gate
//!
//! The pieces are wired together by `viewmodel::ScanViewModel`, which runs
//! decodes off the UI task and applies their results on it.

mod controller;
mod decoder;
mod error;
mod frame;
mod permission;
mod slot;
mod supplier;

pub use controller::{
    Admission, AttemptTicket, Completion, ControllerState, DecodeAttempt, ScanController, ScanStats,
};
pub use decoder::{BarcodeDecoder, DecodeOutcome, QrismDecoder};
pub use error::{DecodeError, SupplierError};
pub use frame::{Frame, FrameLedger, Rotation};
pub use permission::{PermissionGate, PERMISSION_REQUIRED};
pub use slot::{FrameReceiver, LatestSlot};
pub use supplier::FrameSupplier;
