use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::input::{InputMode, Intent};
use crate::model::ScanResult;
use crate::platform::{
    Camera, Clipboard, Notice, Notifier, PermissionPlatform, PermissionStatus, UrlOpener,
};
use crate::scanner::{
    Admission, AttemptTicket, BarcodeDecoder, Completion, DecodeError, DecodeOutcome, Frame,
    FrameReceiver, FrameSupplier, PermissionGate, ScanController, ScanStats, SupplierError,
};

use super::{LinkOutcome, NoticeBoard, PresentationGate};

pub const CAMERA_FAILED: &str = "Failed to start camera. Please try again.";

/// Action to take after handling an intent
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Redraw,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Off,
    Running,
    PermissionNeeded,
    /// Bind failed; retry is possible
    Failed,
    /// The frame source stopped on its own
    Ended,
}

/// Host collaborators a scan session needs
pub struct ScanPlatform<P> {
    pub camera: Box<dyn Camera>,
    pub permission: P,
    pub clipboard: Box<dyn Clipboard>,
    pub opener: Box<dyn UrlOpener>,
}

/// Something that happened while waiting in [`ScanViewModel::next_event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    FrameAdmitted { seq: u64 },
    FrameDropped,
    Decoded(Completion),
    CameraStopped,
}

/// Everything the scan screen renders
#[derive(Debug, Clone)]
pub struct ScanSnapshot {
    pub camera: CameraState,
    pub result: Option<ScanResult>,
    pub can_open_link: bool,
    pub decoding: bool,
    pub notices: Vec<Notice>,
    pub stats: ScanStats,
    pub superseded: u64,
    pub frames_outstanding: u64,
}

/// The scan session.
///
/// Single owner of the camera supplier, the decode controller, the permission
/// and presentation gates and the decode attempt in flight. All state is
/// mutated from the task that calls its methods; decodes run on the blocking
/// pool and their outcomes are applied when `next_event` picks them up.
pub struct ScanViewModel<D, P> {
    controller: ScanController,
    supplier: FrameSupplier,
    receiver: Option<FrameReceiver>,
    decoder: Arc<D>,
    permission: PermissionGate<P>,
    gate: PresentationGate,
    notices: NoticeBoard,
    clipboard: Box<dyn Clipboard>,
    opener: Box<dyn UrlOpener>,
    in_flight: Option<(AttemptTicket, JoinHandle<DecodeOutcome>)>,
    camera: CameraState,
    superseded: u64,
    torn_down: bool,
}

impl<D: BarcodeDecoder, P: PermissionPlatform> ScanViewModel<D, P> {
    pub fn new(platform: ScanPlatform<P>, decoder: Arc<D>) -> Self {
        Self {
            controller: ScanController::new(),
            supplier: FrameSupplier::new(platform.camera),
            receiver: None,
            decoder,
            permission: PermissionGate::new(platform.permission),
            gate: PresentationGate::new(),
            notices: NoticeBoard::new(),
            clipboard: platform.clipboard,
            opener: platform.opener,
            in_flight: None,
            camera: CameraState::Off,
            superseded: 0,
            torn_down: false,
        }
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera
    }

    pub fn presentation(&self) -> Option<&ScanResult> {
        self.gate.current()
    }

    pub fn permission_status(&self) -> PermissionStatus {
        self.permission.status()
    }

    pub fn permission_prompts(&self) -> u32 {
        self.permission.prompts()
    }

    pub fn stats(&self) -> ScanStats {
        self.controller.stats()
    }

    pub fn is_decoding(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Frames replaced before they could be decoded, over all camera runs
    pub fn superseded(&self) -> u64 {
        self.superseded + self.supplier.superseded()
    }

    pub fn frames_issued(&self) -> u64 {
        self.supplier.ledger().issued()
    }

    pub fn frames_outstanding(&self) -> u64 {
        self.supplier.ledger().outstanding()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Drain posted notices, for callers that print them instead of rendering
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take_all()
    }

    pub fn prune_notices(&mut self, now: Instant) {
        self.notices.prune(now);
    }

    pub fn snapshot(&self, now: Instant) -> ScanSnapshot {
        ScanSnapshot {
            camera: self.camera,
            result: self.gate.current().cloned(),
            can_open_link: self.gate.can_open_link(),
            decoding: self.is_decoding(),
            notices: self.notices.active(now).cloned().collect(),
            stats: self.stats(),
            superseded: self.superseded(),
            frames_outstanding: self.frames_outstanding(),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.gate.is_visible() {
            return InputMode::ResultShown;
        }
        match self.camera {
            CameraState::PermissionNeeded => InputMode::PermissionNeeded,
            CameraState::Failed | CameraState::Ended => InputMode::CameraStopped,
            CameraState::Off | CameraState::Running => InputMode::Scanning,
        }
    }

    /// Make sure the camera may be used, prompting once if needed, then start it
    pub async fn start(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        if !self.permission.ensure(&mut self.notices).await.is_granted() {
            self.camera = CameraState::PermissionNeeded;
            return false;
        }
        self.start_camera()
    }

    /// Prompt for camera access again after a denial
    pub async fn request_permission(&mut self) -> PermissionStatus {
        if self.torn_down {
            return self.permission.status();
        }
        let status = self.permission.request(&mut self.notices).await;
        if status.is_granted() && self.camera != CameraState::Running {
            self.start_camera();
        }
        status
    }

    /// Start the camera again after a bind failure or the end of the stream
    pub fn retry_camera(&mut self) -> bool {
        if self.torn_down || self.camera == CameraState::Running {
            return false;
        }
        if !self.permission.is_granted() {
            self.camera = CameraState::PermissionNeeded;
            return false;
        }
        self.start_camera()
    }

    fn start_camera(&mut self) -> bool {
        match self.supplier.start(self.permission.status()) {
            Ok(receiver) => {
                self.receiver = Some(receiver);
                self.camera = CameraState::Running;
                true
            }
            Err(SupplierError::PermissionRequired) => {
                self.camera = CameraState::PermissionNeeded;
                false
            }
            Err(e) => {
                warn!(error = %e, "camera failed to start");
                self.notices.notify(Notice::short(CAMERA_FAILED));
                self.camera = CameraState::Failed;
                false
            }
        }
    }

    /// Wait for the next thing that changes the session.
    ///
    /// While a decode is in flight only its completion is awaited; frames keep
    /// replacing each other in the slot until the controller is idle again.
    /// Returns `None` when there is nothing left to wait for. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        if self.torn_down {
            return None;
        }

        if let Some((ticket, handle)) = self.in_flight.as_mut() {
            let ticket = *ticket;
            let joined = handle.await;
            self.in_flight = None;

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => {
                    warn!(attempt = ticket.id(), "decoder panicked");
                    DecodeOutcome::Error(DecodeError::Panicked)
                }
                Err(_) => DecodeOutcome::Error(DecodeError::Cancelled),
            };
            return Some(self.apply(ticket, outcome));
        }

        let receiver = self.receiver.clone()?;
        match receiver.recv().await {
            Some(frame) => Some(self.admit(frame)),
            None => {
                self.stop_camera();
                self.camera = CameraState::Ended;
                info!("camera stream ended");
                Some(ScanEvent::CameraStopped)
            }
        }
    }

    fn admit(&mut self, frame: Frame) -> ScanEvent {
        match self.controller.offer(frame) {
            Admission::Admitted(attempt) => {
                let ticket = attempt.ticket();
                let seq = attempt.frame().seq();
                let decoder = Arc::clone(&self.decoder);
                let handle = tokio::task::spawn_blocking(move || attempt.run(&*decoder));
                self.in_flight = Some((ticket, handle));
                ScanEvent::FrameAdmitted { seq }
            }
            Admission::Dropped => ScanEvent::FrameDropped,
        }
    }

    fn apply(&mut self, ticket: AttemptTicket, outcome: DecodeOutcome) -> ScanEvent {
        let completion = self.controller.complete(ticket, outcome);
        if let Completion::NewResult(result) = &completion {
            self.gate.show(result.clone());
        }
        ScanEvent::Decoded(completion)
    }

    pub fn copy(&mut self) -> bool {
        let cleared = self.gate.copy(self.clipboard.as_mut(), &mut self.notices);
        if cleared {
            self.controller.forget_last_accepted();
        }
        cleared
    }

    pub fn open_link(&mut self) -> LinkOutcome {
        let outcome = self.gate.open_as_link(self.opener.as_mut(), &mut self.notices);
        if matches!(outcome, LinkOutcome::Opened | LinkOutcome::OpenFailed) {
            self.controller.forget_last_accepted();
        }
        outcome
    }

    pub fn dismiss(&mut self) -> bool {
        let cleared = self.gate.dismiss();
        if cleared {
            self.controller.forget_last_accepted();
        }
        cleared
    }

    /// Handle a user intent and return the action to take
    pub async fn handle_intent(&mut self, intent: Intent) -> Action {
        match intent {
            Intent::Quit => return Action::Quit,
            Intent::Copy => {
                self.copy();
            }
            Intent::OpenLink => {
                self.open_link();
            }
            Intent::Dismiss => {
                self.dismiss();
            }
            Intent::GrantPermission => {
                self.request_permission().await;
            }
            Intent::RetryCamera => {
                self.retry_camera();
            }
        }
        Action::Redraw
    }
}

impl<D, P> ScanViewModel<D, P> {
    /// Stop the camera, ignore the attempt in flight and clear the screen.
    ///
    /// The detached attempt releases its frame as soon as the decoder returns;
    /// its outcome is never applied.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.controller.teardown();
        self.stop_camera();
        if let Some((ticket, _)) = self.in_flight.take() {
            debug!(attempt = ticket.id(), "detached decode attempt");
        }
        self.gate.dismiss();
        self.camera = CameraState::Off;
        info!("scan session torn down");
    }

    fn stop_camera(&mut self) {
        self.superseded += self.supplier.superseded();
        self.supplier.stop();
        self.receiver = None;
    }
}

impl<D, P> Drop for ScanViewModel<D, P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
