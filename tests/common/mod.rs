// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use image::DynamicImage;
use parking_lot::Mutex;
use qrpocket::platform::{
    Camera, CameraError, Capture, Clipboard, PermissionPlatform, PermissionStatus, PlatformError,
    RawFrame, UrlOpener,
};
use qrpocket::repository::Database;
use qrpocket::scanner::{BarcodeDecoder, DecodeOutcome, Frame, Rotation};
use qrpocket::viewmodel::ScanPlatform;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

pub const WAIT: Duration = Duration::from_secs(5);

/// Create an in-memory test database
pub async fn create_test_db() -> Database {
    Database::new(":memory:").await.unwrap()
}

/// A frame whose width identifies it to `ScriptedDecoder`
pub fn raw_frame(width: u32) -> RawFrame {
    RawFrame { image: DynamicImage::new_luma8(width, 1), rotation: Rotation::Deg0 }
}

/// Poll `condition` until it holds or `WAIT` runs out
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[derive(Debug, Default)]
pub struct CameraCounters {
    pub binds: AtomicUsize,
    pub unbinds: AtomicUsize,
    pub bind_failures: AtomicUsize,
}

/// Camera fed by the test through a channel.
///
/// Captures return `Pending` while the channel is empty and `Ended` once the
/// sending side is dropped.
pub struct ChannelCamera {
    frames: mpsc::Receiver<RawFrame>,
    fail_binds: usize,
    counters: Arc<CameraCounters>,
}

pub struct CameraFeed {
    tx: mpsc::Sender<RawFrame>,
    pub counters: Arc<CameraCounters>,
}

impl CameraFeed {
    pub fn send(&self, width: u32) {
        self.tx.send(raw_frame(width)).unwrap();
    }
}

impl ChannelCamera {
    pub fn new() -> (Self, CameraFeed) {
        Self::failing_binds(0)
    }

    /// The first `failures` bind calls report a busy device
    pub fn failing_binds(failures: usize) -> (Self, CameraFeed) {
        let (tx, frames) = mpsc::channel();
        let counters = Arc::new(CameraCounters::default());
        let camera = Self { frames, fail_binds: failures, counters: Arc::clone(&counters) };
        (camera, CameraFeed { tx, counters })
    }
}

impl Camera for ChannelCamera {
    fn bind(&mut self) -> Result<(), CameraError> {
        if self.fail_binds > 0 {
            self.fail_binds -= 1;
            self.counters.bind_failures.fetch_add(1, Ordering::SeqCst);
            return Err(CameraError::Busy);
        }
        self.counters.binds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn capture(&mut self) -> Result<Capture, CameraError> {
        match self.frames.recv_timeout(Duration::from_millis(5)) {
            Ok(frame) => Ok(Capture::Frame(frame)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(Capture::Pending),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(Capture::Ended),
        }
    }

    fn unbind(&mut self) {
        self.counters.unbinds.fetch_add(1, Ordering::SeqCst);
    }
}

/// Decoder whose outcome is chosen by frame width. Frames with an unknown
/// width decode to `NoSymbol`.
pub struct ScriptedDecoder {
    outcomes: HashMap<u32, DecodeOutcome>,
    permits: Option<Mutex<mpsc::Receiver<()>>>,
    started: Mutex<mpsc::Sender<u64>>,
    decoded: Mutex<Vec<u64>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

/// Test side of a gated `ScriptedDecoder`
pub struct DecoderControl {
    permits: mpsc::Sender<()>,
    started: mpsc::Receiver<u64>,
}

impl DecoderControl {
    /// Sequence number of the next frame the decoder starts on
    pub fn wait_started(&self) -> u64 {
        self.started.recv_timeout(WAIT).expect("decoder was not called")
    }

    /// Let one blocked decode finish
    pub fn permit(&self) {
        self.permits.send(()).unwrap();
    }
}

impl ScriptedDecoder {
    fn build(outcomes: &[(u32, DecodeOutcome)], permits: Option<mpsc::Receiver<()>>) -> (Self, mpsc::Receiver<u64>) {
        let (started_tx, started_rx) = mpsc::channel();
        let decoder = Self {
            outcomes: outcomes.iter().cloned().collect(),
            permits: permits.map(Mutex::new),
            started: Mutex::new(started_tx),
            decoded: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        };
        (decoder, started_rx)
    }

    pub fn new(outcomes: &[(u32, DecodeOutcome)]) -> Arc<Self> {
        Arc::new(Self::build(outcomes, None).0)
    }

    /// Every decode blocks until the test grants a permit
    pub fn gated(outcomes: &[(u32, DecodeOutcome)]) -> (Arc<Self>, DecoderControl) {
        let (permits_tx, permits_rx) = mpsc::channel();
        let (decoder, started) = Self::build(outcomes, Some(permits_rx));
        (Arc::new(decoder), DecoderControl { permits: permits_tx, started })
    }

    /// Sequence numbers of every frame decoded so far
    pub fn decoded(&self) -> Vec<u64> {
        self.decoded.lock().clone()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl BarcodeDecoder for ScriptedDecoder {
    fn decode(&self, frame: &Frame) -> DecodeOutcome {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.decoded.lock().push(frame.seq());
        let _ = self.started.lock().send(frame.seq());

        if let Some(permits) = &self.permits {
            permits.lock().recv_timeout(WAIT).expect("decode was never permitted");
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.outcomes
            .get(&frame.image().width())
            .cloned()
            .unwrap_or(DecodeOutcome::NoSymbol)
    }
}

/// Permission platform answering requests from a script
pub struct FakePermission {
    granted: bool,
    answers: VecDeque<PermissionStatus>,
    pub requests: Arc<AtomicUsize>,
}

impl FakePermission {
    pub fn granted() -> Self {
        Self { granted: true, answers: VecDeque::new(), requests: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn answering(answers: &[PermissionStatus]) -> Self {
        Self {
            granted: false,
            answers: answers.iter().copied().collect(),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PermissionPlatform for FakePermission {
    fn check(&self) -> PermissionStatus {
        if self.granted { PermissionStatus::Granted } else { PermissionStatus::Denied }
    }

    async fn request(&mut self) -> PermissionStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.pop_front().unwrap_or(PermissionStatus::Denied);
        self.granted = answer.is_granted();
        answer
    }
}

#[derive(Clone, Default)]
pub struct FakeClipboard {
    pub text: Arc<Mutex<Option<String>>>,
    pub fail: bool,
}

impl Clipboard for FakeClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        if self.fail {
            return Err(PlatformError::Clipboard("clipboard unavailable".to_string()));
        }
        *self.text.lock() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeOpener {
    pub opened: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl UrlOpener for FakeOpener {
    fn open(&mut self, url: &str) -> Result<(), PlatformError> {
        if self.fail {
            return Err(PlatformError::Open { url: url.to_string(), reason: "no handler".to_string() });
        }
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}

/// Platform bundle with fakes; the returned clipboard and opener share state
/// with the ones inside the bundle.
pub fn fake_platform<C: Camera>(
    camera: C,
    permission: FakePermission,
) -> (ScanPlatform<FakePermission>, FakeClipboard, FakeOpener) {
    let clipboard = FakeClipboard::default();
    let opener = FakeOpener::default();
    let platform = ScanPlatform {
        camera: Box::new(camera),
        permission,
        clipboard: Box::new(clipboard.clone()),
        opener: Box::new(opener.clone()),
    };
    (platform, clipboard, opener)
}
