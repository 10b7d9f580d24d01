use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use tracing::{debug, info, trace, warn};

use crate::platform::{Camera, Capture, PermissionStatus};

use super::{Frame, FrameLedger, FrameReceiver, LatestSlot, SupplierError};

struct Running {
    stop: Arc<AtomicBool>,
    slot: Arc<LatestSlot>,
    thread: JoinHandle<Option<Box<dyn Camera>>>,
}

/// Owns the camera and pushes its captures into a keep-only-latest slot.
///
/// While running, the camera lives on a dedicated capture thread. Stopping
/// (explicitly or by dropping the supplier) joins that thread, unbinds the
/// camera and releases any frame still waiting in the slot.
pub struct FrameSupplier {
    camera: Option<Box<dyn Camera>>,
    running: Option<Running>,
    ledger: Arc<FrameLedger>,
    stack_size: Option<usize>,
}

impl FrameSupplier {
    pub fn new(camera: Box<dyn Camera>) -> Self {
        Self {
            camera: Some(camera),
            running: None,
            ledger: FrameLedger::new(),
            stack_size: None,
        }
    }

    #[cfg(test)]
    fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn ledger(&self) -> Arc<FrameLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Receiver for the current run, if the supplier is running
    pub fn receiver(&self) -> Option<FrameReceiver> {
        self.running
            .as_ref()
            .map(|running| FrameReceiver::new(Arc::clone(&running.slot)))
    }

    /// Frames replaced in the slot during the current run
    pub fn superseded(&self) -> u64 {
        self.running.as_ref().map(|r| r.slot.superseded()).unwrap_or(0)
    }

    /// Bind the camera and start capturing.
    ///
    /// Binding happens on the caller's thread so that a busy or missing device
    /// is reported here and no frame is ever produced.
    pub fn start(&mut self, permission: PermissionStatus) -> Result<FrameReceiver, SupplierError> {
        if let Some(receiver) = self.receiver() {
            return Ok(receiver);
        }
        if !permission.is_granted() {
            return Err(SupplierError::PermissionRequired);
        }

        let mut camera = self.camera.take().ok_or(SupplierError::CameraLost)?;
        if let Err(e) = camera.bind() {
            self.camera = Some(camera);
            return Err(SupplierError::Bind(e));
        }

        let stop = Arc::new(AtomicBool::new(false));
        let slot = LatestSlot::new();
        let (handoff, pickup) = mpsc::sync_channel::<Box<dyn Camera>>(1);
        let spawned = {
            let stop = Arc::clone(&stop);
            let slot = Arc::clone(&slot);
            let ledger = Arc::clone(&self.ledger);
            let mut builder = std::thread::Builder::new().name("qrpocket-camera".to_string());
            if let Some(bytes) = self.stack_size {
                builder = builder.stack_size(bytes);
            }
            builder.spawn(move || {
                let camera = pickup.recv().ok()?;
                Some(capture_loop(camera, &slot, &stop, &ledger))
            })
        };

        // The camera only leaves this thread once the capture thread exists
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                warn!(error = %e, "could not spawn capture thread");
                camera.unbind();
                self.camera = Some(camera);
                return Err(SupplierError::Thread(e));
            }
        };
        if let Err(mpsc::SendError(mut camera)) = handoff.send(camera) {
            camera.unbind();
            self.camera = Some(camera);
            let _ = thread.join();
            return Err(SupplierError::Thread(std::io::Error::other(
                "capture thread exited before receiving the camera",
            )));
        }

        info!("camera started");
        self.running = Some(Running { stop, slot: Arc::clone(&slot), thread });
        Ok(FrameReceiver::new(slot))
    }

    /// Stop capturing and release the camera. No-op when not running.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.stop.store(true, Ordering::Release);
        running.slot.shutdown();

        match running.thread.join() {
            Ok(Some(camera)) => self.camera = Some(camera),
            Ok(None) | Err(_) => warn!("capture thread panicked, camera is no longer available"),
        }
        info!("camera stopped");
    }
}

impl Drop for FrameSupplier {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop(
    mut camera: Box<dyn Camera>,
    slot: &LatestSlot,
    stop: &AtomicBool,
    ledger: &Arc<FrameLedger>,
) -> Box<dyn Camera> {
    let mut seq = 0u64;
    while !stop.load(Ordering::Acquire) {
        match camera.capture() {
            Ok(Capture::Frame(raw)) => {
                seq += 1;
                let frame = Frame::new(seq, raw.image, raw.rotation, ledger);
                if slot.offer(frame) {
                    trace!(seq, "replaced unconsumed frame");
                }
            }
            Ok(Capture::Pending) => {}
            Ok(Capture::Ended) => {
                debug!(frames = seq, "camera stream ended");
                break;
            }
            Err(e) => {
                warn!(error = %e, "capture failed, stopping camera");
                break;
            }
        }
    }
    camera.unbind();
    slot.close();
    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{CameraError, RawFrame};
    use crate::scanner::Rotation;
    use image::DynamicImage;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        binds: AtomicUsize,
        unbinds: AtomicUsize,
    }

    /// Produces `frames` captures, then ends
    struct CountingCamera {
        frames: u64,
        produced: u64,
        fail_bind: bool,
        counters: Arc<Counters>,
    }

    impl CountingCamera {
        fn new(frames: u64) -> (Self, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            let camera = Self { frames, produced: 0, fail_bind: false, counters: Arc::clone(&counters) };
            (camera, counters)
        }
    }

    impl Camera for CountingCamera {
        fn bind(&mut self) -> Result<(), CameraError> {
            if self.fail_bind {
                return Err(CameraError::Busy);
            }
            self.counters.binds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn capture(&mut self) -> Result<Capture, CameraError> {
            if self.produced >= self.frames {
                return Ok(Capture::Ended);
            }
            self.produced += 1;
            std::thread::sleep(Duration::from_millis(1));
            Ok(Capture::Frame(RawFrame {
                image: DynamicImage::new_luma8(1, 1),
                rotation: Rotation::Deg0,
            }))
        }

        fn unbind(&mut self) {
            self.counters.unbinds.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_start_requires_permission() {
        let (camera, counters) = CountingCamera::new(1);
        let mut supplier = FrameSupplier::new(Box::new(camera));

        let result = supplier.start(PermissionStatus::Denied);
        assert!(matches!(result, Err(SupplierError::PermissionRequired)));
        assert_eq!(counters.binds.load(Ordering::SeqCst), 0);
        assert!(!supplier.is_running());
    }

    #[test]
    fn test_bind_failure_keeps_camera() {
        let (mut camera, _) = CountingCamera::new(1);
        camera.fail_bind = true;
        let mut supplier = FrameSupplier::new(Box::new(camera));

        let result = supplier.start(PermissionStatus::Granted);
        assert!(matches!(result, Err(SupplierError::Bind(CameraError::Busy))));
        assert_eq!(supplier.ledger().issued(), 0);

        // Still owned, so a retry reaches the camera again
        let retry = supplier.start(PermissionStatus::Granted);
        assert!(matches!(retry, Err(SupplierError::Bind(_))));
    }

    #[tokio::test]
    async fn test_stream_end_closes_slot() {
        let (camera, counters) = CountingCamera::new(3);
        let mut supplier = FrameSupplier::new(Box::new(camera));
        let receiver = supplier.start(PermissionStatus::Granted).unwrap();

        let mut received = 0;
        while let Some(frame) = receiver.recv().await {
            received += 1;
            drop(frame);
        }
        assert!(received >= 1);

        supplier.stop();
        assert_eq!(counters.unbinds.load(Ordering::SeqCst), 1);
        let ledger = supplier.ledger();
        assert_eq!(ledger.issued(), 3);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_drop_stops_and_releases() {
        let (camera, counters) = CountingCamera::new(u64::MAX);
        let mut supplier = FrameSupplier::new(Box::new(camera));
        supplier.start(PermissionStatus::Granted).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let ledger = supplier.ledger();
        drop(supplier);

        assert_eq!(counters.unbinds.load(Ordering::SeqCst), 1);
        assert!(ledger.issued() > 0);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_restart_after_stop() {
        let (camera, counters) = CountingCamera::new(u64::MAX);
        let mut supplier = FrameSupplier::new(Box::new(camera));

        supplier.start(PermissionStatus::Granted).unwrap();
        supplier.stop();
        supplier.start(PermissionStatus::Granted).unwrap();
        assert!(supplier.is_running());
        supplier.stop();

        assert_eq!(counters.binds.load(Ordering::SeqCst), 2);
        assert_eq!(counters.unbinds.load(Ordering::SeqCst), 2);
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_spawn_failure_unbinds_and_keeps_camera() {
        let (camera, counters) = CountingCamera::new(1);
        // No address space can hold this stack, so the spawn fails
        let mut supplier = FrameSupplier::new(Box::new(camera)).with_stack_size(1 << 60);

        let result = supplier.start(PermissionStatus::Granted);
        assert!(matches!(result, Err(SupplierError::Thread(_))));
        assert!(!supplier.is_running());
        assert_eq!(counters.binds.load(Ordering::SeqCst), 1);
        assert_eq!(counters.unbinds.load(Ordering::SeqCst), 1);

        // The camera came back, so a retry binds it again instead of reporting it lost
        let retry = supplier.start(PermissionStatus::Granted);
        assert!(matches!(retry, Err(SupplierError::Thread(_))));
        assert_eq!(counters.binds.load(Ordering::SeqCst), 2);
        assert_eq!(counters.unbinds.load(Ordering::SeqCst), 2);
    }
}
