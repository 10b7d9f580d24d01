use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::DynamicImage;

/// Clockwise rotation needed to bring a capture upright
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Counts frames handed out by a supplier and frames released again.
///
/// Releases are recorded by dropping a `Frame`, so each frame is released
/// exactly once on every path.
#[derive(Debug, Default)]
pub struct FrameLedger {
    issued: AtomicU64,
    released: AtomicU64,
}

impl FrameLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Acquire)
    }

    /// Frames currently alive somewhere in the pipeline
    pub fn outstanding(&self) -> u64 {
        self.issued().saturating_sub(self.released())
    }
}

struct FrameLease {
    ledger: Arc<FrameLedger>,
}

impl FrameLease {
    fn issue(ledger: &Arc<FrameLedger>) -> Self {
        ledger.issued.fetch_add(1, Ordering::AcqRel);
        Self { ledger: Arc::clone(ledger) }
    }
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        let released = self.ledger.released.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(
            released <= self.ledger.issued(),
            "frame released more times than frames were issued"
        );
    }
}

/// One camera capture owned by whoever currently processes it
pub struct Frame {
    seq: u64,
    image: DynamicImage,
    rotation: Rotation,
    _lease: FrameLease,
}

impl Frame {
    pub fn new(seq: u64, image: DynamicImage, rotation: Rotation, ledger: &Arc<FrameLedger>) -> Self {
        Self {
            seq,
            image,
            rotation,
            _lease: FrameLease::issue(ledger),
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The capture rotated into upright orientation
    pub fn upright(&self) -> DynamicImage {
        match self.rotation {
            Rotation::Deg0 => self.image.clone(),
            Rotation::Deg90 => self.image.rotate90(),
            Rotation::Deg180 => self.image.rotate180(),
            Rotation::Deg270 => self.image.rotate270(),
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("seq", &self.seq)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("rotation", &self.rotation)
            .finish()
    }
}
