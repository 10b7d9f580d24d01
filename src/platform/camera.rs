use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::scanner::Rotation;

use super::{Camera, CameraError, Capture, RawFrame};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Camera stand-in that plays back still images at a fixed frame rate.
///
/// The source is either a single image file or a directory whose images are
/// played in file name order.
pub struct ImageSequenceCamera {
    source: PathBuf,
    interval: Duration,
    looped: bool,
    rotation: Rotation,
    files: Vec<PathBuf>,
    cursor: usize,
    last_capture: Option<Instant>,
    bound: bool,
}

impl ImageSequenceCamera {
    pub fn new(source: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            source: source.into(),
            interval: Duration::from_secs(1) / fps.max(1),
            looped: false,
            rotation: Rotation::Deg0,
            files: Vec::new(),
            cursor: 0,
            last_capture: None,
            bound: false,
        }
    }

    /// Restart from the first image instead of ending the stream
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    /// Sensor rotation reported with every frame
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    fn list_images(source: &Path) -> Result<Vec<PathBuf>, CameraError> {
        if source.is_file() {
            return Ok(vec![source.to_path_buf()]);
        }
        if !source.is_dir() {
            return Err(CameraError::NotFound(source.to_path_buf()));
        }

        let entries = std::fs::read_dir(source)
            .map_err(|e| CameraError::Capture(format!("{}: {}", source.display(), e)))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(CameraError::Empty(source.to_path_buf()));
        }
        Ok(files)
    }

    fn pace(&mut self) {
        if let Some(last) = self.last_capture {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_capture = Some(Instant::now());
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl Camera for ImageSequenceCamera {
    fn bind(&mut self) -> Result<(), CameraError> {
        if self.bound {
            return Err(CameraError::Busy);
        }
        self.files = Self::list_images(&self.source)?;
        self.cursor = 0;
        self.last_capture = None;
        self.bound = true;
        debug!(source = %self.source.display(), images = self.files.len(), "camera bound");
        Ok(())
    }

    fn capture(&mut self) -> Result<Capture, CameraError> {
        if !self.bound {
            return Err(CameraError::NotBound);
        }
        self.pace();

        if self.cursor >= self.files.len() {
            if !self.looped {
                return Ok(Capture::Ended);
            }
            self.cursor = 0;
        }
        let path = &self.files[self.cursor];
        self.cursor += 1;

        match image::open(path) {
            Ok(image) => Ok(Capture::Frame(RawFrame { image, rotation: self.rotation })),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable image");
                Ok(Capture::Pending)
            }
        }
    }

    fn unbind(&mut self) {
        if self.bound {
            debug!(source = %self.source.display(), "camera unbound");
        }
        self.bound = false;
        self.files.clear();
    }
}
