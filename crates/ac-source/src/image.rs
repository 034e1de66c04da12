use std::path::{Path, PathBuf};

use ac_core::error::{CameraFailure, CoreError};
use ac_core::frame::FrameBuffer;
use ac_core::traits::{StreamInfo, VideoSource};
use anyhow::{Context, Result};

/// Source d'image statique. Chaque tick reçoit la même frame.
///
/// Utile sans caméra (démo, tests, `--snapshot`).
///
/// # Example
/// ```
/// use ac_core::frame::FrameBuffer;
/// use ac_core::traits::VideoSource;
/// use ac_source::image::ImageSource;
///
/// let mut source = ImageSource::from_frame(FrameBuffer::new(8, 6));
/// assert!(source.current_frame().is_none());
/// let info = source.acquire().unwrap();
/// assert_eq!((info.width, info.height), (8, 6));
/// assert!(source.current_frame().is_some());
/// source.release();
/// source.release();
/// assert!(!source.is_acquired());
/// ```
pub struct ImageSource {
    origin: Origin,
    frame: Option<FrameBuffer>,
    acquired: bool,
}

enum Origin {
    File(PathBuf),
    Memory,
}

impl ImageSource {
    /// Source lue depuis le disque au moment de `acquire`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            origin: Origin::File(path.to_path_buf()),
            frame: None,
            acquired: false,
        }
    }

    /// Source en mémoire.
    #[must_use]
    pub fn from_frame(frame: FrameBuffer) -> Self {
        Self {
            origin: Origin::Memory,
            frame: Some(frame),
            acquired: false,
        }
    }
}

impl VideoSource for ImageSource {
    fn acquire(&mut self) -> Result<StreamInfo, CoreError> {
        if let Origin::File(path) = &self.origin {
            let frame = load_image(path).map_err(|e| {
                log::warn!("ImageSource: {e:#}");
                CoreError::CameraUnavailable(CameraFailure::NoDevice)
            })?;
            self.frame = Some(frame);
        }
        let Some(frame) = &self.frame else {
            return Err(CoreError::CameraUnavailable(CameraFailure::NoDevice));
        };
        self.acquired = true;
        Ok(StreamInfo {
            width: frame.width,
            height: frame.height,
            fps: 0,
        })
    }

    fn current_frame(&mut self) -> Option<FrameBuffer> {
        if self.acquired {
            self.frame.clone()
        } else {
            None
        }
    }

    fn release(&mut self) {
        self.acquired = false;
        if matches!(self.origin, Origin::File(_)) {
            self.frame = None;
        }
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }

    fn name(&self) -> &str {
        "image"
    }
}

/// Charge une image disque en RGBA.
///
/// # Errors
/// Returns an error if the image cannot be loaded.
///
/// # Example
/// ```no_run
/// use ac_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("test.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    let img = image::open(path).with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    })
}
