/// Frame sources for asciicam (still image, ffmpeg camera, native webcam).

pub mod camera;
pub mod image;
#[cfg(feature = "webcam")]
pub mod webcam;

use std::path::Path;

use ac_core::config::{CameraBackend, CameraConfig};
use ac_core::traits::VideoSource;

/// Construit la source caméra selon le backend configuré.
///
/// Sans la feature `webcam`, `Native` retombe sur ffmpeg.
///
/// # Example
/// ```
/// use ac_core::config::CameraConfig;
/// use ac_source::camera_source;
/// let source = camera_source(&CameraConfig::default());
/// assert_eq!(source.name(), "ffmpeg");
/// assert!(!source.is_acquired());
/// ```
#[must_use]
pub fn camera_source(config: &CameraConfig) -> Box<dyn VideoSource> {
    match config.backend {
        CameraBackend::Ffmpeg => Box::new(camera::FfmpegCamera::new(config.clone())),
        #[cfg(feature = "webcam")]
        CameraBackend::Native => Box::new(webcam::WebcamSource::new(config.clone())),
        #[cfg(not(feature = "webcam"))]
        CameraBackend::Native => {
            log::warn!("Backend natif non compilé (feature `webcam`), repli sur ffmpeg");
            Box::new(camera::FfmpegCamera::new(config.clone()))
        }
    }
}

/// Source image statique à la place de la caméra (`--image`).
#[must_use]
pub fn image_source(path: &Path) -> Box<dyn VideoSource> {
    Box::new(image::ImageSource::new(path))
}
