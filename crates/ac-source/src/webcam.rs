//! Caméra native via nokhwa (feature `webcam`).
//!
//! `nokhwa::Camera` n'est pas `Send` : la caméra est ouverte dans son propre
//! thread, qui renvoie la résolution négociée (ou l'échec) par un canal
//! d'information avant de pousser les frames.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ac_core::config::CameraConfig;
use ac_core::error::{CameraFailure, CoreError};
use ac_core::frame::FrameBuffer;
use ac_core::traits::{StreamInfo, VideoSource};
use flume::{Receiver, Sender};
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};

const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Flux ouvert, possédé par le thread de capture.
trait FrameGrabber {
    fn info(&self) -> StreamInfo;

    /// Prochaine frame décodée, `None` si rien d'exploitable.
    fn grab(&mut self) -> Option<FrameBuffer>;
}

/// Ouvre le flux dans le thread de capture. Peut bloquer (pilote, permission).
type Opener = fn(&CameraConfig) -> Result<Box<dyn FrameGrabber>, CameraFailure>;

/// Webcam native. Même contrat que `FfmpegCamera`.
pub struct WebcamSource {
    config: CameraConfig,
    opener: Opener,
    open_timeout: Duration,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    frame_rx: Option<Receiver<FrameBuffer>>,
}

impl WebcamSource {
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        Self::with_opener(config, open_nokhwa, OPEN_TIMEOUT)
    }

    fn with_opener(config: CameraConfig, opener: Opener, open_timeout: Duration) -> Self {
        Self {
            config,
            opener,
            open_timeout,
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            frame_rx: None,
        }
    }

    /// Abandonne un thread encore bloqué dans l'ouverture.
    ///
    /// Il voit `stop` dès que l'ouverture rend la main et ferme le flux
    /// sans pousser de frame.
    fn abandon_worker(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.frame_rx = None;
        if self.worker.take().is_some() {
            log::warn!("Webcam: ouverture bloquée, thread abandonné");
        }
    }
}

fn camera_index(device: &str) -> CameraIndex {
    device
        .parse::<u32>()
        .map_or_else(|_| CameraIndex::String(device.to_string()), CameraIndex::Index)
}

fn open_camera(config: &CameraConfig) -> Result<Camera, CameraFailure> {
    let index = camera_index(&config.device);
    let resolution = Resolution::new(config.requested_width, config.requested_height);
    let attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            FrameFormat::MJPEG,
            30,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            FrameFormat::YUYV,
            30,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
    ];

    let mut last_error = String::from("aucun format");
    for requested in attempts {
        match Camera::new(index.clone(), requested) {
            Ok(camera) => return Ok(camera),
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(CameraFailure::classify(&last_error))
}

struct NokhwaGrabber {
    camera: Camera,
}

impl FrameGrabber for NokhwaGrabber {
    fn info(&self) -> StreamInfo {
        let res = self.camera.resolution();
        StreamInfo {
            width: res.width(),
            height: res.height(),
            fps: self.camera.frame_rate(),
        }
    }

    fn grab(&mut self) -> Option<FrameBuffer> {
        let raw = self.camera.frame().ok()?;
        let decoded = raw.decode_image::<RgbFormat>().ok()?;
        let (width, height) = decoded.dimensions();
        FrameBuffer::from_rgb(width, height, decoded.as_raw())
    }
}

impl Drop for NokhwaGrabber {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}

fn open_nokhwa(config: &CameraConfig) -> Result<Box<dyn FrameGrabber>, CameraFailure> {
    let mut camera = open_camera(config)?;
    camera
        .open_stream()
        .map_err(|e| CameraFailure::classify(&e.to_string()))?;
    Ok(Box::new(NokhwaGrabber { camera }))
}

fn capture_loop(
    config: &CameraConfig,
    opener: Opener,
    stop: &AtomicBool,
    frame_tx: &Sender<FrameBuffer>,
    info_tx: &Sender<Result<StreamInfo, CameraFailure>>,
) {
    let mut grabber = match opener(config) {
        Ok(grabber) => grabber,
        Err(failure) => {
            let _ = info_tx.send(Err(failure));
            return;
        }
    };
    // `acquire` a expiré pendant l'ouverture.
    if stop.load(Ordering::Relaxed) {
        return;
    }
    let _ = info_tx.send(Ok(grabber.info()));

    while !stop.load(Ordering::Relaxed) {
        let Some(frame) = grabber.grab() else {
            thread::sleep(Duration::from_millis(1));
            continue;
        };
        // Canal plein : le consommateur prendra la suivante.
        if let Err(flume::TrySendError::Disconnected(_)) = frame_tx.try_send(frame) {
            break;
        }
    }
}

impl VideoSource for WebcamSource {
    fn acquire(&mut self) -> Result<StreamInfo, CoreError> {
        self.release();
        self.stop = Arc::new(AtomicBool::new(false));

        let (frame_tx, frame_rx) = flume::bounded(2);
        let (info_tx, info_rx) = flume::bounded(1);
        let stop = Arc::clone(&self.stop);
        let config = self.config.clone();
        let opener = self.opener;
        let worker = thread::Builder::new()
            .name("ac-webcam".to_string())
            .spawn(move || capture_loop(&config, opener, &stop, &frame_tx, &info_tx))
            .map_err(|e| CoreError::CameraUnavailable(CameraFailure::Other(e.to_string())))?;
        self.worker = Some(worker);

        match info_rx.recv_timeout(self.open_timeout) {
            Ok(Ok(info)) => {
                self.frame_rx = Some(frame_rx);
                log::info!("Webcam: {}x{} @ {}fps", info.width, info.height, info.fps);
                Ok(info)
            }
            Ok(Err(failure)) => {
                self.release();
                Err(CoreError::CameraUnavailable(failure))
            }
            Err(_) => {
                self.abandon_worker();
                Err(CoreError::CameraUnavailable(CameraFailure::Other(
                    "ouverture caméra expirée".into(),
                )))
            }
        }
    }

    fn current_frame(&mut self) -> Option<FrameBuffer> {
        let rx = self.frame_rx.as_ref()?;
        let mut latest = None;
        while let Ok(frame) = rx.try_recv() {
            latest = Some(frame);
        }
        latest
    }

    fn release(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.frame_rx = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Thread webcam terminé en panique");
            }
            log::info!("Webcam libérée");
        }
    }

    fn is_acquired(&self) -> bool {
        self.frame_rx.is_some()
    }

    fn name(&self) -> &str {
        "nokhwa"
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn numeric_device_is_an_index() {
        assert!(matches!(camera_index("0"), CameraIndex::Index(0)));
        assert!(matches!(camera_index("/dev/video3"), CameraIndex::String(_)));
    }

    struct GrayGrabber;

    impl FrameGrabber for GrayGrabber {
        fn info(&self) -> StreamInfo {
            StreamInfo {
                width: 8,
                height: 6,
                fps: 30,
            }
        }

        fn grab(&mut self) -> Option<FrameBuffer> {
            thread::sleep(Duration::from_millis(5));
            Some(FrameBuffer::filled(8, 6, (128, 128, 128)))
        }
    }

    fn gray_opener(_: &CameraConfig) -> Result<Box<dyn FrameGrabber>, CameraFailure> {
        Ok(Box::new(GrayGrabber))
    }

    fn stalled_opener(_: &CameraConfig) -> Result<Box<dyn FrameGrabber>, CameraFailure> {
        thread::sleep(Duration::from_secs(2));
        Ok(Box::new(GrayGrabber))
    }

    fn denied_opener(_: &CameraConfig) -> Result<Box<dyn FrameGrabber>, CameraFailure> {
        Err(CameraFailure::PermissionDenied)
    }

    #[test]
    fn stalled_open_times_out_without_blocking() {
        let mut source = WebcamSource::with_opener(
            CameraConfig::default(),
            stalled_opener,
            Duration::from_millis(50),
        );
        let started = Instant::now();
        assert!(matches!(
            source.acquire(),
            Err(CoreError::CameraUnavailable(CameraFailure::Other(_)))
        ));
        source.release();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!source.is_acquired());
    }

    #[test]
    fn open_failure_is_reported() {
        let mut source =
            WebcamSource::with_opener(CameraConfig::default(), denied_opener, OPEN_TIMEOUT);
        assert!(matches!(
            source.acquire(),
            Err(CoreError::CameraUnavailable(CameraFailure::PermissionDenied))
        ));
        assert!(!source.is_acquired());
    }

    #[test]
    fn opened_stream_delivers_frames_until_release() {
        let mut source =
            WebcamSource::with_opener(CameraConfig::default(), gray_opener, OPEN_TIMEOUT);
        let info = source.acquire().unwrap();
        assert_eq!((info.width, info.height), (8, 6));

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut frame = None;
        while frame.is_none() && Instant::now() < deadline {
            frame = source.current_frame();
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(frame.map(|f| (f.width, f.height)), Some((8, 6)));

        source.release();
        assert!(!source.is_acquired());
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn release_is_idempotent() {
        let mut source = WebcamSource::new(CameraConfig::default());
        source.release();
        source.release();
        assert!(!source.is_acquired());
    }
}
