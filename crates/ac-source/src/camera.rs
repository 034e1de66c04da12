// Caméra via ffmpeg en subprocess (std::process::Command), sans dépendance
// système à la compilation. Prérequis : `ffmpeg` et `ffprobe` dans PATH.
//
// Architecture :
//   - `probe_camera`      : interroge ffprobe pour obtenir width/height/fps natifs
//   - `spawn_ffmpeg_pipe` : lance ffmpeg → flux raw RGBA sur stdout
//   - `reader_loop`       : thread dédié, lit les frames et les pousse dans un canal borné
//   - `drain_stderr`      : thread dédié, vide stderr en continu (pipe jamais plein)
//   - `FfmpegCamera`      : implémente `VideoSource`, possède le process et le thread

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ac_core::config::CameraConfig;
use ac_core::error::{CameraFailure, CoreError};
use ac_core::frame::FrameBuffer;
use ac_core::traits::{StreamInfo, VideoSource};
use anyhow::Result;
use flume::{Receiver, Sender};

/// Capacité du canal de frames. Le render loop ne garde que la plus récente.
const FRAME_CHANNEL_CAP: usize = 2;

/// Délai max d'attente de la première frame dans `acquire`.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Lignes stderr gardées pour classer un échec d'ouverture.
const STDERR_TAIL_LINES: usize = 16;

/// Arguments d'entrée ffmpeg pour le périphérique, selon l'OS.
///
/// `device` est un index ("0") ou un chemin/nom explicite.
///
/// # Example
/// ```
/// use ac_source::camera::input_args;
/// let args = input_args("linux", "2", 640, 480);
/// assert_eq!(args, ["-f", "v4l2", "-video_size", "640x480", "-i", "/dev/video2"]);
/// ```
#[must_use]
pub fn input_args(os: &str, device: &str, width: u32, height: u32) -> Vec<String> {
    let size = format!("{width}x{height}");
    let is_index = !device.is_empty() && device.chars().all(|c| c.is_ascii_digit());
    let (format, input) = match os {
        "macos" => ("avfoundation", device.to_string()),
        "windows" => {
            let input = if is_index {
                // dshow n'accepte que des noms ; l'index sert de repli documenté.
                format!("video={device}")
            } else if device.starts_with("video=") {
                device.to_string()
            } else {
                format!("video={device}")
            };
            ("dshow", input)
        }
        _ => {
            let input = if is_index {
                format!("/dev/video{device}")
            } else {
                device.to_string()
            };
            ("v4l2", input)
        }
    };
    vec![
        "-f".into(),
        format.into(),
        "-video_size".into(),
        size,
        "-i".into(),
        input,
    ]
}

/// Extrait `(width, height, fps)` de la sortie `default=noprint_wrappers=1` de ffprobe.
///
/// # Example
/// ```
/// use ac_source::camera::parse_probe_output;
/// let info = parse_probe_output("width=1280\nheight=720\nr_frame_rate=30000/1001\n").unwrap();
/// assert_eq!((info.width, info.height, info.fps), (1280, 720, 30));
/// assert!(parse_probe_output("").is_none());
/// ```
#[must_use]
pub fn parse_probe_output(text: &str) -> Option<StreamInfo> {
    let mut width: u32 = 0;
    let mut height: u32 = 0;
    let mut fps: f64 = 0.0;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "30/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 {
                fps = num / den;
            }
        }
    }

    (width > 0 && height > 0).then_some(StreamInfo {
        width,
        height,
        fps: fps.round().clamp(0.0, 240.0) as u32,
    })
}

/// Interroge `ffprobe` sur le périphérique caméra.
///
/// # Errors
/// `CameraUnavailable` si ffprobe est absent, si le périphérique est refusé,
/// occupé, absent, ou ne décrit aucun flux vidéo.
pub fn probe_camera(config: &CameraConfig) -> Result<StreamInfo, CoreError> {
    let mut args: Vec<String> = vec!["-v".into(), "error".into()];
    args.extend(input_args(
        std::env::consts::OS,
        &config.device,
        config.requested_width,
        config.requested_height,
    ));
    args.extend(
        [
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "default=noprint_wrappers=1",
        ]
        .map(String::from),
    );

    let output = Command::new("ffprobe")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            log::warn!("probe_camera: impossible de lancer ffprobe: {e}");
            CoreError::CameraUnavailable(CameraFailure::Other(format!("ffprobe: {e}")))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::CameraUnavailable(CameraFailure::classify(&stderr)));
    }

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))
        .ok_or(CoreError::CameraUnavailable(CameraFailure::NoDevice))?;
    log::info!(
        "probe_camera: {}x{} @ {}fps ({})",
        info.width,
        info.height,
        info.fps,
        config.device
    );
    Ok(info)
}

/// Lance un processus `ffmpeg` qui écrit des frames RGBA brutes sur stdout.
///
/// Chaque frame = `w × h × 4` bytes (RGBA row-major, sans padding).
///
/// # Errors
/// Retourne une erreur si ffmpeg ne peut pas être lancé.
pub fn spawn_ffmpeg_pipe(config: &CameraConfig, info: StreamInfo) -> std::io::Result<Child> {
    let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
    args.extend(input_args(
        std::env::consts::OS,
        &config.device,
        info.width,
        info.height,
    ));
    args.extend(
        [
            "-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1",
        ]
        .map(String::from),
    );

    let child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    log::debug!("ffmpeg spawné: {}x{} ({})", info.width, info.height, config.device);
    Ok(child)
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false), // EOF
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Lit stderr jusqu'à EOF, log chaque ligne en debug.
///
/// Retourne les `STDERR_TAIL_LINES` dernières lignes non vides.
fn drain_stderr<R: Read>(stderr: R) -> String {
    let mut reader = BufReader::new(stderr);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line).trim_end().to_string();
                if text.is_empty() {
                    continue;
                }
                log::debug!("ffmpeg: {text}");
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(text);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(_) => break,
        }
    }
    Vec::from(tail).join("\n")
}

/// Boucle du thread lecteur : stdout ffmpeg → canal de frames.
///
/// Signale l'issue de la première lecture sur `ready_tx` puis s'arrête sur
/// EOF (process tué par `release`) ou quand le récepteur est lâché. Un EOF
/// avant la première frame est classé d'après la fin de stderr.
fn reader_loop(
    mut stdout: ChildStdout,
    stderr_drain: JoinHandle<String>,
    info: StreamInfo,
    frame_tx: &Sender<FrameBuffer>,
    ready_tx: &Sender<Result<(), CameraFailure>>,
) {
    let mut first = true;
    loop {
        let mut fb = FrameBuffer::new(info.width, info.height);
        match read_exact_or_eof(&mut stdout, &mut fb.data) {
            Ok(true) => {
                if first {
                    let _ = ready_tx.send(Ok(()));
                    first = false;
                }
                if frame_tx.send(fb).is_err() {
                    break;
                }
            }
            Ok(false) => {
                if first {
                    // ffmpeg est sorti : stderr est fermé, le join rend la main.
                    let msg = stderr_drain.join().unwrap_or_default();
                    let _ = ready_tx.send(Err(CameraFailure::classify(&msg)));
                }
                log::info!("Thread caméra: EOF, arrêt.");
                break;
            }
            Err(e) => {
                if first {
                    let _ = ready_tx.send(Err(CameraFailure::Other(e.to_string())));
                }
                log::warn!("Thread caméra: erreur lecture pipe: {e}");
                break;
            }
        }
    }
}

/// Caméra pilotée par ffmpeg. Possède le process et le thread lecteur.
///
/// # Example
/// ```no_run
/// use ac_core::config::CameraConfig;
/// use ac_core::traits::VideoSource;
/// use ac_source::camera::FfmpegCamera;
///
/// let mut camera = FfmpegCamera::new(CameraConfig::default());
/// if camera.acquire().is_ok() {
///     let _frame = camera.current_frame();
/// }
/// camera.release();
/// ```
pub struct FfmpegCamera {
    config: CameraConfig,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    frame_rx: Option<Receiver<FrameBuffer>>,
}

impl FfmpegCamera {
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            child: None,
            reader: None,
            frame_rx: None,
        }
    }

    fn start(&mut self) -> Result<StreamInfo, CoreError> {
        let info = probe_camera(&self.config)?;

        let mut child = spawn_ffmpeg_pipe(&self.config, info).map_err(|e| {
            CoreError::CameraUnavailable(CameraFailure::Other(format!("ffmpeg: {e}")))
        })?;
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CoreError::CameraUnavailable(CameraFailure::Other(
                "pipes ffmpeg indisponibles".into(),
            )));
        };
        self.child = Some(child);

        let stderr_drain = thread::Builder::new()
            .name("ac-camera-stderr".to_string())
            .spawn(move || drain_stderr(stderr))
            .map_err(|e| CoreError::CameraUnavailable(CameraFailure::Other(e.to_string())))?;

        let (frame_tx, frame_rx) = flume::bounded(FRAME_CHANNEL_CAP);
        let (ready_tx, ready_rx) = flume::bounded(1);
        let handle = thread::Builder::new()
            .name("ac-camera".to_string())
            .spawn(move || reader_loop(stdout, stderr_drain, info, &frame_tx, &ready_tx))
            .map_err(|e| CoreError::CameraUnavailable(CameraFailure::Other(e.to_string())))?;
        self.reader = Some(handle);
        self.frame_rx = Some(frame_rx);

        match ready_rx.recv_timeout(FIRST_FRAME_TIMEOUT) {
            Ok(Ok(())) => Ok(info),
            Ok(Err(failure)) => Err(CoreError::CameraUnavailable(failure)),
            Err(_) => Err(CoreError::CameraUnavailable(CameraFailure::Other(
                "aucune frame reçue".into(),
            ))),
        }
    }
}

impl VideoSource for FfmpegCamera {
    fn acquire(&mut self) -> Result<StreamInfo, CoreError> {
        self.release();
        let result = self.start();
        if result.is_err() {
            self.release();
        }
        result
    }

    fn current_frame(&mut self) -> Option<FrameBuffer> {
        let rx = self.frame_rx.as_ref()?;
        // Ne garder que la plus récente.
        let mut latest = None;
        while let Ok(frame) = rx.try_recv() {
            latest = Some(frame);
        }
        latest
    }

    fn release(&mut self) {
        // Lâcher le récepteur débloque un `send` en cours côté lecteur.
        self.frame_rx = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            log::info!("Caméra ffmpeg libérée ({})", self.config.device);
        }
        if let Some(handle) = self.reader.take()
            && handle.join().is_err()
        {
            log::warn!("Thread caméra terminé en panique");
        }
    }

    fn is_acquired(&self) -> bool {
        self.child.is_some()
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.release();
    }
}
