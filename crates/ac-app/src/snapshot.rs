use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ac_ascii::compositor::Compositor;
use ac_core::config::Settings;
use ac_core::error::CoreError;
use ac_core::traits::VideoSource;
use ac_export::{ExportRenderer, FontPainter, GlyphPainter};
use anyhow::{Context, Result};

/// Attente max de la première frame en mode snapshot.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Mode sans interface : une frame → une grille → un PNG.
///
/// # Errors
/// Returns an error if the source, the font, or the output file fails.
pub fn run_snapshot(
    source: &mut dyn VideoSource,
    settings: &Settings,
    out: &Path,
) -> Result<PathBuf> {
    let painter = FontPainter::discover(settings.export.font_path.as_deref())
        .context("Police d'export indisponible (voir --font)")?;
    let renderer =
        ExportRenderer::new(painter).with_letter_spacing(settings.export.letter_spacing);
    snapshot_with(source, settings, &renderer, out)
}

/// Idem avec un renderer déjà construit.
///
/// `out` peut être un dossier existant : le nom horodaté y est alors utilisé.
///
/// # Errors
/// Returns an error if no frame arrives, the grid is empty, or writing fails.
pub fn snapshot_with<P: GlyphPainter>(
    source: &mut dyn VideoSource,
    settings: &Settings,
    renderer: &ExportRenderer<P>,
    out: &Path,
) -> Result<PathBuf> {
    if let Err(e) = source.acquire() {
        source.release();
        return Err(e.into());
    }
    let frame = wait_for_frame(source, FIRST_FRAME_TIMEOUT);
    source.release();
    let frame = frame.ok_or(CoreError::FrameNotReady)?;

    let grid = Compositor::new().process(&frame, &settings.render)?;
    let artifact = renderer
        .render(&grid, settings.render.font_size)?
        .context("Grille vide : rien à exporter")?;

    let path = if out.is_dir() {
        out.join(&artifact.filename)
    } else {
        out.to_path_buf()
    };
    std::fs::write(&path, &artifact.png)
        .with_context(|| format!("Écriture de {}", path.display()))?;
    log::info!(
        "Snapshot {}x{} ({} lignes) → {}",
        artifact.width_px,
        artifact.height_px,
        grid.height(),
        path.display()
    );
    Ok(path)
}

fn wait_for_frame(
    source: &mut dyn VideoSource,
    timeout: Duration,
) -> Option<ac_core::frame::FrameBuffer> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(frame) = source.current_frame() {
            return Some(frame);
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::frame::FrameBuffer;
    use ac_export::GlyphBitmap;
    use ac_source::image::ImageSource;

    struct BoxPainter;

    impl GlyphPainter for BoxPainter {
        fn advance(&self, _ch: char, size: f32) -> f32 {
            size / 2.0
        }
        fn ascent(&self, size: f32) -> f32 {
            size
        }
        fn rasterize(&self, _ch: char, _size: f32) -> GlyphBitmap {
            GlyphBitmap {
                left: 0,
                top: -2,
                width: 2,
                height: 2,
                coverage: vec![255; 4],
            }
        }
    }

    #[test]
    fn snapshot_writes_png_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ImageSource::from_frame(FrameBuffer::filled(320, 240, (90, 90, 90)));
        let mut settings = Settings::default();
        settings.render.width = 60;
        let renderer = ExportRenderer::new(BoxPainter);

        let path = snapshot_with(&mut source, &settings, &renderer, dir.path()).unwrap();
        assert!(path.starts_with(dir.path()));
        let img = image::open(&path).unwrap();
        // 45 lignes × 6.6 px + 80, arrondi supérieur.
        assert_eq!(img.height(), (45.0f32 * (12.0 * 0.55) + 80.0).ceil() as u32);
        assert!(!source.is_acquired());
    }

    #[test]
    fn snapshot_to_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shot.png");
        let mut source = ImageSource::from_frame(FrameBuffer::filled(64, 64, (0, 0, 0)));
        let settings = Settings::default();
        let path =
            snapshot_with(&mut source, &settings, &ExportRenderer::new(BoxPainter), &out).unwrap();
        assert_eq!(path, out);
        assert!(out.is_file());
    }

    #[test]
    fn missing_image_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ImageSource::new(Path::new("/nonexistent/in.png"));
        let result = snapshot_with(
            &mut source,
            &Settings::default(),
            &ExportRenderer::new(BoxPainter),
            dir.path(),
        );
        assert!(result.is_err());
    }
}
