use std::io::Cursor;
use std::path::{Path, PathBuf};

use ac_core::error::CoreError;
use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};

/// Image PNG prête à être écrite. Immuable une fois produite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub width_px: u32,
    pub height_px: u32,
    pub png: Vec<u8>,
    pub filename: String,
}

/// `ascii-cam-<unixMillis>.png`.
///
/// # Example
/// ```
/// use ac_export::artifact::artifact_filename;
/// assert_eq!(artifact_filename(1_700_000_000_123), "ascii-cam-1700000000123.png");
/// ```
#[must_use]
pub fn artifact_filename(unix_millis: i64) -> String {
    format!("ascii-cam-{unix_millis}.png")
}

/// Nom de fichier horodaté à l'instant présent.
#[must_use]
pub fn timestamped_filename() -> String {
    artifact_filename(chrono::Utc::now().timestamp_millis())
}

/// Encode un buffer RGBA en PNG.
///
/// # Errors
/// `CoreError::RenderSurfaceUnavailable` si l'encodage échoue.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CoreError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CoreError::RenderSurfaceUnavailable(format!("encodage PNG: {e}")))?;
    Ok(bytes)
}

impl ExportArtifact {
    /// Écrit le PNG dans `dir` (créé au besoin) et retourne le chemin complet.
    ///
    /// # Errors
    /// Returns an error if the directory or the file cannot be written.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Création du dossier {}", dir.display()))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.png)
            .with_context(|| format!("Écriture de {}", path.display()))?;
        log::info!(
            "Export: {} ({}x{})",
            path.display(),
            self.width_px,
            self.height_px
        );
        Ok(path)
    }
}
