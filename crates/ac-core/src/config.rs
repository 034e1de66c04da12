use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{DensityProfile, PROFILES};
use crate::error::CoreError;

/// Bornes et pas de la largeur de grille (en caractères).
pub const WIDTH_MIN: u32 = 60;
pub const WIDTH_MAX: u32 = 320;
pub const WIDTH_STEP: u32 = 4;

/// Bornes de la taille de police d'export (px).
pub const FONT_SIZE_MIN: u32 = 6;
pub const FONT_SIZE_MAX: u32 = 24;

/// Paramètres de rendu lus au début de chaque tick.
///
/// # Example
/// ```
/// use ac_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!((config.width, config.font_size, config.profile_index), (160, 12, 0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Largeur de la grille en caractères, [60, 320] par pas de 4.
    pub width: u32,
    /// Taille de police pour l'export, [6, 24].
    pub font_size: u32,
    /// Index du profil de densité parmi les presets built-in.
    pub profile_index: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 160,
            font_size: 12,
            profile_index: 0,
        }
    }
}

impl RenderConfig {
    /// Clamp all fields; width is snapped down onto its 4-step grid.
    ///
    /// # Example
    /// ```
    /// use ac_core::config::RenderConfig;
    /// let mut c = RenderConfig { width: 1000, font_size: 2, profile_index: 9 };
    /// c.clamp_all();
    /// assert_eq!((c.width, c.font_size, c.profile_index), (320, 6, 2));
    /// ```
    pub fn clamp_all(&mut self) {
        let w = self.width.clamp(WIDTH_MIN, WIDTH_MAX);
        self.width = WIDTH_MIN + (w - WIDTH_MIN) / WIDTH_STEP * WIDTH_STEP;
        self.font_size = self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
        self.profile_index = self.profile_index.min(PROFILES.len() - 1);
    }

    /// Profil de densité actif.
    #[must_use]
    pub fn profile(&self) -> DensityProfile {
        DensityProfile::builtin(self.profile_index)
    }

    /// Largeur ± un pas, bornée.
    pub fn step_width(&mut self, steps: i32) {
        let next = i64::from(self.width) + i64::from(steps) * i64::from(WIDTH_STEP);
        self.width = next.clamp(i64::from(WIDTH_MIN), i64::from(WIDTH_MAX)) as u32;
    }

    /// Taille de police ± 1, bornée.
    pub fn step_font_size(&mut self, delta: i32) {
        let next = i64::from(self.font_size) + i64::from(delta);
        self.font_size = next.clamp(i64::from(FONT_SIZE_MIN), i64::from(FONT_SIZE_MAX)) as u32;
    }

    /// Passe au profil suivant (cyclique).
    pub fn cycle_profile(&mut self) {
        self.profile_index = (self.profile_index + 1) % PROFILES.len();
    }
}

/// Rythme d'affichage.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Fréquence fixe des ticks du render loop.
    pub target_fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { target_fps: 60 }
    }
}

/// Backend d'acquisition caméra.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum CameraBackend {
    /// ffmpeg en subprocess (v4l2 / avfoundation / dshow selon l'OS).
    #[default]
    Ffmpeg,
    /// nokhwa, si compilé avec la feature `webcam`.
    Native,
}

/// Paramètres du périphérique caméra.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CameraConfig {
    pub backend: CameraBackend,
    /// Index ("0") ou chemin ("/dev/video2") du périphérique.
    pub device: String,
    /// Résolution demandée au périphérique (il peut en choisir une autre).
    pub requested_width: u32,
    pub requested_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: CameraBackend::Ffmpeg,
            device: "0".to_string(),
            requested_width: 640,
            requested_height: 480,
        }
    }
}

/// Paramètres d'export PNG.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Dossier de sortie des fichiers `ascii-cam-<millis>.png`.
    pub directory: PathBuf,
    /// Police TTF/OTF monospace. `None` = recherche dans les chemins système usuels.
    pub font_path: Option<PathBuf>,
    /// Espacement entre glyphes en px (négatif = resserré), identique à l'affichage.
    pub letter_spacing: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            font_path: None,
            letter_spacing: -1.0,
        }
    }
}

/// Configuration complète, hot-rechargeable.
///
/// # Example
/// ```
/// use ac_core::config::Settings;
/// let settings = Settings::default();
/// assert_eq!(settings.display.target_fps, 60);
/// assert_eq!(settings.camera.device, "0");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub render: RenderConfig,
    pub display: DisplayConfig,
    pub camera: CameraConfig,
    pub export: ExportConfig,
}

impl Settings {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.render.clamp_all();
        self.display.target_fps = self.display.target_fps.clamp(15, 120);
        self.camera.requested_width = self.camera.requested_width.clamp(16, 4096);
        self.camera.requested_height = self.camera.requested_height.clamp(16, 4096);
        self.export.letter_spacing = self.export.letter_spacing.clamp(-8.0, 8.0);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    render: Option<RenderSection>,
    display: Option<DisplaySection>,
    camera: Option<CameraSection>,
    export: Option<ExportSection>,
}

#[derive(Deserialize)]
struct RenderSection {
    width: Option<u32>,
    font_size: Option<u32>,
    profile_index: Option<usize>,
}

#[derive(Deserialize)]
struct DisplaySection {
    target_fps: Option<u32>,
}

#[derive(Deserialize)]
struct CameraSection {
    backend: Option<CameraBackend>,
    device: Option<String>,
    requested_width: Option<u32>,
    requested_height: Option<u32>,
}

#[derive(Deserialize)]
struct ExportSection {
    directory: Option<PathBuf>,
    font_path: Option<PathBuf>,
    letter_spacing: Option<f32>,
}

/// Parse un document TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the document is not valid TOML for this schema.
///
/// # Example
/// ```
/// use ac_core::config::parse_settings;
/// let s = parse_settings("[render]\nwidth = 98\n").unwrap();
/// assert_eq!(s.render.width, 96);
/// assert_eq!(s.render.font_size, 12);
/// ```
pub fn parse_settings(content: &str) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut settings = Settings::default();

    if let Some(r) = file.render {
        if let Some(v) = r.width {
            settings.render.width = v;
        }
        if let Some(v) = r.font_size {
            settings.render.font_size = v;
        }
        if let Some(v) = r.profile_index {
            settings.render.profile_index = v;
        }
    }
    if let Some(d) = file.display
        && let Some(v) = d.target_fps
    {
        settings.display.target_fps = v;
    }
    if let Some(c) = file.camera {
        if let Some(v) = c.backend {
            settings.camera.backend = v;
        }
        if let Some(v) = c.device {
            if v.trim().is_empty() {
                return Err(CoreError::Config("camera.device est vide".to_string()).into());
            }
            settings.camera.device = v;
        }
        if let Some(v) = c.requested_width {
            settings.camera.requested_width = v;
        }
        if let Some(v) = c.requested_height {
            settings.camera.requested_height = v;
        }
    }
    if let Some(e) = file.export {
        if let Some(v) = e.directory {
            settings.export.directory = v;
        }
        if let Some(v) = e.font_path.filter(|p| !p.as_os_str().is_empty()) {
            settings.export.font_path = Some(v);
        }
        if let Some(v) = e.letter_spacing {
            settings.export.letter_spacing = v;
        }
    }

    settings.clamp_all();
    Ok(settings)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ac_core::config::load_settings;
/// use std::path::Path;
/// let settings = load_settings(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_settings(&content).with_context(|| format!("Config invalide : {}", path.display()))
}
