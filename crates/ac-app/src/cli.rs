use std::path::PathBuf;

use ac_core::config::{CameraBackend, Settings};
use clap::{Parser, ValueEnum};

/// asciicam: live camera feed as ASCII art, with freeze and PNG export.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image fixe à la place de la caméra (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Périphérique caméra : index ("0") ou chemin ("/dev/video2").
    #[arg(long)]
    pub device: Option<String>,

    /// Backend caméra.
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Largeur de la grille en caractères (60..=320, pas de 4).
    #[arg(long)]
    pub width: Option<u32>,

    /// Taille de police d'export en pixels (6..=24).
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Profil de densité : 0 = compact, 1 = standard, 2 = blocs.
    #[arg(long)]
    pub profile: Option<usize>,

    /// Cadence d'affichage (15..=120).
    #[arg(long)]
    pub fps: Option<u32>,

    /// Police TrueType utilisée pour l'export PNG.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Dossier de sortie des exports.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Mode sans interface : rend une frame, l'exporte vers ce fichier, quitte.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Valeurs CLI de `--backend`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Ffmpeg,
    Native,
}

impl From<BackendArg> for CameraBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Ffmpeg => Self::Ffmpeg,
            BackendArg::Native => Self::Native,
        }
    }
}

impl Cli {
    /// Applique les options CLI par-dessus la config chargée, puis re-borne.
    ///
    /// Rejoué après chaque rechargement à chaud pour que la ligne de commande
    /// garde la priorité.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(width) = self.width {
            settings.render.width = width;
        }
        if let Some(font_size) = self.font_size {
            settings.render.font_size = font_size;
        }
        if let Some(profile) = self.profile {
            settings.render.profile_index = profile;
        }
        if let Some(fps) = self.fps {
            settings.display.target_fps = fps;
        }
        if let Some(ref device) = self.device {
            settings.camera.device.clone_from(device);
        }
        if let Some(backend) = self.backend {
            settings.camera.backend = backend.into();
        }
        if let Some(ref font) = self.font {
            settings.export.font_path = Some(font.clone());
        }
        if let Some(ref out) = self.out {
            settings.export.directory.clone_from(out);
        }
        settings.clamp_all();
    }
}
