use thiserror::Error;

/// Raison d'un échec d'acquisition caméra.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraFailure {
    /// L'OS ou l'utilisateur a refusé l'accès au périphérique.
    PermissionDenied,
    /// Aucun périphérique vidéo présent.
    NoDevice,
    /// Le périphérique est déjà utilisé par un autre processus.
    DeviceBusy,
    /// Any other backend failure, with its message.
    Other(String),
}

impl std::fmt::Display for CameraFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("permission refusée"),
            Self::NoDevice => f.write_str("aucun périphérique"),
            Self::DeviceBusy => f.write_str("périphérique occupé"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl CameraFailure {
    /// Classe un message d'erreur backend (nokhwa, ffmpeg stderr) en cause connue.
    ///
    /// # Example
    /// ```
    /// use ac_core::error::CameraFailure;
    /// assert_eq!(CameraFailure::classify("Permission denied"), CameraFailure::PermissionDenied);
    /// assert_eq!(CameraFailure::classify("Device or resource busy"), CameraFailure::DeviceBusy);
    /// ```
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("permission") || msg.contains("denied") || msg.contains("authorization")
        {
            Self::PermissionDenied
        } else if msg.contains("busy") || msg.contains("in use") {
            Self::DeviceBusy
        } else if msg.contains("no such file")
            || msg.contains("no device")
            || msg.contains("not found")
            || msg.contains("could not find")
        {
            Self::NoDevice
        } else {
            Self::Other(message.trim().to_string())
        }
    }
}

/// Errors originating from the core pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Camera could not be acquired. Never retried automatically.
    #[error("Caméra indisponible : {0}")]
    CameraUnavailable(CameraFailure),

    /// The source has no frame yet. Transient, the tick is simply skipped.
    #[error("Aucune frame disponible")]
    FrameNotReady,

    /// A drawing or export surface could not be created.
    #[error("Surface de rendu indisponible : {0}")]
    RenderSurfaceUnavailable(String),

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Font file missing or unreadable.
    #[error("Police introuvable : {path}")]
    FontUnavailable {
        /// Path that was tried.
        path: String,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}
