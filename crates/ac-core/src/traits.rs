use crate::error::CoreError;
use crate::frame::FrameBuffer;

/// Caractéristiques du flux ouvert par `VideoSource::acquire`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Débit annoncé par le périphérique (0 si inconnu).
    pub fps: u32,
}

/// Fournit des frames visuelles au pipeline.
///
/// Implémenté par : `ImageSource`, `FfmpegCamera`, `WebcamSource`.
///
/// La source possède le flux matériel de façon exclusive entre `acquire`
/// et `release` ; aucun autre composant n'y accède.
///
/// # Example
/// ```
/// use ac_core::error::{CameraFailure, CoreError};
/// use ac_core::frame::FrameBuffer;
/// use ac_core::traits::{StreamInfo, VideoSource};
///
/// struct NoCamera;
/// impl VideoSource for NoCamera {
///     fn acquire(&mut self) -> Result<StreamInfo, CoreError> {
///         Err(CoreError::CameraUnavailable(CameraFailure::NoDevice))
///     }
///     fn current_frame(&mut self) -> Option<FrameBuffer> { None }
///     fn release(&mut self) {}
///     fn is_acquired(&self) -> bool { false }
/// }
/// assert!(NoCamera.acquire().is_err());
/// ```
pub trait VideoSource {
    /// Ouvre le périphérique.
    ///
    /// # Errors
    /// `CoreError::CameraUnavailable` on permission, absence or busy device.
    fn acquire(&mut self) -> Result<StreamInfo, CoreError>;

    /// Dernière frame disponible, sans bloquer.
    ///
    /// `None` = FrameNotReady (flux pas encore prêt, ou pas de nouvelle frame).
    fn current_frame(&mut self) -> Option<FrameBuffer>;

    /// Libère le périphérique. Idempotent, sûr même sans `acquire` préalable.
    fn release(&mut self);

    /// `true` entre un `acquire` réussi et le `release` suivant.
    fn is_acquired(&self) -> bool;

    /// Nom lisible pour le debug/UI.
    fn name(&self) -> &str {
        "source"
    }
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn acquire(&mut self) -> Result<StreamInfo, CoreError> {
        (**self).acquire()
    }

    fn current_frame(&mut self) -> Option<FrameBuffer> {
        (**self).current_frame()
    }

    fn release(&mut self) {
        (**self).release();
    }

    fn is_acquired(&self) -> bool {
        (**self).is_acquired()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
