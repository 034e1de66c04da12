use std::sync::Arc;
use std::time::{Duration, Instant};

use ac_ascii::compositor::Compositor;
use ac_core::capture::CaptureController;
use ac_core::config::RenderConfig;
use ac_core::error::CoreError;
use ac_core::frame::CharacterGrid;
use ac_core::traits::{StreamInfo, VideoSource};

use crate::scheduler::{TickHandle, TickScheduler};

/// État de la boucle de rendu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Issue d'un passage dans la boucle.
#[derive(Debug)]
pub enum TickOutcome {
    /// Pas de tick échu, ou boucle arrêtée.
    Idle,
    /// Tick exécuté sans nouvelle grille (frame pas prête, échantillonnage raté).
    Skipped,
    /// Nouvelle grille live publiée.
    Published(Arc<CharacterGrid>),
}

/// Pilote source → compositor → capture au rythme du `TickScheduler`.
///
/// Possède la source de façon exclusive ; `stop` (ou le drop) annule le tick
/// en attente avant de libérer le périphérique.
pub struct RenderLoop<S: VideoSource> {
    source: S,
    compositor: Compositor,
    scheduler: TickScheduler,
    pending: Option<TickHandle>,
    state: LoopState,
    stream: Option<StreamInfo>,
}

impl<S: VideoSource> RenderLoop<S> {
    #[must_use]
    pub fn new(source: S, target_fps: u32) -> Self {
        Self {
            source,
            compositor: Compositor::new(),
            scheduler: TickScheduler::new(target_fps),
            pending: None,
            state: LoopState::Stopped,
            stream: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    #[must_use]
    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some() && self.scheduler.is_pending()
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Flux négocié au dernier `start` réussi.
    #[must_use]
    pub fn stream(&self) -> Option<StreamInfo> {
        self.stream
    }

    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.scheduler.set_target_fps(target_fps);
    }

    /// Acquiert la source et planifie le premier tick.
    ///
    /// Déjà en marche : no-op.
    ///
    /// # Errors
    /// `CoreError::CameraUnavailable` ; la boucle reste alors `Stopped`, sans
    /// tick en attente ni nouvelle tentative automatique.
    pub fn start(&mut self, now: Instant) -> Result<(), CoreError> {
        if self.is_running() {
            return Ok(());
        }
        match self.source.acquire() {
            Ok(info) => {
                log::info!(
                    "Source {} active: {}x{}",
                    self.source.name(),
                    info.width,
                    info.height
                );
                self.stream = Some(info);
                self.state = LoopState::Running;
                self.pending = Some(self.scheduler.schedule(now));
                Ok(())
            }
            Err(e) => {
                log::warn!("Démarrage impossible ({}): {e}", self.source.name());
                self.source.release();
                self.state = LoopState::Stopped;
                self.pending = None;
                Err(e)
            }
        }
    }

    /// Temps avant le prochain tick, `None` si rien n'est planifié.
    #[must_use]
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        if self.is_running() {
            self.scheduler.time_until_due(now)
        } else {
            None
        }
    }

    /// Exécute le tick en attente s'il est échu.
    pub fn poll(
        &mut self,
        now: Instant,
        config: &RenderConfig,
        capture: &mut CaptureController,
    ) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        match self.scheduler.take_due(now) {
            Some(handle) if Some(handle) == self.pending => {
                self.pending = None;
                self.tick(now, config, capture)
            }
            _ => TickOutcome::Idle,
        }
    }

    /// Un tick : frame → grille → publication, puis replanification.
    ///
    /// La config est lue ici, donc tout changement s'applique au tick suivant
    /// sans toucher aux grilles déjà publiées.
    pub fn tick(
        &mut self,
        now: Instant,
        config: &RenderConfig,
        capture: &mut CaptureController,
    ) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }

        let outcome = match self.source.current_frame() {
            None => TickOutcome::Skipped,
            Some(frame) => match self.compositor.process(&frame, config) {
                Ok(grid) => {
                    let grid = Arc::new(grid);
                    capture.publish(Arc::clone(&grid));
                    TickOutcome::Published(grid)
                }
                Err(e) => {
                    log::warn!("Tick ignoré: {e}");
                    TickOutcome::Skipped
                }
            },
        };

        self.pending = Some(self.scheduler.schedule(now));
        outcome
    }

    /// Annule le tick en attente puis libère la source. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        if self.state == LoopState::Running {
            log::info!("Source {} arrêtée", self.source.name());
        }
        self.source.release();
        self.state = LoopState::Stopped;
    }
}

impl<S: VideoSource> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
