use std::sync::Arc;
use std::time::{Duration, Instant};

use ac_core::capture::CaptureController;
use ac_core::config::Settings;
use ac_core::error::CoreError;
use ac_core::traits::VideoSource;
use ac_export::{ExportRenderer, FontPainter};
use ac_render::fps::FpsCounter;
use ac_render::ui::{DrawContext, ViewState};
use anyhow::Result;
use arc_swap::ArcSwap;
use crossterm::event::{self, Event, KeyEvent};
use ratatui::DefaultTerminal;

use crate::hotreload::update_settings;
use crate::keys::{Action, ShortcutSubscription, map_key};
use crate::render_loop::{RenderLoop, TickOutcome};

/// Attente max d'un événement quand aucun tick n'est planifié.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Application state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    /// Boucle normale.
    Running,
    /// Overlay d'aide affiché (touche ?).
    Help,
    /// Fermeture demandée ; sortie au prochain tour de boucle.
    Quitting,
}

/// Dérive l'état visible de l'état de la boucle et de la capture.
#[must_use]
pub fn view_state(running: bool, capture: &CaptureController) -> ViewState {
    if capture.is_frozen() {
        ViewState::Frozen
    } else if running {
        ViewState::Live
    } else {
        ViewState::Inactive
    }
}

/// Main application struct holding all state.
pub struct App<S: VideoSource> {
    pub state: AppState,
    /// Config courante (lecture via arc-swap, écrite par les touches et le hot reload).
    pub settings: Arc<ArcSwap<Settings>>,
    render_loop: RenderLoop<S>,
    capture: CaptureController,
    /// Présent uniquement tant que la boucle de rendu tourne.
    shortcuts: Option<ShortcutSubscription>,
    /// Construit au premier export (chargement de la police).
    exporter: Option<ExportRenderer>,
    fps_counter: FpsCounter,
    status: Option<String>,
    needs_redraw: bool,
}

impl<S: VideoSource> App<S> {
    #[must_use]
    pub fn new(settings: Arc<ArcSwap<Settings>>, source: S) -> Self {
        let target_fps = settings.load().display.target_fps;
        Self {
            state: AppState::Running,
            settings,
            render_loop: RenderLoop::new(source, target_fps),
            capture: CaptureController::new(),
            shortcuts: None,
            exporter: None,
            fps_counter: FpsCounter::new(60),
            status: None,
            needs_redraw: true,
        }
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        view_state(self.render_loop.is_running(), &self.capture)
    }

    /// Démarre la caméra. Échec = état inactif + message, sans nouvelle tentative.
    pub fn activate(&mut self) {
        match self.render_loop.start(Instant::now()) {
            Ok(()) => {
                self.shortcuts = Some(ShortcutSubscription::subscribe());
                self.fps_counter.reset();
                self.status = None;
            }
            Err(e) => {
                self.shortcuts = None;
                self.status = Some(e.to_string());
            }
        }
        self.needs_redraw = true;
    }

    /// Arrête la caméra : abonnement clavier retiré, tick annulé, source libérée.
    pub fn deactivate(&mut self) {
        self.shortcuts = None;
        self.render_loop.stop();
        self.capture.clear_live();
        self.needs_redraw = true;
    }

    /// Main event loop, paced by the render loop's tick scheduler.
    ///
    /// # Errors
    /// Returns an error if terminal operations fail.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            if self.state == AppState::Quitting {
                break;
            }

            let now = Instant::now();
            let timeout = self.render_loop.time_until_tick(now).unwrap_or(IDLE_POLL);
            if event::poll(timeout)? {
                self.handle_event(&event::read()?);
                while event::poll(Duration::ZERO)? {
                    self.handle_event(&event::read()?);
                }
            }

            let settings = self.settings.load();
            self.render_loop.set_target_fps(settings.display.target_fps);
            match self
                .render_loop
                .poll(Instant::now(), &settings.render, &mut self.capture)
            {
                TickOutcome::Published(_) => {
                    self.fps_counter.record_frame();
                    self.needs_redraw = true;
                }
                TickOutcome::Skipped => self.fps_counter.record_skip(),
                TickOutcome::Idle => {}
            }

            if self.needs_redraw {
                let view = self.view();
                let ctx = DrawContext {
                    grid: self.capture.displayed_grid().map(|g| &**g),
                    config: &settings.render,
                    view,
                    fps: &self.fps_counter,
                    source: self.render_loop.source_name(),
                    status: self.status.as_deref(),
                    show_help: self.state == AppState::Help,
                };
                terminal.draw(|frame| ac_render::ui::draw(frame, &ctx))?;
                self.needs_redraw = false;
            }
        }

        self.deactivate();
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) => {
                if let Some(action) = self.action_for(key) {
                    self.apply(action);
                }
            }
            Event::Resize(..) => self.needs_redraw = true,
            _ => {}
        }
    }

    fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        self.shortcuts
            .as_ref()
            .and_then(|s| s.handle(key))
            .or_else(|| map_key(key))
    }

    /// Applique une action clavier.
    pub fn apply(&mut self, action: Action) {
        self.needs_redraw = true;
        if self.state == AppState::Help {
            match action {
                Action::ToggleHelp | Action::Quit => self.state = AppState::Running,
                _ => {}
            }
            return;
        }
        match action {
            Action::Capture => {
                if self.capture.capture() {
                    log::info!("Grille figée");
                }
            }
            Action::Reset => {
                self.capture.reset();
            }
            Action::Export => self.export(),
            Action::ToggleCamera => {
                if self.render_loop.is_running() {
                    self.deactivate();
                } else {
                    self.activate();
                }
            }
            Action::StepWidth(steps) => {
                update_settings(&self.settings, |s| s.render.step_width(steps));
            }
            Action::StepFontSize(delta) => {
                update_settings(&self.settings, |s| s.render.step_font_size(delta));
            }
            Action::SelectProfile(index) => {
                update_settings(&self.settings, |s| s.render.profile_index = index);
            }
            Action::NextProfile => update_settings(&self.settings, |s| s.render.cycle_profile()),
            Action::ToggleHelp => self.state = AppState::Help,
            Action::Quit => self.state = AppState::Quitting,
        }
    }

    /// Renderer d'export, reconstruit si la police configurée a changé.
    fn exporter(&mut self, settings: &Settings) -> Result<&ExportRenderer, CoreError> {
        let configured = settings.export.font_path.as_deref();
        let cached = self
            .exporter
            .take()
            .filter(|e| configured.is_none_or(|p| p == e.painter().path()));
        let renderer = match cached {
            Some(renderer) => renderer,
            None => ExportRenderer::new(FontPainter::discover(configured)?),
        };
        let renderer = renderer.with_letter_spacing(settings.export.letter_spacing);
        Ok(&*self.exporter.insert(renderer))
    }

    /// Exporte la grille affichée (figée sinon live) en PNG.
    fn export(&mut self) {
        let Some(grid) = self.capture.displayed_grid().map(Arc::clone) else {
            self.status = Some("Nothing to export".to_string());
            return;
        };
        let settings = self.settings.load_full();
        let outcome = self
            .exporter(&settings)
            .and_then(|exporter| exporter.render(&grid, settings.render.font_size));
        self.status = Some(match outcome {
            Ok(Some(artifact)) => match artifact.save_to(&settings.export.directory) {
                Ok(path) => format!("Saved {}", path.display()),
                Err(e) => {
                    log::warn!("Export: {e:#}");
                    format!("Export failed: {e}")
                }
            },
            Ok(None) => "Nothing to export".to_string(),
            Err(e) => {
                log::warn!("Export: {e}");
                format!("Export failed: {e}")
            }
        });
    }

    #[must_use]
    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    #[must_use]
    pub fn has_shortcuts(&self) -> bool {
        self.shortcuts.is_some()
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Avance la boucle de rendu d'un tick, hors terminal.
    pub fn step(&mut self, now: Instant) -> TickOutcome {
        let settings = self.settings.load();
        self.render_loop.tick(now, &settings.render, &mut self.capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::error::CameraFailure;
    use ac_core::frame::FrameBuffer;
    use ac_core::traits::StreamInfo;
    use ac_source::image::ImageSource;

    struct DeniedCamera;

    impl VideoSource for DeniedCamera {
        fn acquire(&mut self) -> Result<StreamInfo, CoreError> {
            Err(CoreError::CameraUnavailable(CameraFailure::PermissionDenied))
        }
        fn current_frame(&mut self) -> Option<FrameBuffer> {
            None
        }
        fn release(&mut self) {}
        fn is_acquired(&self) -> bool {
            false
        }
    }

    fn settings() -> Arc<ArcSwap<Settings>> {
        let mut s = Settings::default();
        s.render.width = 60;
        Arc::new(ArcSwap::from_pointee(s))
    }

    fn gray_app() -> App<ImageSource> {
        App::new(
            settings(),
            ImageSource::from_frame(FrameBuffer::filled(120, 90, (255, 255, 255))),
        )
    }

    #[test]
    fn camera_failure_stays_inactive() {
        let mut app = App::new(settings(), DeniedCamera);
        app.activate();
        assert_eq!(app.view(), ViewState::Inactive);
        assert!(!app.has_shortcuts());
        assert!(app.status().is_some());
        assert!(matches!(app.step(Instant::now()), TickOutcome::Idle));
        app.apply(Action::Export);
        assert_eq!(app.status(), Some("Nothing to export"));
    }

    #[test]
    fn capture_freeze_then_reset() {
        let mut app = gray_app();
        app.activate();
        assert!(app.has_shortcuts());
        assert!(matches!(app.step(Instant::now()), TickOutcome::Published(_)));
        assert_eq!(app.view(), ViewState::Live);

        app.apply(Action::Capture);
        assert_eq!(app.view(), ViewState::Frozen);

        // Caméra coupée : la grille figée reste affichée.
        app.apply(Action::ToggleCamera);
        assert!(!app.has_shortcuts());
        assert_eq!(app.view(), ViewState::Frozen);

        app.apply(Action::Reset);
        assert_eq!(app.view(), ViewState::Inactive);
        assert!(app.capture().displayed_grid().is_none());
    }

    #[test]
    fn settings_keys_update_shared_config() {
        let mut app = gray_app();
        app.apply(Action::StepWidth(1));
        app.apply(Action::StepFontSize(-1));
        app.apply(Action::SelectProfile(2));
        let s = app.settings.load();
        assert_eq!(s.render.width, 64);
        assert_eq!(s.render.font_size, 11);
        assert_eq!(s.render.profile_index, 2);
    }

    #[test]
    fn help_swallows_other_actions() {
        let mut app = gray_app();
        app.apply(Action::ToggleHelp);
        assert_eq!(app.state, AppState::Help);
        app.apply(Action::StepWidth(1));
        assert_eq!(app.settings.load().render.width, 60);
        app.apply(Action::Quit);
        assert_eq!(app.state, AppState::Running);
        app.apply(Action::Quit);
        assert_eq!(app.state, AppState::Quitting);
    }
}
