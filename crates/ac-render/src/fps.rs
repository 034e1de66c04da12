use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Cadence réelle des grilles publiées, sur une fenêtre glissante.
///
/// Les ticks sautés (frame pas prête) ne comptent pas comme images rendues
/// mais sont comptabilisés à part (ligne `Skip` du panneau latéral).
///
/// # Example
/// ```
/// use ac_render::fps::FpsCounter;
/// let mut counter = FpsCounter::new(30);
/// counter.record_frame();
/// counter.record_skip();
/// assert_eq!(counter.skipped(), 1);
/// assert!(counter.fps() >= 0.0);
/// ```
pub struct FpsCounter {
    /// Instants des dernières grilles publiées.
    stamps: VecDeque<Instant>,
    window: usize,
    fps: f64,
    last_interval: Duration,
    skipped: u64,
}

impl FpsCounter {
    /// `window` = nombre de grilles moyennées (au moins 2).
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            stamps: VecDeque::with_capacity(window + 1),
            window,
            fps: 0.0,
            last_interval: Duration::ZERO,
            skipped: 0,
        }
    }

    /// Appeler après chaque grille publiée.
    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    fn record_frame_at(&mut self, now: Instant) {
        if let Some(&last) = self.stamps.back() {
            self.last_interval = now.saturating_duration_since(last);
        }
        self.stamps.push_back(now);
        if self.stamps.len() > self.window {
            self.stamps.pop_front();
        }
        if let Some(&first) = self.stamps.front() {
            let secs = now.saturating_duration_since(first).as_secs_f64();
            if self.stamps.len() >= 2 && secs > 0.0 {
                self.fps = (self.stamps.len() - 1) as f64 / secs;
            }
        }
    }

    /// Tick sans nouvelle frame caméra.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Oublie l'historique (caméra relancée).
    pub fn reset(&mut self) {
        self.stamps.clear();
        self.fps = 0.0;
        self.last_interval = Duration::ZERO;
        self.skipped = 0;
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Intervalle entre les deux dernières grilles, en millisecondes.
    #[must_use]
    pub fn frame_time_ms(&self) -> f64 {
        self.last_interval.as_secs_f64() * 1000.0
    }

    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_cadence_is_measured() {
        let mut counter = FpsCounter::new(5);
        let start = Instant::now();
        for i in 0..10u64 {
            counter.record_frame_at(start + Duration::from_millis(i * 20));
        }
        assert!((counter.fps() - 50.0).abs() < 0.5);
        assert!((counter.frame_time_ms() - 20.0).abs() < 0.01);
    }

    #[test]
    fn single_frame_has_no_rate() {
        let mut counter = FpsCounter::new(5);
        counter.record_frame();
        assert!(counter.fps().abs() < f64::EPSILON);
    }

    #[test]
    fn reset_clears_everything() {
        let mut counter = FpsCounter::new(5);
        let start = Instant::now();
        counter.record_frame_at(start);
        counter.record_frame_at(start + Duration::from_millis(10));
        counter.record_skip();
        counter.reset();
        assert!(counter.fps().abs() < f64::EPSILON);
        assert_eq!(counter.skipped(), 0);
    }
}
