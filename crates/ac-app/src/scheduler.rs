use std::time::{Duration, Instant};

/// Bornes de la cadence d'affichage.
pub const MIN_FPS: u32 = 15;
pub const MAX_FPS: u32 = 120;

/// Jeton d'annulation d'un tick planifié.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Planificateur à un seul tick en attente, cadencé sur le rafraîchissement.
///
/// Un tick n'est planifié qu'après l'exécution du précédent : il n'y a
/// jamais deux ticks en vol.
pub struct TickScheduler {
    interval: Duration,
    pending: Option<(TickHandle, Instant)>,
    next_id: u64,
}

impl TickScheduler {
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: interval_for(target_fps),
            pending: None,
            next_id: 0,
        }
    }

    /// Change la cadence ; s'applique au prochain `schedule`.
    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.interval = interval_for(target_fps);
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Planifie le prochain tick une période après `now`.
    ///
    /// Remplace un éventuel tick encore en attente.
    pub fn schedule(&mut self, now: Instant) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some((handle, now + self.interval));
        handle
    }

    /// Annule `handle` s'il est toujours en attente.
    pub fn cancel(&mut self, handle: TickHandle) -> bool {
        match self.pending {
            Some((pending, _)) if pending == handle => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Retire et retourne le tick en attente s'il est échu.
    pub fn take_due(&mut self, now: Instant) -> Option<TickHandle> {
        match self.pending {
            Some((handle, due)) if due <= now => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }

    /// Temps restant avant le tick en attente (zéro s'il est échu).
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, due)| due.saturating_duration_since(now))
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn interval_for(target_fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(target_fps.clamp(MIN_FPS, MAX_FPS)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_becomes_due_after_one_interval() {
        let mut scheduler = TickScheduler::new(50);
        let t0 = Instant::now();
        let handle = scheduler.schedule(t0);
        assert_eq!(scheduler.take_due(t0 + Duration::from_millis(10)), None);
        assert!(scheduler.is_pending());
        assert_eq!(
            scheduler.take_due(t0 + Duration::from_millis(20)),
            Some(handle)
        );
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.take_due(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn cancelled_tick_never_fires() {
        let mut scheduler = TickScheduler::new(60);
        let t0 = Instant::now();
        let handle = scheduler.schedule(t0);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.take_due(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn stale_handle_does_not_cancel_newer_tick() {
        let mut scheduler = TickScheduler::new(60);
        let t0 = Instant::now();
        let old = scheduler.schedule(t0);
        let new = scheduler.schedule(t0);
        assert_ne!(old, new);
        assert!(!scheduler.cancel(old));
        assert!(scheduler.is_pending());
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(TickScheduler::new(1).interval(), TickScheduler::new(MIN_FPS).interval());
        assert_eq!(
            TickScheduler::new(10_000).interval(),
            TickScheduler::new(MAX_FPS).interval()
        );
    }

    #[test]
    fn time_until_due_saturates() {
        let mut scheduler = TickScheduler::new(20);
        let t0 = Instant::now();
        assert_eq!(scheduler.time_until_due(t0), None);
        scheduler.schedule(t0);
        assert_eq!(
            scheduler.time_until_due(t0 + Duration::from_secs(5)),
            Some(Duration::ZERO)
        );
    }
}
