use ac_core::charset::DensityProfile;
use ac_core::config::RenderConfig;
use ac_core::error::CoreError;
use ac_core::frame::{CharacterGrid, FrameBuffer};

use crate::quantize::map_grid;
use crate::sampler::FrameSampler;

/// Compositor enchaîne échantillonnage → quantification pour un tick.
///
/// Le profil est relu depuis la config à chaque appel : un changement de
/// `profile_index` ou de `width` s'applique au tick suivant, jamais aux
/// grilles déjà produites.
///
/// # Example
/// ```
/// use ac_ascii::compositor::Compositor;
/// use ac_core::config::RenderConfig;
/// use ac_core::frame::FrameBuffer;
///
/// let mut compositor = Compositor::new();
/// let frame = FrameBuffer::filled(320, 240, (0, 0, 0));
/// let grid = compositor.process(&frame, &RenderConfig::default()).unwrap();
/// assert_eq!((grid.width(), grid.height()), (160, 120));
/// ```
pub struct Compositor {
    sampler: FrameSampler,
    profile: DensityProfile,
    current_index: usize,
}

impl Compositor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sampler: FrameSampler::new(),
            profile: DensityProfile::builtin(0),
            current_index: 0,
        }
    }

    /// Update the cached profile if the index has changed.
    pub fn update_if_needed(&mut self, profile_index: usize) {
        if self.current_index != profile_index {
            self.profile = DensityProfile::builtin(profile_index);
            self.current_index = profile_index;
            log::debug!("compositor: profil actif = {}", self.profile.name());
        }
    }

    /// Profil utilisé par le dernier `process`.
    #[must_use]
    pub fn profile(&self) -> &DensityProfile {
        &self.profile
    }

    /// Convert one frame into a fresh character grid.
    ///
    /// # Errors
    /// Propagates sampling failures (`RenderSurfaceUnavailable`, `InvalidDimensions`).
    pub fn process(
        &mut self,
        frame: &FrameBuffer,
        config: &RenderConfig,
    ) -> Result<CharacterGrid, CoreError> {
        self.update_if_needed(config.profile_index);
        let luminance = self.sampler.sample(frame, config.width)?;
        Ok(map_grid(&luminance, &self.profile))
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_frame_maps_to_brightest_glyph_of_each_profile() {
        let mut compositor = Compositor::new();
        let frame = FrameBuffer::filled(200, 100, (255, 255, 255));
        for (index, expected) in [(0usize, '@'), (1, '$'), (2, '█')] {
            let config = RenderConfig {
                width: 60,
                font_size: 12,
                profile_index: index,
            };
            let grid = compositor.process(&frame, &config).unwrap();
            assert_eq!(grid.height(), 30);
            assert!(grid.rows().all(|row| row.iter().all(|&c| c == expected)));
        }
    }

    #[test]
    fn boosted_mean_on_index_boundary_picks_upper_glyph() {
        // Contraste : 175, 175, 174 → 199 + 199 + 197 = 595, 595 * 9 / 765 = 7.
        let mut compositor = Compositor::new();
        let frame = FrameBuffer::filled(120, 60, (175, 175, 174));
        let config = RenderConfig {
            width: 60,
            ..RenderConfig::default()
        };
        let grid = compositor.process(&frame, &config).unwrap();
        assert!(grid.rows().all(|row| row.iter().all(|&c| c == '%')));
    }

    #[test]
    fn profile_change_does_not_touch_previous_grid() {
        let mut compositor = Compositor::new();
        let frame = FrameBuffer::filled(120, 60, (255, 255, 255));
        let mut config = RenderConfig {
            width: 60,
            ..RenderConfig::default()
        };
        let first = compositor.process(&frame, &config).unwrap();
        config.profile_index = 2;
        let second = compositor.process(&frame, &config).unwrap();
        assert!(first.rows().all(|row| row.iter().all(|&c| c == '@')));
        assert!(second.rows().all(|row| row.iter().all(|&c| c == '█')));
    }
}
