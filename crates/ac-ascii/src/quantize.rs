use ac_core::charset::DensityProfile;
use ac_core::frame::{CharacterGrid, LuminanceGrid};

/// Marge sous une frontière d'index, en unités d'index.
///
/// Deux frontières distinctes de `somme * (len - 1) / 765` sont écartées d'au
/// moins 1/765 ; l'erreur f32 sur `somme / 3` reste sous 1e-5.
const BOUNDARY_EPSILON: f64 = 1e-4;

/// Map a luminance value [0, 255] to a glyph index in a ramp of `len` glyphs.
///
/// `floor((luminance / 255) * (len - 1))`, clamped to `[0, len - 1]`.
/// Pas de dithering ni de diffusion d'erreur. NaN → 0.
///
/// Calcul en f64 avec une tolérance `BOUNDARY_EPSILON` : une moyenne de trois
/// canaux (`somme / 3`) arrondie en f32 juste sous une frontière entière
/// retombe sur l'index exact `somme * (len - 1) / 765`.
///
/// # Example
/// ```
/// use ac_ascii::quantize::quantize;
/// assert_eq!(quantize(0.0, 10), 0);
/// assert_eq!(quantize(255.0, 10), 9);
/// assert_eq!(quantize(127.5, 10), 4);
/// assert_eq!(quantize(300.0, 10), 9);
/// ```
#[inline(always)]
#[must_use]
pub fn quantize(luminance: f32, len: usize) -> usize {
    let max = len.saturating_sub(1);
    let scaled = f64::from(luminance) * max as f64 / 255.0;
    if scaled.is_nan() || scaled <= 0.0 {
        return 0;
    }
    ((scaled + BOUNDARY_EPSILON).floor() as usize).min(max)
}

/// Convertit une grille de luminance en grille de glyphes avec le profil donné.
///
/// # Example
/// ```
/// use ac_ascii::quantize::map_grid;
/// use ac_core::charset::DensityProfile;
/// use ac_core::frame::LuminanceGrid;
///
/// let mut lum = LuminanceGrid::new(2, 1);
/// lum.set(1, 0, 255.0);
/// let grid = map_grid(&lum, &DensityProfile::builtin(0));
/// assert_eq!(grid.to_text(), " @\n");
/// ```
#[must_use]
pub fn map_grid(luminance: &LuminanceGrid, profile: &DensityProfile) -> CharacterGrid {
    let len = profile.len();
    let glyphs: Vec<char> = luminance
        .values
        .iter()
        .map(|&v| profile.glyph(quantize(v, len)))
        .collect();
    CharacterGrid::from_glyphs(luminance.width, luminance.height, glyphs)
        .unwrap_or_else(CharacterGrid::empty)
}
