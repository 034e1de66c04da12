use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use ac_core::error::CoreError;

/// Polices monospace usuelles, essayées dans l'ordre si aucune n'est configurée.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Couverture alpha d'un glyphe, positionnée relativement au point
/// (stylo, ligne de base).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphBitmap {
    /// Décalage horizontal du coin haut-gauche depuis le stylo.
    pub left: i32,
    /// Décalage vertical du coin haut-gauche depuis la ligne de base (négatif = au-dessus).
    pub top: i32,
    pub width: u32,
    pub height: u32,
    /// Coverage 0..=255, row-major, `width * height`.
    pub coverage: Vec<u8>,
}

/// Mesure et rasterise des glyphes à une taille donnée (en pixels par em).
///
/// Implémenté par `FontPainter` ; les tests utilisent une police factice à
/// avance fixe.
pub trait GlyphPainter {
    /// Avance horizontale de `ch` en pixels.
    fn advance(&self, ch: char, size: f32) -> f32;

    /// Distance ligne de base ← haut de la boîte em, en pixels.
    fn ascent(&self, size: f32) -> f32;

    /// Rasterise `ch`. Un glyphe sans contour (espace) donne un bitmap vide.
    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap;
}

/// Police TrueType chargée depuis le disque.
pub struct FontPainter {
    font: FontVec,
    path: PathBuf,
}

impl FontPainter {
    /// Charge la police à `path`.
    ///
    /// # Errors
    /// `CoreError::FontUnavailable` si le fichier est absent ou n'est pas une police.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let unavailable = || CoreError::FontUnavailable {
            path: path.display().to_string(),
        };
        let data = std::fs::read(path).map_err(|e| {
            log::warn!("Lecture police {} impossible: {e}", path.display());
            unavailable()
        })?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            log::warn!("Police {} invalide: {e}", path.display());
            unavailable()
        })?;
        log::info!("Police d'export: {}", path.display());
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// Charge la police configurée, sinon la première police système trouvée.
    ///
    /// # Errors
    /// `CoreError::FontUnavailable` si aucune police n'est utilisable.
    pub fn discover(configured: Option<&Path>) -> Result<Self, CoreError> {
        if let Some(path) = configured {
            return Self::load(path);
        }
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .filter(|p| p.is_file())
            .find_map(|p| Self::load(p).ok())
            .ok_or_else(|| CoreError::FontUnavailable {
                path: "(aucune police monospace système)".to_string(),
            })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Échelle ab_glyph telle qu'un em mesure `size` pixels.
    fn scale(&self, size: f32) -> PxScale {
        let upem = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / upem)
    }
}

impl GlyphPainter for FontPainter {
    fn advance(&self, ch: char, size: f32) -> f32 {
        let scaled = self.font.as_scaled(self.scale(size));
        scaled.h_advance(scaled.glyph_id(ch))
    }

    fn ascent(&self, size: f32) -> f32 {
        self.font.as_scaled(self.scale(size)).ascent()
    }

    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap {
        let glyph = self
            .font
            .glyph_id(ch)
            .with_scale_and_position(self.scale(size), point(0.0, 0.0));
        let Some(outline) = self.font.outline_glyph(glyph) else {
            return GlyphBitmap::default();
        };
        let bounds = outline.px_bounds();
        let width = bounds.width().max(0.0) as u32;
        let height = bounds.height().max(0.0) as u32;
        let mut coverage = vec![0u8; (width * height) as usize];
        outline.draw(|x, y, v| {
            if x < width && y < height {
                coverage[(y * width + x) as usize] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });
        GlyphBitmap {
            left: bounds.min.x as i32,
            top: bounds.min.y as i32,
            width,
            height,
            coverage,
        }
    }
}

/// Cache des glyphes rasterisés pour un export (un profil = au plus 70 glyphes).
pub struct GlyphAtlas<'a, P: GlyphPainter + ?Sized> {
    painter: &'a P,
    size: f32,
    glyphs: HashMap<char, GlyphBitmap>,
}

impl<'a, P: GlyphPainter + ?Sized> GlyphAtlas<'a, P> {
    pub fn new(painter: &'a P, size: f32) -> Self {
        Self {
            painter,
            size,
            glyphs: HashMap::new(),
        }
    }

    pub fn glyph(&mut self, ch: char) -> &GlyphBitmap {
        let (painter, size) = (self.painter, self.size);
        self.glyphs
            .entry(ch)
            .or_insert_with(|| painter.rasterize(ch, size))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Police factice : avance = 0.6 em, chaque glyphe non-espace est un bloc plein.
    pub(crate) struct FixedPainter;

    impl GlyphPainter for FixedPainter {
        fn advance(&self, _ch: char, size: f32) -> f32 {
            size * 0.6
        }

        fn ascent(&self, size: f32) -> f32 {
            size * 0.8
        }

        fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap {
            if ch == ' ' {
                return GlyphBitmap::default();
            }
            let width = (size * 0.5) as u32;
            let height = (size * 0.5) as u32;
            GlyphBitmap {
                left: 0,
                top: -(height as i32),
                width,
                height,
                coverage: vec![255; (width * height) as usize],
            }
        }
    }

    #[test]
    fn atlas_rasterizes_each_glyph_once() {
        let painter = FixedPainter;
        let mut atlas = GlyphAtlas::new(&painter, 12.0);
        for ch in "@@@..@ ".chars() {
            atlas.glyph(ch);
        }
        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.glyph('@').width, 6);
        assert!(atlas.glyph(' ').coverage.is_empty());
    }

    #[test]
    fn missing_font_file_is_font_unavailable() {
        let result = FontPainter::load(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(CoreError::FontUnavailable { .. })));
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            FontPainter::load(&path),
            Err(CoreError::FontUnavailable { .. })
        ));
    }

    #[test]
    fn system_font_metrics_are_sane_when_present() {
        // Sans police système, seule l'erreur typée est attendue.
        match FontPainter::discover(None) {
            Ok(font) => {
                let adv = font.advance('M', 12.0);
                assert!(adv > 2.0 && adv < 12.0, "avance {adv}");
                assert!(font.ascent(12.0) > 0.0);
                let bitmap = font.rasterize('@', 24.0);
                assert!(bitmap.coverage.iter().any(|&c| c > 0));
                assert!(bitmap.top < 0);
            }
            Err(e) => assert!(matches!(e, CoreError::FontUnavailable { .. })),
        }
    }
}
