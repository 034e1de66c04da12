/// PNG export of character grids (text metrics, glyph rasterization, encoding).

pub mod artifact;
pub mod metrics;
pub mod rasterizer;

use ac_core::error::CoreError;
use ac_core::frame::CharacterGrid;
use image::{Rgba, RgbaImage};

pub use artifact::ExportArtifact;
use metrics::{DEFAULT_LETTER_SPACING, ExportLayout, PADDING_PX, measure};
pub use rasterizer::{FontPainter, GlyphAtlas, GlyphBitmap, GlyphPainter};

/// Côté maximal d'un canvas d'export, en pixels.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Rend une grille en PNG : fond noir, texte blanc, marge fixe.
///
/// Indépendant du rendu terminal ; seule la grille affichée est lue.
pub struct ExportRenderer<P: GlyphPainter = FontPainter> {
    painter: P,
    letter_spacing: f32,
}

impl<P: GlyphPainter> ExportRenderer<P> {
    #[must_use]
    pub fn new(painter: P) -> Self {
        Self {
            painter,
            letter_spacing: DEFAULT_LETTER_SPACING,
        }
    }

    #[must_use]
    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    #[must_use]
    pub fn painter(&self) -> &P {
        &self.painter
    }

    /// Mesure sans rasteriser.
    #[must_use]
    pub fn layout(&self, grid: &CharacterGrid, font_size: u32) -> Option<ExportLayout> {
        measure(&self.painter, grid, font_size as f32, self.letter_spacing)
    }

    /// Rasterise `grid` en PNG.
    ///
    /// `Ok(None)` pour une grille vide : rien à exporter.
    ///
    /// # Errors
    /// `CoreError::RenderSurfaceUnavailable` si le canvas est nul, trop grand,
    /// ou si l'encodage PNG échoue.
    pub fn render(
        &self,
        grid: &CharacterGrid,
        font_size: u32,
    ) -> Result<Option<ExportArtifact>, CoreError> {
        let Some(layout) = self.layout(grid, font_size) else {
            log::debug!("Export ignoré: grille vide");
            return Ok(None);
        };
        let (width, height) = (layout.canvas_width, layout.canvas_height);
        if width == 0 || height == 0 || width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return Err(CoreError::RenderSurfaceUnavailable(format!(
                "canvas {width}x{height}"
            )));
        }

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        self.draw_text(&mut canvas, grid, &layout);

        let png = artifact::encode_png(&canvas)?;
        Ok(Some(ExportArtifact {
            width_px: width,
            height_px: height,
            png,
            filename: artifact::timestamped_filename(),
        }))
    }

    fn draw_text(&self, canvas: &mut RgbaImage, grid: &CharacterGrid, layout: &ExportLayout) {
        let mut atlas = GlyphAtlas::new(&self.painter, layout.font_size);
        let ascent = self.painter.ascent(layout.font_size);

        for (i, row) in grid.rows().enumerate() {
            // Haut de ligne aligné sur `top`, comme un textBaseline "top".
            let top = PADDING_PX + i as f32 * layout.line_height;
            let baseline = (top + ascent).round() as i32;
            let mut pen_x = PADDING_PX;
            for &ch in row {
                let glyph = atlas.glyph(ch);
                blit_white(canvas, glyph, pen_x.round() as i32, baseline);
                pen_x += self.painter.advance(ch, layout.font_size) + layout.letter_spacing;
            }
        }
        log::debug!(
            "Export: {} lignes, {} glyphes distincts",
            layout.line_count,
            atlas.len()
        );
    }
}

/// Compose un glyphe blanc sur le canvas (alpha blending source-over).
fn blit_white(canvas: &mut RgbaImage, glyph: &GlyphBitmap, pen_x: i32, baseline: i32) {
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    let x0 = pen_x + glyph.left;
    let y0 = baseline + glyph.top;
    for gy in 0..glyph.height as i32 {
        let y = y0 + gy;
        if y < 0 || y >= ch {
            continue;
        }
        for gx in 0..glyph.width as i32 {
            let x = x0 + gx;
            if x < 0 || x >= cw {
                continue;
            }
            let coverage = glyph.coverage[(gy * glyph.width as i32 + gx) as usize];
            if coverage == 0 {
                continue;
            }
            let alpha = u32::from(coverage);
            let px = canvas.get_pixel_mut(x as u32, y as u32);
            for c in &mut px.0[..3] {
                let dst = u32::from(*c);
                *c = (dst + ((255 - dst) * alpha + 127) / 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::tests::FixedPainter;

    fn ten_by_three() -> CharacterGrid {
        CharacterGrid::from_lines(&["@@@@@@@@@@", "@ @ @ @ @ ", "          "]).unwrap()
    }

    #[test]
    fn render_dimensions_match_layout() {
        let renderer = ExportRenderer::new(FixedPainter);
        let artifact = renderer.render(&ten_by_three(), 12).unwrap().unwrap();
        assert_eq!(artifact.height_px, 100);
        assert!(artifact.width_px as f32 >= 62.0 + 80.0);
        assert!(artifact.filename.starts_with("ascii-cam-"));

        let decoded = image::load_from_memory(&artifact.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (artifact.width_px, artifact.height_px));
    }

    #[test]
    fn background_is_black_and_glyphs_are_white() {
        let renderer = ExportRenderer::new(FixedPainter);
        let artifact = renderer.render(&ten_by_three(), 12).unwrap().unwrap();
        let img = image::load_from_memory(&artifact.png).unwrap().to_rgba8();

        // Coin : marge noire.
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        // Premier '@' : bloc 6x6 dont le bas est sur la ligne de base (40 + 9.6).
        assert_eq!(img.get_pixel(42, 47).0, [255, 255, 255, 255]);
        let lit = img.pixels().filter(|p| p.0[0] == 255).count();
        assert!(lit > 0);
    }

    #[test]
    fn empty_grid_exports_nothing() {
        let renderer = ExportRenderer::new(FixedPainter);
        assert!(renderer.render(&CharacterGrid::empty(), 12).unwrap().is_none());
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let line = "@".repeat(5000);
        let grid = CharacterGrid::from_lines(&[line.as_str()]).unwrap();
        let renderer = ExportRenderer::new(FixedPainter).with_letter_spacing(0.0);
        assert!(matches!(
            renderer.render(&grid, 24),
            Err(CoreError::RenderSurfaceUnavailable(_))
        ));
    }
}
