use ac_core::frame::CharacterGrid;

use crate::rasterizer::GlyphPainter;

/// Interligne relatif à la taille de police.
pub const LINE_HEIGHT_RATIO: f32 = 0.55;
/// Marge autour du bloc de texte, en pixels.
pub const PADDING_PX: f32 = 40.0;
/// Espacement entre glyphes par défaut, en pixels.
pub const DEFAULT_LETTER_SPACING: f32 = -1.0;

/// Géométrie d'un export, calculée avant toute allocation de surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub line_count: u32,
    pub max_line_width: f32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// Largeur mesurée d'une ligne : somme des avances plus l'espacement par glyphe.
pub fn line_width<P: GlyphPainter + ?Sized>(
    painter: &P,
    line: &[char],
    font_size: f32,
    letter_spacing: f32,
) -> f32 {
    line.iter()
        .map(|&ch| painter.advance(ch, font_size) + letter_spacing)
        .sum()
}

/// Mesure `grid` et en déduit la taille du canvas (arrondie au pixel supérieur).
///
/// `None` pour une grille sans ligne.
pub fn measure<P: GlyphPainter + ?Sized>(
    painter: &P,
    grid: &CharacterGrid,
    font_size: f32,
    letter_spacing: f32,
) -> Option<ExportLayout> {
    if grid.is_empty() {
        return None;
    }
    let line_height = font_size * LINE_HEIGHT_RATIO;
    let max_line_width = grid
        .rows()
        .map(|row| line_width(painter, row, font_size, letter_spacing))
        .fold(0.0f32, f32::max);
    let line_count = grid.height();

    let width = (max_line_width + 2.0 * PADDING_PX).ceil().max(0.0);
    let height = (line_count as f32 * line_height + 2.0 * PADDING_PX).ceil();
    Some(ExportLayout {
        font_size,
        line_height,
        letter_spacing,
        line_count,
        max_line_width,
        canvas_width: width as u32,
        canvas_height: height as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::tests::FixedPainter;

    fn grid(lines: &[&str]) -> CharacterGrid {
        CharacterGrid::from_lines(lines).unwrap()
    }

    #[test]
    fn three_lines_at_twelve_px_is_one_hundred_high() {
        let g = grid(&["@@@@@@@@@@", "..........", " :-=+*#%@ "]);
        let layout = measure(&FixedPainter, &g, 12.0, DEFAULT_LETTER_SPACING).unwrap();
        assert!((layout.line_height - 6.6).abs() < 1e-5);
        assert_eq!(layout.line_count, 3);
        assert_eq!(layout.canvas_height, 100);
        // 10 × (7.2 - 1)
        assert!((layout.max_line_width - 62.0).abs() < 1e-3);
        assert!(layout.canvas_width as f32 >= layout.max_line_width + 80.0);
    }

    #[test]
    fn width_follows_longest_line() {
        let g = grid(&["@@", "@@"]);
        let short = measure(&FixedPainter, &g, 10.0, 0.0).unwrap();
        let g = grid(&["@@@@", "@@@@"]);
        let long = measure(&FixedPainter, &g, 10.0, 0.0).unwrap();
        assert!(long.canvas_width > short.canvas_width);
        assert_eq!(long.canvas_width, 24 + 80);
    }

    #[test]
    fn empty_grid_has_no_layout() {
        assert!(measure(&FixedPainter, &CharacterGrid::empty(), 12.0, -1.0).is_none());
    }
}
