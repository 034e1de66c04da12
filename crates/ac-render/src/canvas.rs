use ac_core::frame::CharacterGrid;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

/// Écrit directement une `CharacterGrid` dans un `ratatui::Buffer`.
///
/// Texte blanc sur noir, ancré en haut à gauche ; ce qui dépasse de `area`
/// est rogné. Pas de widget Canvas ratatui : écriture cellule par cellule.
///
/// # Example
/// ```
/// use ac_core::frame::CharacterGrid;
/// use ac_render::canvas::render_grid;
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
///
/// let grid = CharacterGrid::from_lines(&["@.", ".@"]).unwrap();
/// let area = Rect::new(0, 0, 4, 2);
/// let mut buf = Buffer::empty(area);
/// render_grid(&mut buf, area, &grid);
/// assert_eq!(buf[(0, 0)].symbol(), "@");
/// assert_eq!(buf[(1, 1)].symbol(), "@");
/// ```
pub fn render_grid(buf: &mut Buffer, area: Rect, grid: &CharacterGrid) {
    let style = Style::default().fg(Color::White).bg(Color::Black);
    buf.set_style(area, style);

    let rows = grid.height().min(u32::from(area.height)) as u16;
    let cols = grid.width().min(u32::from(area.width)) as u16;
    for cy in 0..rows {
        for cx in 0..cols {
            if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                cell.set_char(grid.get(u32::from(cx), u32::from(cy)));
            }
        }
    }
}

/// Message centré dans `area` (caméra inactive).
pub fn render_placeholder(buf: &mut Buffer, area: Rect, text: &str) {
    buf.set_style(area, Style::default().fg(Color::DarkGray).bg(Color::Black));
    if area.height == 0 {
        return;
    }
    let len = text.chars().count() as u16;
    let x = area.x + area.width.saturating_sub(len) / 2;
    let y = area.y + area.height / 2;
    buf.set_stringn(x, y, text, area.width as usize, Style::default().fg(Color::DarkGray));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_grid_is_cropped() {
        let grid = CharacterGrid::from_lines(&["@@@@@@", "@@@@@@", "@@@@@@"]).unwrap();
        let area = Rect::new(1, 1, 3, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 4));
        render_grid(&mut buf, area, &grid);
        assert_eq!(buf[(0, 0)].symbol(), " ");
        assert_eq!(buf[(1, 1)].symbol(), "@");
        assert_eq!(buf[(3, 2)].symbol(), "@");
        assert_eq!(buf[(4, 1)].symbol(), " ");
        assert_eq!(buf[(1, 3)].symbol(), " ");
    }

    #[test]
    fn grid_is_white_on_black() {
        let grid = CharacterGrid::from_lines(&["#"]).unwrap();
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        render_grid(&mut buf, area, &grid);
        assert_eq!(buf[(0, 0)].fg, Color::White);
        assert_eq!(buf[(0, 0)].bg, Color::Black);
    }

    #[test]
    fn placeholder_is_centered() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        render_placeholder(&mut buf, area, "hello");
        assert_eq!(buf[(7, 2)].symbol(), "h");
        assert_eq!(buf[(11, 2)].symbol(), "o");
    }
}
