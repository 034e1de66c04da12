/// Buffer de pixels d'une frame vidéo, à la résolution native de la source.
///
/// Stocke les pixels en RGBA row-major, 4 bytes par pixel.
///
/// # Example
/// ```
/// use ac_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Buffer uniforme, pratique pour les tests et les sources synthétiques.
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::filled(2, 2, (10, 20, 30));
    /// assert_eq!(fb.pixel(1, 1), (10, 20, 30, 255));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: (u8, u8, u8)) -> Self {
        let mut fb = Self::new(width, height);
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgb.0, rgb.1, rgb.2, 255]);
        }
        fb
    }

    /// Wrap an RGB24 buffer (as produced by most camera decoders) into RGBA.
    ///
    /// Returns `None` when `rgb.len() != width * height * 3`.
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::from_rgb(1, 1, &[1, 2, 3]).unwrap();
    /// assert_eq!(fb.data, vec![1, 2, 3, 255]);
    /// ```
    #[must_use]
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width as usize * height as usize * 3 {
            return None;
        }
        let mut data = Vec::with_capacity(rgb.len() / 3 * 4);
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// `true` if the buffer holds no pixel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    ///
    /// # Example
    /// ```
    /// use ac_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }
}

/// Number of grid rows for a target width, preserving the source aspect ratio.
///
/// `floor(width * source_height / source_width)`, 0 for an empty source.
///
/// # Example
/// ```
/// use ac_core::frame::grid_height;
/// assert_eq!(grid_height(160, 640, 480), 120);
/// assert_eq!(grid_height(100, 1920, 1080), 56);
/// assert_eq!(grid_height(100, 0, 1080), 0);
/// ```
#[must_use]
pub fn grid_height(width: u32, source_width: u32, source_height: u32) -> u32 {
    if source_width == 0 {
        return 0;
    }
    (u64::from(width) * u64::from(source_height) / u64::from(source_width)) as u32
}

/// Luminance par cellule, row-major, valeurs dans [0, 255].
///
/// # Example
/// ```
/// use ac_core::frame::LuminanceGrid;
/// let grid = LuminanceGrid::new(4, 2);
/// assert_eq!(grid.values.len(), 8);
/// assert_eq!(grid.get(3, 1), 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LuminanceGrid {
    /// Flat array of luminance values, row-major.
    pub values: Vec<f32>,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl LuminanceGrid {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            values: vec![0.0; width as usize * height as usize],
            width,
            height,
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.values[y as usize * self.width as usize + x as usize] = value;
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.width.max(1) as usize)
    }
}

/// Grille de glyphes produite par un tick. Immuable une fois construite.
///
/// Chaque ligne contient exactement `width` glyphes.
///
/// # Example
/// ```
/// use ac_core::frame::CharacterGrid;
/// let grid = CharacterGrid::from_lines(&["ab", "cd"]).unwrap();
/// assert_eq!(grid.width(), 2);
/// assert_eq!(grid.height(), 2);
/// assert_eq!(grid.to_text(), "ab\ncd\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterGrid {
    glyphs: Vec<char>,
    width: u32,
    height: u32,
}

impl CharacterGrid {
    /// Build a grid from row-major glyphs.
    ///
    /// Returns `None` if `glyphs.len() != width * height`.
    #[must_use]
    pub fn from_glyphs(width: u32, height: u32, glyphs: Vec<char>) -> Option<Self> {
        (glyphs.len() == width as usize * height as usize).then_some(Self {
            glyphs,
            width,
            height,
        })
    }

    /// Build a grid from text lines of identical glyph count.
    ///
    /// Returns `None` when the lines have different lengths.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Option<Self> {
        let width = lines.first().map_or(0, |l| l.as_ref().chars().count());
        let mut glyphs = Vec::with_capacity(width * lines.len());
        for line in lines {
            let before = glyphs.len();
            glyphs.extend(line.as_ref().chars());
            if glyphs.len() - before != width {
                return None;
            }
        }
        Some(Self {
            glyphs,
            width: width as u32,
            height: lines.len() as u32,
        })
    }

    /// Grille vide (aucune ligne).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            glyphs: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of lines.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` when the grid has no line or no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> char {
        self.glyphs[y as usize * self.width as usize + x as usize]
    }

    /// Iterate rows as glyph slices.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.glyphs.chunks_exact(self.width.max(1) as usize)
    }

    /// Rows as owned strings, without line terminators.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.rows().map(|row| row.iter().collect()).collect()
    }

    /// Texte complet : chaque ligne terminée par `\n`, pas de ligne vide finale.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.glyphs.len() + self.height as usize);
        for row in self.rows() {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_height_matches_floor_formula() {
        for width in (60..=320).step_by(4) {
            assert_eq!(grid_height(width, 1280, 720), width * 720 / 1280);
            assert_eq!(grid_height(width, 640, 480), width * 3 / 4);
        }
    }

    #[test]
    fn from_lines_rejects_ragged_input() {
        assert!(CharacterGrid::from_lines(&["abc", "de"]).is_none());
    }

    #[test]
    fn empty_grid_has_no_text() {
        let grid = CharacterGrid::empty();
        assert!(grid.is_empty());
        assert_eq!(grid.to_text(), "");
        assert!(grid.lines().is_empty());
    }

    #[test]
    fn text_has_one_terminator_per_row() {
        let grid = CharacterGrid::from_glyphs(3, 2, "abcdef".chars().collect()).unwrap();
        assert_eq!(grid.to_text(), "abc\ndef\n");
        assert_eq!(grid.lines(), vec!["abc".to_string(), "def".to_string()]);
        assert_eq!(grid.get(2, 1), 'f');
    }

    #[test]
    fn from_rgb_rejects_wrong_length() {
        assert!(FrameBuffer::from_rgb(2, 2, &[0; 11]).is_none());
    }
}
