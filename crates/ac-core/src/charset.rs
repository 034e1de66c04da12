/// Rampe courte (10 glyphes), profil par défaut.
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// Rampe de Paul Bourke, 70 glyphes du vide au plus dense.
pub const CHARSET_STANDARD: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Blocs d'ombrage Unicode.
pub const CHARSET_BLOCKS: &str = " ░▒▓█";

/// Named built-in profiles, indexed by `RenderConfig::profile_index`.
pub const PROFILES: [(&str, &str); 3] = [
    ("Compact", CHARSET_COMPACT),
    ("Standard", CHARSET_STANDARD),
    ("Blocks", CHARSET_BLOCKS),
];

/// Ordered glyph ramp, index 0 = darkest, last = brightest.
///
/// Always holds at least two glyphs.
///
/// # Example
/// ```
/// use ac_core::charset::DensityProfile;
/// let profile = DensityProfile::builtin(0);
/// assert_eq!(profile.name(), "Compact");
/// assert_eq!(profile.darkest(), ' ');
/// assert_eq!(profile.brightest(), '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityProfile {
    name: &'static str,
    glyphs: Vec<char>,
}

impl DensityProfile {
    /// Profil built-in à l'index donné. Un index hors plage retombe sur le dernier.
    ///
    /// # Example
    /// ```
    /// use ac_core::charset::DensityProfile;
    /// assert_eq!(DensityProfile::builtin(2).len(), 5);
    /// assert_eq!(DensityProfile::builtin(99).name(), "Blocks");
    /// ```
    #[must_use]
    pub fn builtin(index: usize) -> Self {
        let (name, charset) = PROFILES[index.min(PROFILES.len() - 1)];
        Self {
            name,
            glyphs: charset.chars().collect(),
        }
    }

    /// Nom lisible pour l'UI.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of glyphs (≥ 2).
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph at `index`, clamped to the last glyph.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, index: usize) -> char {
        self.glyphs[index.min(self.glyphs.len() - 1)]
    }

    #[must_use]
    pub fn darkest(&self) -> char {
        self.glyphs[0]
    }

    #[must_use]
    pub fn brightest(&self) -> char {
        self.glyphs[self.glyphs.len() - 1]
    }

    /// Glyphs separated by spaces, as shown in the settings panel.
    ///
    /// # Example
    /// ```
    /// use ac_core::charset::DensityProfile;
    /// assert_eq!(DensityProfile::builtin(2).spaced(), "  ░ ▒ ▓ █");
    /// ```
    #[must_use]
    pub fn spaced(&self) -> String {
        let mut out = String::with_capacity(self.glyphs.len() * 2);
        for (i, ch) in self.glyphs.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push(*ch);
        }
        out
    }
}
