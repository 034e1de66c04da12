use ac_core::error::CoreError;
use ac_core::frame::{FrameBuffer, LuminanceGrid, grid_height};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};

/// Multiplicateur de contraste fixe appliqué avant l'échantillonnage.
pub const CONTRAST_BOOST: f32 = 1.5;

/// Hauteur de grille maximale acceptée (lignes).
pub const MAX_GRID_ROWS: u32 = 4096;

/// Table de contraste précalculée, même formule que le filtre CSS `contrast()`.
///
/// `c' = (c - 127.5) * amount + 127.5`, arrondi et borné à [0, 255].
///
/// # Example
/// ```
/// use ac_ascii::sampler::contrast_lut;
/// let lut = contrast_lut(1.5);
/// assert_eq!(lut[0], 0);
/// assert_eq!(lut[255], 255);
/// assert_eq!(lut[128], 128);
/// assert_eq!(lut[200], 236);
/// ```
#[must_use]
pub fn contrast_lut(amount: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let v = (i as f32 - 127.5) * amount + 127.5;
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Downsample une frame en grille de luminance à la largeur cible.
///
/// Échantillonnage au plus proche voisin (pas de filtre anti-alias), puis
/// boost de contraste, puis moyenne arithmétique R/G/B par cellule.
/// Les buffers internes sont réutilisés d'un tick à l'autre.
///
/// # Example
/// ```
/// use ac_ascii::sampler::FrameSampler;
/// use ac_core::frame::FrameBuffer;
///
/// let mut sampler = FrameSampler::new();
/// let frame = FrameBuffer::filled(640, 480, (255, 255, 255));
/// let lum = sampler.sample(&frame, 160).unwrap();
/// assert_eq!((lum.width, lum.height), (160, 120));
/// assert!(lum.values.iter().all(|&v| v == 255.0));
/// ```
pub struct FrameSampler {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
    /// Scratch image for the downsampled frame.
    dst_buf: Vec<u8>,
    contrast: [u8; 256],
}

impl FrameSampler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Nearest),
            src_buf: Vec::new(),
            dst_buf: Vec::new(),
            contrast: contrast_lut(CONTRAST_BOOST),
        }
    }

    /// Sample `frame` into a `target_width × floor(target_width * h / w)` grid.
    ///
    /// Une frame vide ou une hauteur calculée nulle donne une grille vide.
    ///
    /// # Errors
    /// `CoreError::RenderSurfaceUnavailable` if the downsampling surface
    /// cannot be built for these dimensions, `CoreError::InvalidDimensions`
    /// for a truncated buffer or more than `MAX_GRID_ROWS` rows.
    pub fn sample(
        &mut self,
        frame: &FrameBuffer,
        target_width: u32,
    ) -> Result<LuminanceGrid, CoreError> {
        let height = grid_height(target_width, frame.width, frame.height);
        if frame.is_empty() || target_width == 0 || height == 0 {
            return Ok(LuminanceGrid::new(target_width, 0));
        }
        if height > MAX_GRID_ROWS {
            return Err(CoreError::InvalidDimensions {
                width: target_width,
                height,
            });
        }
        let expected = frame.width as usize * frame.height as usize * 4;
        if frame.data.len() < expected {
            return Err(CoreError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            });
        }

        self.downsample(frame, target_width, height)?;

        let mut grid = LuminanceGrid::new(target_width, height);
        for (slot, px) in grid.values.iter_mut().zip(self.dst_buf.chunks_exact(4)) {
            let r = self.contrast[px[0] as usize];
            let g = self.contrast[px[1] as usize];
            let b = self.contrast[px[2] as usize];
            *slot = (f32::from(r) + f32::from(g) + f32::from(b)) / 3.0;
        }
        Ok(grid)
    }

    /// Nearest-neighbour resize of `frame` into `dst_buf`.
    fn downsample(&mut self, frame: &FrameBuffer, width: u32, height: u32) -> Result<(), CoreError> {
        let dst_len = width as usize * height as usize * 4;
        self.dst_buf.clear();
        self.dst_buf.resize(dst_len, 0);

        if frame.width == width && frame.height == height {
            self.dst_buf.copy_from_slice(&frame.data[..dst_len]);
            return Ok(());
        }

        // R1: forced copy by fast_image_resize API (requires &mut on source)
        let src_len = frame.width as usize * frame.height as usize * 4;
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&frame.data[..src_len]);

        let src_image =
            Image::from_slice_u8(frame.width, frame.height, &mut self.src_buf, PixelType::U8x4)
                .map_err(|e| CoreError::RenderSurfaceUnavailable(format!("source: {e}")))?;
        let mut dst_image = Image::from_slice_u8(width, height, &mut self.dst_buf, PixelType::U8x4)
            .map_err(|e| CoreError::RenderSurfaceUnavailable(format!("destination: {e}")))?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| CoreError::RenderSurfaceUnavailable(format!("resize: {e}")))?;
        Ok(())
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dimensions_follow_aspect_ratio() {
        let mut sampler = FrameSampler::new();
        for &(w, h) in &[(640u32, 480u32), (1280, 720), (300, 400), (1000, 50)] {
            let frame = FrameBuffer::new(w, h);
            for width in (60..=320).step_by(4) {
                let lum = sampler.sample(&frame, width).unwrap();
                assert_eq!(lum.width, width);
                assert_eq!(lum.height, width * h / w, "source {w}x{h}, width {width}");
                assert_eq!(lum.values.len(), (width * lum.height) as usize);
            }
        }
    }

    #[test]
    fn luminance_is_plain_channel_mean_after_contrast() {
        let mut sampler = FrameSampler::new();
        let frame = FrameBuffer::filled(120, 90, (200, 128, 0));
        let lum = sampler.sample(&frame, 60).unwrap();
        let lut = contrast_lut(CONTRAST_BOOST);
        let expected =
            (f32::from(lut[200]) + f32::from(lut[128]) + f32::from(lut[0])) / 3.0;
        assert!(lum.values.iter().all(|&v| (v - expected).abs() < 1e-4));
    }

    #[test]
    fn contrast_pushes_values_away_from_mid_gray() {
        let lut = contrast_lut(CONTRAST_BOOST);
        assert!(lut[100] < 100);
        assert!(lut[160] > 160);
        for i in 1..256 {
            assert!(lut[i] >= lut[i - 1]);
        }
    }

    #[test]
    fn same_size_skips_resize() {
        let mut sampler = FrameSampler::new();
        let mut frame = FrameBuffer::new(60, 2);
        frame.data[0..4].copy_from_slice(&[255, 255, 255, 255]);
        let lum = sampler.sample(&frame, 60).unwrap();
        assert_eq!(lum.height, 2);
        assert_eq!(lum.get(0, 0), 255.0);
        assert_eq!(lum.get(1, 0), 0.0);
    }

    #[test]
    fn nearest_sampling_keeps_hard_edges() {
        // Moitié gauche noire, moitié droite blanche.
        let mut frame = FrameBuffer::new(200, 100);
        for y in 0..100u32 {
            for x in 100..200u32 {
                let idx = ((y * 200 + x) * 4) as usize;
                frame.data[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let mut sampler = FrameSampler::new();
        let lum = sampler.sample(&frame, 100).unwrap();
        assert!(lum.values.iter().all(|&v| v == 0.0 || v == 255.0));
        assert_eq!(lum.get(0, 0), 0.0);
        assert_eq!(lum.get(99, 49), 255.0);
    }

    #[test]
    fn degenerate_frames_give_empty_grid() {
        let mut sampler = FrameSampler::new();
        assert_eq!(sampler.sample(&FrameBuffer::new(0, 0), 160).unwrap().height, 0);
        // 160 * 1 / 1000 = 0 lignes
        assert_eq!(sampler.sample(&FrameBuffer::new(1000, 1), 160).unwrap().height, 0);
    }

    #[test]
    fn extreme_aspect_ratio_is_rejected() {
        let mut sampler = FrameSampler::new();
        // 320 * 20000 / 1 = 6,4 M lignes
        let frame = FrameBuffer::new(1, 20_000);
        assert!(matches!(
            sampler.sample(&frame, 320),
            Err(CoreError::InvalidDimensions {
                width: 320,
                height: 6_400_000
            })
        ));
        assert!(sampler.dst_buf.is_empty());
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let mut sampler = FrameSampler::new();
        let frame = FrameBuffer {
            data: vec![0; 10],
            width: 64,
            height: 48,
        };
        assert!(matches!(
            sampler.sample(&frame, 60),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }
}
