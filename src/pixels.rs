use crate::error::{RecolorError, Result};
use image::{DynamicImage, RgbImage, RgbaImage};

/// Immutable pixel grid: 8-bit RGB per pixel plus an optional alpha plane.
///
/// Pixels are stored row-major; index `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    rgb: Vec<[u8; 3]>,
    alpha: Option<Vec<u8>>,
}

impl PixelGrid {
    /// Opaque grid without an alpha channel
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<[u8; 3]>) -> Result<Self> {
        Self::check_dimensions(width, height, rgb.len())?;
        Ok(Self {
            width,
            height,
            rgb,
            alpha: None,
        })
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<[u8; 4]>) -> Result<Self> {
        Self::check_dimensions(width, height, rgba.len())?;
        let rgb = rgba.iter().map(|p| [p[0], p[1], p[2]]).collect();
        let alpha = rgba.iter().map(|p| p[3]).collect();
        Ok(Self {
            width,
            height,
            rgb,
            alpha: Some(alpha),
        })
    }

    /// Grid of `width x height` filled with one RGB color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        let len = width as usize * height as usize;
        Self::from_rgb(width, height, vec![rgb; len])
    }

    /// Attach (or replace) the alpha plane
    pub fn with_alpha(mut self, alpha: Vec<u8>) -> Result<Self> {
        if alpha.len() != self.rgb.len() {
            return Err(RecolorError::BufferSizeMismatch {
                expected: self.rgb.len(),
                actual: alpha.len(),
            });
        }
        self.alpha = Some(alpha);
        Ok(self)
    }

    fn check_dimensions(width: u32, height: u32, len: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RecolorError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize;
        if len != expected {
            return Err(RecolorError::BufferSizeMismatch {
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.rgb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn rgb(&self) -> &[[u8; 3]] {
        &self.rgb
    }

    pub fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    pub fn rgb_at(&self, idx: usize) -> [u8; 3] {
        self.rgb[idx]
    }

    pub fn alpha_at(&self, idx: usize) -> Option<u8> {
        self.alpha.as_ref().map(|a| a[idx])
    }

    /// True only when the grid has alpha and this pixel's alpha is zero
    pub fn is_transparent(&self, idx: usize) -> bool {
        matches!(self.alpha_at(idx), Some(0))
    }

    /// New grid with the same dimensions and alpha plane but different colors
    pub(crate) fn with_rgb(&self, rgb: Vec<[u8; 3]>) -> Self {
        debug_assert_eq!(rgb.len(), self.rgb.len());
        Self {
            width: self.width,
            height: self.height,
            rgb,
            alpha: self.alpha.clone(),
        }
    }

    /// Convert into an `image` buffer: RGBA8 when alpha is present, RGB8 otherwise
    pub fn to_dynamic_image(&self) -> DynamicImage {
        match &self.alpha {
            Some(alpha) => {
                let raw: Vec<u8> = self
                    .rgb
                    .iter()
                    .zip(alpha)
                    .flat_map(|(p, &a)| [p[0], p[1], p[2], a])
                    .collect();
                // Length is width * height * 4 by construction
                RgbaImage::from_raw(self.width, self.height, raw)
                    .map(DynamicImage::ImageRgba8)
                    .unwrap_or_else(|| DynamicImage::new_rgba8(self.width, self.height))
            }
            None => {
                let raw: Vec<u8> = self.rgb.iter().flatten().copied().collect();
                RgbImage::from_raw(self.width, self.height, raw)
                    .map(DynamicImage::ImageRgb8)
                    .unwrap_or_else(|| DynamicImage::new_rgb8(self.width, self.height))
            }
        }
    }
}

impl TryFrom<&RgbaImage> for PixelGrid {
    type Error = RecolorError;

    fn try_from(img: &RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.pixels().map(|p| p.0).collect())
    }
}

impl TryFrom<&RgbImage> for PixelGrid {
    type Error = RecolorError;

    fn try_from(img: &RgbImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::from_rgb(width, height, img.pixels().map(|p| p.0).collect())
    }
}

impl TryFrom<&DynamicImage> for PixelGrid {
    type Error = RecolorError;

    /// Images whose color type carries alpha keep it; everything else is
    /// treated as opaque RGB.
    fn try_from(img: &DynamicImage) -> Result<Self> {
        if img.color().has_alpha() {
            Self::try_from(&img.to_rgba8())
        } else {
            Self::try_from(&img.to_rgb8())
        }
    }
}
