//! Error types for region recoloring

use thiserror::Error;

/// Result type alias for chromaregion operations
pub type Result<T> = std::result::Result<T, RecolorError>;

/// Everything that can reject a recolor invocation before pixel work starts.
///
/// An empty seed selection is not represented here: it is a successful no-op.
#[derive(Error, Debug)]
pub enum RecolorError {
    /// Connectivity must be 4 or 8
    #[error("Invalid connectivity: {0} (expected 4 or 8)")]
    InvalidConnectivity(u8),

    /// A similarity tolerance fell outside `[0, max]`
    #[error("Tolerance out of range: {parameter} = {value} (expected 0..={max})")]
    ToleranceOutOfRange {
        parameter: &'static str,
        value: f32,
        max: f32,
    },

    /// Saturation/value multipliers must be finite and non-negative
    #[error("Invalid scale: {parameter} = {value} (expected a finite value >= 0)")]
    InvalidScale { parameter: &'static str, value: f32 },

    #[error("Invalid hue shift: {0} (expected a finite number of degrees)")]
    InvalidHueShift(f32),

    /// A `low` channel of the seed range exceeds its `high` channel
    #[error("Inverted color range on {channel}: low {low} > high {high}")]
    InvertedColorRange {
        channel: &'static str,
        low: u8,
        high: u8,
    },

    #[error("Degenerate image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel buffer size mismatch: expected {expected} entries, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A mask and an image (or two masks) disagree on dimensions
    #[error("Dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Failure at the `image` crate boundary (decode/encode)
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl RecolorError {
    /// True for errors the caller can fix by changing parameters or input
    /// dimensions, as opposed to codec failures.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, RecolorError::Image(_))
    }
}
