use crate::error::{RecolorError, Result};
use crate::mask::Mask;
use crate::pixels::PixelGrid;
use serde::{Deserialize, Serialize};

const CHANNELS: [&str; 3] = ["red", "green", "blue"];

/// Inclusive per-channel RGB box used to pick seed pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

impl ColorRange {
    pub fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        Self { low, high }
    }

    /// Reject ranges where any `low` channel exceeds its `high` channel
    pub fn validate(&self) -> Result<()> {
        for (i, &channel) in CHANNELS.iter().enumerate() {
            if self.low[i] > self.high[i] {
                return Err(RecolorError::InvertedColorRange {
                    channel,
                    low: self.low[i],
                    high: self.high[i],
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        (0..3).all(|i| rgb[i] >= self.low[i] && rgb[i] <= self.high[i])
    }
}

/// Seed mask: pixels inside `range` that are not fully transparent
pub fn select_seeds(image: &PixelGrid, range: &ColorRange) -> Mask {
    Mask::from_fn(image.width(), image.height(), |idx| {
        !image.is_transparent(idx) && range.contains(image.rgb_at(idx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let range = ColorRange::new([10, 20, 30], [10, 25, 40]);
        assert!(range.contains([10, 20, 30]));
        assert!(range.contains([10, 25, 40]));
        assert!(!range.contains([11, 20, 30]));
        assert!(!range.contains([10, 19, 30]));
        assert!(!range.contains([10, 20, 41]));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = ColorRange::new([0, 50, 0], [255, 40, 255]).validate().unwrap_err();
        match err {
            RecolorError::InvertedColorRange { channel, low, high } => {
                assert_eq!(channel, "green");
                assert_eq!((low, high), (50, 40));
            }
            other => panic!("Expected InvertedColorRange, got: {:?}", other),
        }
        assert!(ColorRange::new([5, 5, 5], [5, 5, 5]).validate().is_ok());
    }

    #[test]
    fn test_transparent_pixels_are_never_seeds() {
        let grid = PixelGrid::from_rgba(
            3,
            1,
            vec![[255, 0, 0, 255], [255, 0, 0, 0], [0, 0, 255, 255]],
        )
        .unwrap();
        let seeds = select_seeds(&grid, &ColorRange::new([200, 0, 0], [255, 10, 10]));
        assert_eq!(seeds.indices().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_opaque_grid_selects_by_color_only() {
        let grid = PixelGrid::from_rgb(2, 1, vec![[100, 100, 100], [101, 100, 100]]).unwrap();
        let seeds = select_seeds(&grid, &ColorRange::new([100, 100, 100], [100, 100, 100]));
        assert_eq!(seeds.count(), 1);
        assert!(seeds.get(0));
    }
}
