use crate::error::{RecolorError, Result};

/// Boolean grid with the same layout as a [`crate::PixelGrid`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// All-false mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(usize) -> bool) -> Self {
        let bits = (0..width as usize * height as usize).map(f).collect();
        Self { width, height, bits }
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

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn get(&self, idx: usize) -> bool {
        self.bits[idx]
    }

    pub fn get_xy(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, idx: usize, value: bool) {
        self.bits[idx] = value;
    }

    /// Number of set entries
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True when no entry is set
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Indices of set entries, row-major
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    pub fn is_superset_of(&self, other: &Mask) -> bool {
        self.dimensions() == other.dimensions()
            && self.bits.iter().zip(&other.bits).all(|(&a, &b)| a || !b)
    }

    /// Error unless `self` has exactly the given dimensions
    pub(crate) fn ensure_dimensions(&self, expected: (u32, u32)) -> Result<()> {
        if self.dimensions() != expected {
            return Err(RecolorError::DimensionMismatch {
                expected,
                actual: self.dimensions(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_indices() {
        let mut mask = Mask::new(3, 2);
        assert!(mask.is_empty());
        mask.set(1, true);
        mask.set(5, true);
        assert_eq!(mask.count(), 2);
        assert!(!mask.is_empty());
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![1, 5]);
        assert!(mask.get_xy(2, 1));
    }

    #[test]
    fn test_superset() {
        let small = Mask::from_fn(2, 2, |i| i == 0);
        let big = Mask::from_fn(2, 2, |i| i < 3);
        assert!(big.is_superset_of(&small));
        assert!(!small.is_superset_of(&big));
        assert!(!big.is_superset_of(&Mask::new(4, 1)));
    }

    #[test]
    fn test_dimension_check() {
        let mask = Mask::new(2, 3);
        assert!(mask.ensure_dimensions((2, 3)).is_ok());
        assert!(matches!(
            mask.ensure_dimensions((3, 2)),
            Err(RecolorError::DimensionMismatch { .. })
        ));
    }
}
