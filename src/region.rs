use crate::error::{RecolorError, Result};
use crate::hsv::{rgb8_to_hsv, Hsv};
use crate::mask::Mask;
use crate::pixels::PixelGrid;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const ORTHOGONAL: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const ALL_NEIGHBORS: [(i64, i64); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Which neighbors count as adjacent during growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Connectivity {
    /// N, S, E, W
    Four,
    /// Orthogonal plus the four diagonals
    #[default]
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(i64, i64)] {
        match self {
            Connectivity::Four => &ORTHOGONAL,
            Connectivity::Eight => &ALL_NEIGHBORS,
        }
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = RecolorError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            other => Err(RecolorError::InvalidConnectivity(other)),
        }
    }
}

impl From<Connectivity> for u8 {
    fn from(c: Connectivity) -> u8 {
        match c {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

/// Per-channel acceptance band around the target HSV
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Degrees, 0-180
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Tolerance {
    pub fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("h_tolerance", self.hue, 180.0)?;
        check_range("s_tolerance", self.saturation, 1.0)?;
        check_range("v_tolerance", self.value, 1.0)
    }

    /// All three channels within tolerance; hue compared cyclically
    pub fn accepts(&self, target: &Hsv, candidate: &Hsv) -> bool {
        target.hue_distance(candidate) <= self.hue
            && (target.s - candidate.s).abs() <= self.saturation
            && (target.v - candidate.v).abs() <= self.value
    }
}

fn check_range(parameter: &'static str, value: f32, max: f32) -> Result<()> {
    // NaN fails both comparisons
    if !(value >= 0.0 && value <= max) {
        return Err(RecolorError::ToleranceOutOfRange {
            parameter,
            value,
            max,
        });
    }
    Ok(())
}

/// Arithmetic mean of H, S and V over the seed pixels, or `None` without seeds.
///
/// Hue is averaged linearly, so seeds straddling 0°/360° average toward 180°.
pub fn mean_hsv(image: &PixelGrid, seeds: &Mask) -> Option<Hsv> {
    let mut sum = (0.0f64, 0.0f64, 0.0f64);
    let mut count = 0usize;

    for idx in seeds.indices() {
        let hsv = rgb8_to_hsv(image.rgb_at(idx));
        sum.0 += hsv.h as f64;
        sum.1 += hsv.s as f64;
        sum.2 += hsv.v as f64;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let n = count as f64;
    Some(Hsv::new(
        (sum.0 / n) as f32,
        (sum.1 / n) as f32,
        (sum.2 / n) as f32,
    ))
}

/// Breadth-first growth from every seed pixel.
///
/// Neighbors are compared against the fixed `target`, never against the pixel
/// they were reached from. Each pixel is examined at most once: rejected and
/// transparent pixels are marked visited and never reconsidered.
pub fn grow_region(
    image: &PixelGrid,
    seeds: &Mask,
    target: Hsv,
    tolerance: &Tolerance,
    connectivity: Connectivity,
) -> Result<Mask> {
    seeds.ensure_dimensions(image.dimensions())?;

    let width = image.width() as i64;
    let height = image.height() as i64;

    let mut region = seeds.clone();
    let mut visited = seeds.clone();
    let mut queue: VecDeque<usize> = seeds.indices().collect();

    while let Some(idx) = queue.pop_front() {
        let x = idx as i64 % width;
        let y = idx as i64 / width;

        for &(dx, dy) in connectivity.offsets() {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || nx >= width || ny < 0 || ny >= height {
                continue;
            }

            let n = (ny * width + nx) as usize;
            if visited.get(n) {
                continue;
            }
            visited.set(n, true);

            if image.is_transparent(n) {
                continue;
            }

            if tolerance.accepts(&target, &rgb8_to_hsv(image.rgb_at(n))) {
                region.set(n, true);
                queue.push_back(n);
            }
        }
    }

    Ok(region)
}
