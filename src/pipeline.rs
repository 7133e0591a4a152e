//! Entry point: seed selection, region growth and recoloring in one pass.
//!
//! Every call is a full recomputation from the source image. Nothing is
//! cached between calls and the input is never modified.

use crate::error::Result;
use crate::mask::Mask;
use crate::pixels::PixelGrid;
use crate::recolor::{recolor, Adjustment};
use crate::region::{grow_region, mean_hsv, Connectivity, Tolerance};
use crate::seed::{select_seeds, ColorRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// All tunable parameters of one recolor invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentParams {
    /// Degrees, applied mod 360
    pub hue_shift: f32,
    pub saturation_scale: f32,
    pub value_scale: f32,
    /// Degrees, 0-180
    pub h_tolerance: f32,
    pub s_tolerance: f32,
    pub v_tolerance: f32,
    #[serde(default)]
    pub connectivity: Connectivity,
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            saturation_scale: 1.0,
            value_scale: 1.0,
            h_tolerance: 10.0,
            s_tolerance: 0.2,
            v_tolerance: 0.2,
            connectivity: Connectivity::Eight,
        }
    }
}

impl AdjustmentParams {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.h_tolerance, self.s_tolerance, self.v_tolerance)
    }

    pub fn adjustment(&self) -> Adjustment {
        Adjustment::new(self.hue_shift, self.saturation_scale, self.value_scale)
    }

    pub fn validate(&self) -> Result<()> {
        self.tolerance().validate()?;
        self.adjustment().validate()
    }
}

/// Pixel counts of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegionReport {
    pub seed_count: usize,
    pub region_size: usize,
    /// Pixels admitted by growth, excluding the seeds
    pub added_count: usize,
}

/// Output image together with the masks that produced it
#[derive(Debug, Clone)]
pub struct RecolorOutcome {
    pub image: PixelGrid,
    pub seeds: Mask,
    pub region: Mask,
}

impl RecolorOutcome {
    pub fn report(&self) -> RegionReport {
        let seed_count = self.seeds.count();
        let region_size = self.region.count();
        RegionReport {
            seed_count,
            region_size,
            added_count: region_size - seed_count,
        }
    }

    /// True when nothing matched the seed range and the image was returned as-is
    pub fn is_noop(&self) -> bool {
        self.seeds.is_empty()
    }
}

/// Recolor the contiguous region grown from pixels inside `range`.
///
/// Returns the input unchanged when no opaque pixel falls inside `range`.
pub fn recolor_region(
    image: &PixelGrid,
    range: &ColorRange,
    params: &AdjustmentParams,
) -> Result<PixelGrid> {
    recolor_region_with_report(image, range, params).map(|outcome| outcome.image)
}

/// Same as [`recolor_region`] but also hands back the seed and region masks.
pub fn recolor_region_with_report(
    image: &PixelGrid,
    range: &ColorRange,
    params: &AdjustmentParams,
) -> Result<RecolorOutcome> {
    range.validate()?;
    params.validate()?;

    let (width, height) = image.dimensions();
    let seeds = select_seeds(image, range);

    let Some(target) = mean_hsv(image, &seeds) else {
        debug!(width, height, "no seed pixels in color range, image unchanged");
        return Ok(RecolorOutcome {
            image: image.clone(),
            seeds,
            region: Mask::new(width, height),
        });
    };

    debug!(
        seed_count = seeds.count(),
        hue = target.h,
        saturation = target.s,
        value = target.v,
        "seed mean"
    );

    let region = grow_region(
        image,
        &seeds,
        target,
        &params.tolerance(),
        params.connectivity,
    )?;
    let output = recolor(image, &region, &params.adjustment())?;

    let outcome = RecolorOutcome {
        image: output,
        seeds,
        region,
    };
    let report = outcome.report();
    debug!(
        seed_count = report.seed_count,
        added = report.added_count,
        region_size = report.region_size,
        "region recolored"
    );

    Ok(outcome)
}
