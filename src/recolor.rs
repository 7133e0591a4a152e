use crate::error::{RecolorError, Result};
use crate::hsv::{hsv_to_rgb8, rgb8_to_hsv, Hsv};
use crate::mask::Mask;
use crate::pixels::PixelGrid;

/// Hue rotation plus saturation/value multipliers applied to region pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    /// Degrees; any finite value, applied mod 360
    pub hue_shift: f32,
    pub saturation_scale: f32,
    pub value_scale: f32,
}

impl Adjustment {
    pub fn new(hue_shift: f32, saturation_scale: f32, value_scale: f32) -> Self {
        Self {
            hue_shift,
            saturation_scale,
            value_scale,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hue_shift.is_finite() {
            return Err(RecolorError::InvalidHueShift(self.hue_shift));
        }
        check_scale("saturation_scale", self.saturation_scale)?;
        check_scale("value_scale", self.value_scale)
    }

    pub fn apply(&self, hsv: Hsv) -> Hsv {
        Hsv::new(
            (hsv.h + self.hue_shift).rem_euclid(360.0),
            (hsv.s * self.saturation_scale).clamp(0.0, 1.0),
            (hsv.v * self.value_scale).clamp(0.0, 1.0),
        )
    }
}

fn check_scale(parameter: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RecolorError::InvalidScale { parameter, value });
    }
    Ok(())
}

/// New image where every pixel in `region` is remapped through `adjustment`.
///
/// Pixels outside the region keep their RGB bit-for-bit and the alpha plane
/// is copied verbatim.
pub fn recolor(image: &PixelGrid, region: &Mask, adjustment: &Adjustment) -> Result<PixelGrid> {
    region.ensure_dimensions(image.dimensions())?;

    let rgb = image
        .rgb()
        .iter()
        .enumerate()
        .map(|(idx, &px)| {
            if region.get(idx) {
                hsv_to_rgb8(adjustment.apply(rgb8_to_hsv(px)))
            } else {
                px
            }
        })
        .collect();

    Ok(image.with_rgb(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_wraps_past_360() {
        let out = Adjustment::new(20.0, 1.0, 1.0).apply(Hsv::new(350.0, 1.0, 1.0));
        assert!((out.h - 10.0).abs() < 1e-4, "hue {}", out.h);
    }

    #[test]
    fn test_negative_shift_wraps_into_range() {
        let out = Adjustment::new(-30.0, 1.0, 1.0).apply(Hsv::new(10.0, 1.0, 1.0));
        assert!((out.h - 340.0).abs() < 1e-4);
        let out = Adjustment::new(720.0, 1.0, 1.0).apply(Hsv::new(45.0, 1.0, 1.0));
        assert!((out.h - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_scales_are_clamped() {
        let out = Adjustment::new(0.0, 3.0, 0.0).apply(Hsv::new(0.0, 0.5, 0.8));
        assert_eq!(out.s, 1.0);
        assert_eq!(out.v, 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(Adjustment::new(-400.0, 0.0, 5.0).validate().is_ok());
        assert!(matches!(
            Adjustment::new(f32::INFINITY, 1.0, 1.0).validate(),
            Err(RecolorError::InvalidHueShift(_))
        ));
        assert!(matches!(
            Adjustment::new(0.0, -0.5, 1.0).validate(),
            Err(RecolorError::InvalidScale { parameter: "saturation_scale", .. })
        ));
        assert!(Adjustment::new(0.0, 1.0, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_only_region_pixels_change_and_alpha_is_kept() {
        let grid = PixelGrid::from_rgba(
            2,
            1,
            vec![[255, 0, 0, 200], [255, 0, 0, 17]],
        )
        .unwrap();
        let region = Mask::from_fn(2, 1, |i| i == 0);
        let out = recolor(&grid, &region, &Adjustment::new(120.0, 1.0, 1.0)).unwrap();

        assert_eq!(out.rgb_at(0), [0, 255, 0]);
        assert_eq!(out.rgb_at(1), [255, 0, 0]);
        assert_eq!(out.alpha(), grid.alpha());
    }

    #[test]
    fn test_hue_wrap_on_pixels() {
        // hue ~349.9
        let grid = PixelGrid::from_rgb(1, 1, vec![[255, 0, 43]]).unwrap();
        let region = Mask::from_fn(1, 1, |_| true);
        let out = recolor(&grid, &region, &Adjustment::new(20.0, 1.0, 1.0)).unwrap();
        let [r, g, b] = out.rgb_at(0);
        assert_eq!(r, 255);
        assert_eq!(b, 0);
        assert!((40..=43).contains(&g), "green {}", g);
    }
}
