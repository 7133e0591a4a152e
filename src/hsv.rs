use serde::{Deserialize, Serialize};

/// A color in HSV space.
///
/// `h` is in degrees `[0, 360)`, `s` and `v` are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    /// Shortest angular distance between two hues, in `[0, 180]`
    pub fn hue_distance(&self, other: &Hsv) -> f32 {
        let diff = (self.h - other.h).abs();
        diff.min(360.0 - diff)
    }
}

/// Convert normalized RGB (each channel 0.0-1.0) to HSV.
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return Hsv::new(0.0, 0.0, max);
    }

    let h = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    // rem_euclid can land exactly on 6.0 for tiny negative ratios
    let h = if h >= 360.0 { h - 360.0 } else { h };

    Hsv::new(h, delta / max, max)
}

/// Convert HSV back to normalized RGB. Channels are clamped to `[0, 1]`.
pub fn hsv_to_rgb(hsv: Hsv) -> (f32, f32, f32) {
    let Hsv { h, s, v } = hsv;
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        (r + m).clamp(0.0, 1.0),
        (g + m).clamp(0.0, 1.0),
        (b + m).clamp(0.0, 1.0),
    )
}

/// HSV of an 8-bit RGB triple
pub fn rgb8_to_hsv(rgb: [u8; 3]) -> Hsv {
    rgb_to_hsv(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    )
}

/// Back to 8-bit. Scaled channels are truncated toward zero, not rounded.
pub fn hsv_to_rgb8(hsv: Hsv) -> [u8; 3] {
    let (r, g, b) = hsv_to_rgb(hsv);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_hsv(actual: Hsv, h: f32, s: f32, v: f32) {
        assert!((actual.h - h).abs() < 1e-4, "hue {} vs {}", actual.h, h);
        assert!((actual.s - s).abs() < 1e-6, "sat {} vs {}", actual.s, s);
        assert!((actual.v - v).abs() < 1e-6, "val {} vs {}", actual.v, v);
    }

    #[test]
    fn test_primary_and_secondary_hues() {
        assert_hsv(rgb_to_hsv(1.0, 0.0, 0.0), 0.0, 1.0, 1.0);
        assert_hsv(rgb_to_hsv(1.0, 1.0, 0.0), 60.0, 1.0, 1.0);
        assert_hsv(rgb_to_hsv(0.0, 1.0, 0.0), 120.0, 1.0, 1.0);
        assert_hsv(rgb_to_hsv(0.0, 1.0, 1.0), 180.0, 1.0, 1.0);
        assert_hsv(rgb_to_hsv(0.0, 0.0, 1.0), 240.0, 1.0, 1.0);
        assert_hsv(rgb_to_hsv(1.0, 0.0, 1.0), 300.0, 1.0, 1.0);
    }

    #[test]
    fn test_gray_has_no_hue_or_saturation() {
        assert_hsv(rgb_to_hsv(0.5, 0.5, 0.5), 0.0, 0.0, 0.5);
        assert_hsv(rgb_to_hsv(0.0, 0.0, 0.0), 0.0, 0.0, 0.0);
        assert_hsv(rgb_to_hsv(1.0, 1.0, 1.0), 0.0, 0.0, 1.0);
    }

    #[test]
    fn test_red_dominant_negative_sector_wraps() {
        // g < b with red max lands just below 360
        let hsv = rgb_to_hsv(1.0, 0.0, 0.5);
        assert!((hsv.h - 330.0).abs() < 1e-4);
        assert!(hsv.h < 360.0);
    }

    #[test]
    fn test_hsv_to_rgb_sectors() {
        let cases = [
            (0.0, (1.0, 0.0, 0.0)),
            (60.0, (1.0, 1.0, 0.0)),
            (120.0, (0.0, 1.0, 0.0)),
            (180.0, (0.0, 1.0, 1.0)),
            (240.0, (0.0, 0.0, 1.0)),
            (300.0, (1.0, 0.0, 1.0)),
            (30.0, (1.0, 0.5, 0.0)),
        ];
        for (h, (r, g, b)) in cases {
            let (r2, g2, b2) = hsv_to_rgb(Hsv::new(h, 1.0, 1.0));
            assert!((r - r2).abs() < 1e-6, "R mismatch at {}: {} vs {}", h, r, r2);
            assert!((g - g2).abs() < 1e-6, "G mismatch at {}: {} vs {}", h, g, g2);
            assert!((b - b2).abs() < 1e-6, "B mismatch at {}: {} vs {}", h, b, b2);
        }
    }

    #[test]
    fn test_round_trip_through_hsv() {
        let samples = [(0.8, 0.3, 0.1), (0.2, 0.6, 0.9), (0.75, 0.27, 0.07), (0.1, 0.1, 0.4)];
        for (r, g, b) in samples {
            let (r2, g2, b2) = hsv_to_rgb(rgb_to_hsv(r, g, b));
            assert!((r - r2).abs() < 1e-5);
            assert!((g - g2).abs() < 1e-5);
            assert!((b - b2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_output_is_clamped() {
        let (r, g, b) = hsv_to_rgb(Hsv::new(0.0, 1.0, 1.5));
        assert_eq!((r, g, b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rgb8_truncates() {
        assert_eq!(hsv_to_rgb8(Hsv::new(60.0, 1.0, 1.0)), [255, 255, 0]);
        // 0.5 * 255 = 127.5 truncates to 127
        assert_eq!(hsv_to_rgb8(Hsv::new(0.0, 0.0, 0.5)), [127, 127, 127]);
    }

    #[test]
    fn test_hue_distance_is_cyclic() {
        let a = Hsv::new(5.0, 1.0, 1.0);
        let b = Hsv::new(355.0, 1.0, 1.0);
        assert!((a.hue_distance(&b) - 10.0).abs() < 1e-4);
        assert!((b.hue_distance(&a) - 10.0).abs() < 1e-4);
        assert!((Hsv::new(0.0, 0.0, 0.0).hue_distance(&Hsv::new(180.0, 0.0, 0.0)) - 180.0).abs() < 1e-4);
    }
}
