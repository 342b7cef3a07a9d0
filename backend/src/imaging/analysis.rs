//! Pure color-space statistics over a decoded image. Everything here is
//! deterministic, side-effect free and O(pixels); the gate composes these
//! into its accept/reject decision.

use crate::config::GateConfig;
use crate::imaging::decode::DecodedImage;
use ndarray::Array2;

/// Per-pixel hue/saturation/value planes derived from an RGB image.
/// H is in degrees [0, 360), S and V in [0, 1]. Scoped to one gate
/// evaluation; never stored.
pub struct HsvPlanes {
    pub h: Array2<f32>,
    pub s: Array2<f32>,
    pub v: Array2<f32>,
}

/// True when every pixel has |R-G| and |G-B| within `tolerance` - grayscale
/// content stored in three nominally-RGB channels.
pub fn channels_near_equal(img: &DecodedImage, tolerance: u8) -> bool {
    img.as_rgb().pixels().all(|px| {
        let [r, g, b] = px.0;
        r.abs_diff(g) <= tolerance && g.abs_diff(b) <= tolerance
    })
}

/// Standard RGB -> HSV conversion.
pub fn to_hsv(img: &DecodedImage) -> HsvPlanes {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let mut hue = Array2::<f32>::zeros((h, w));
    let mut sat = Array2::<f32>::zeros((h, w));
    let mut val = Array2::<f32>::zeros((h, w));

    for (x, y, px) in img.as_rgb().enumerate_pixels() {
        let r = px[0] as f32 / 255.0;
        let g = px[1] as f32 / 255.0;
        let b = px[2] as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h_deg = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        let (yi, xi) = (y as usize, x as usize);
        hue[(yi, xi)] = h_deg;
        sat[(yi, xi)] = if max == 0.0 { 0.0 } else { delta / max };
        val[(yi, xi)] = max;
    }

    HsvPlanes {
        h: hue,
        s: sat,
        v: val,
    }
}

/// Fraction of pixels whose hue/saturation land in the eosin (pink) or
/// hematoxylin (purple-blue) bands - the "looks like H&E-stained tissue"
/// signal. Returns a value in [0, 1].
pub fn tissue_ratio(hsv: &HsvPlanes, config: &GateConfig) -> f32 {
    let total = hsv.h.len();
    if total == 0 {
        return 0.0;
    }

    let mut tissue_like = 0usize;
    for (&h, &s) in hsv.h.iter().zip(hsv.s.iter()) {
        if s <= config.saturation_min {
            continue;
        }
        let eosin = h >= config.eosin_hue_min || h <= config.eosin_hue_max;
        let hematoxylin = h >= config.hematoxylin_hue_min && h <= config.hematoxylin_hue_max;
        if eosin || hematoxylin {
            tissue_like += 1;
        }
    }

    tissue_like as f32 / total as f32
}

/// True when green overwhelms the other channels - typical of landscape
/// photos, never of H&E stains.
pub fn is_green_dominant(img: &DecodedImage, config: &GateConfig) -> bool {
    let view = img.pixel_view();
    let total = (img.width() as u64) * (img.height() as u64);
    if total == 0 {
        return false;
    }

    let mut sums = [0u64; 3];
    for px in view.rows() {
        for c in 0..3 {
            sums[c] += px[c] as u64;
        }
    }

    let mean_r = sums[0] as f32 / total as f32;
    let mean_g = sums[1] as f32 / total as f32;
    let mean_b = sums[2] as f32 / total as f32;

    mean_g > (mean_r + mean_b) * config.green_mean_ratio && mean_g > config.green_mean_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> DecodedImage {
        let img = RgbImage::from_pixel(width, height, Rgb(rgb));
        DecodedImage::from_dynamic(DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn near_equal_channels_within_tolerance() {
        assert!(channels_near_equal(&uniform(8, 8, [100, 102, 99]), 3));
        assert!(!channels_near_equal(&uniform(8, 8, [100, 120, 100]), 3));
    }

    #[test]
    fn hsv_of_pure_red() {
        let hsv = to_hsv(&uniform(2, 2, [255, 0, 0]));
        assert_eq!(hsv.h[(0, 0)], 0.0);
        assert_eq!(hsv.s[(0, 0)], 1.0);
        assert_eq!(hsv.v[(0, 0)], 1.0);
    }

    #[test]
    fn hsv_of_eosin_pink() {
        // Hue 330, S 0.5, V ~0.5 in RGB8.
        let hsv = to_hsv(&uniform(2, 2, [128, 64, 96]));
        assert!((hsv.h[(0, 0)] - 330.0).abs() < 1.0, "hue {}", hsv.h[(0, 0)]);
        assert!((hsv.s[(0, 0)] - 0.5).abs() < 0.01);
        assert!((hsv.v[(0, 0)] - 0.502).abs() < 0.01);
    }

    #[test]
    fn tissue_ratio_saturates_on_uniform_stain_colors() {
        let config = GateConfig::default();
        let pink = to_hsv(&uniform(16, 16, [128, 64, 96]));
        assert_eq!(tissue_ratio(&pink, &config), 1.0);

        let blue = to_hsv(&uniform(16, 16, [0, 0, 255]));
        assert_eq!(tissue_ratio(&blue, &config), 1.0);

        let gray = to_hsv(&uniform(16, 16, [120, 120, 120]));
        assert_eq!(tissue_ratio(&gray, &config), 0.0);

        let orange = to_hsv(&uniform(16, 16, [255, 150, 40]));
        assert_eq!(tissue_ratio(&orange, &config), 0.0);
    }

    #[test]
    fn green_dominance() {
        let config = GateConfig::default();
        assert!(is_green_dominant(&uniform(16, 16, [40, 200, 40]), &config));
        assert!(!is_green_dominant(&uniform(16, 16, [128, 64, 96]), &config));
        // Bright but balanced: ratio check fails.
        assert!(!is_green_dominant(&uniform(16, 16, [200, 200, 200]), &config));
        // Green-tinted but dark: absolute floor fails.
        assert!(!is_green_dominant(&uniform(16, 16, [10, 60, 10]), &config));
    }
}
