use crate::config::GateConfig;
use crate::imaging::analysis;
use crate::imaging::decode::{DecodedImage, SourceColorMode};
use std::fmt;

/// Why the gate turned an upload away. The reason is logged server-side and
/// drives tests; end users only ever see a generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotRgb,
    TooSmall,
    GrayscaleDisguise,
    GreenDominant,
    LowTissueRatio,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::NotRgb => "not_rgb",
            RejectReason::TooSmall => "too_small",
            RejectReason::GrayscaleDisguise => "grayscale_disguise",
            RejectReason::GreenDominant => "green_dominant",
            RejectReason::LowTissueRatio => "low_tissue_ratio",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Accepted,
    Rejected(RejectReason),
}

/// Cheap, explainable pre-filter that rejects obviously wrong uploads
/// (photos, grayscale scans, screenshots) before a model inference is spent.
/// It is a content gate, not a modality classifier.
pub struct HistopathologyGate {
    config: GateConfig,
}

impl HistopathologyGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Ordered checks, first match wins.
    pub fn evaluate(&self, decoded: &DecodedImage) -> GateVerdict {
        let cfg = &self.config;

        if decoded.source_mode() == SourceColorMode::Other {
            return GateVerdict::Rejected(RejectReason::NotRgb);
        }

        if decoded.width() < cfg.min_width || decoded.height() < cfg.min_height {
            return GateVerdict::Rejected(RejectReason::TooSmall);
        }

        if analysis::channels_near_equal(decoded, cfg.gray_tolerance) {
            return GateVerdict::Rejected(RejectReason::GrayscaleDisguise);
        }

        if analysis::is_green_dominant(decoded, cfg) {
            return GateVerdict::Rejected(RejectReason::GreenDominant);
        }

        let hsv = analysis::to_hsv(decoded);
        if analysis::tissue_ratio(&hsv, cfg) < cfg.min_tissue_ratio {
            return GateVerdict::Rejected(RejectReason::LowTissueRatio);
        }

        GateVerdict::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> DecodedImage {
        let img = RgbImage::from_pixel(width, height, Rgb(rgb));
        DecodedImage::from_dynamic(DynamicImage::ImageRgb8(img))
    }

    fn gate() -> HistopathologyGate {
        HistopathologyGate::new(GateConfig::default())
    }

    #[test]
    fn non_rgb_source_is_rejected_first() {
        let pixels = RgbImage::from_pixel(256, 256, Rgb([128, 64, 96]));
        let decoded = DecodedImage::from_parts(pixels, SourceColorMode::Other);
        assert_eq!(
            gate().evaluate(&decoded),
            GateVerdict::Rejected(RejectReason::NotRgb)
        );
    }

    #[test]
    fn undersized_images_rejected_regardless_of_content() {
        let g = gate();
        // Perfectly tissue-colored, still too small.
        assert_eq!(
            g.evaluate(&uniform(64, 256, [128, 64, 96])),
            GateVerdict::Rejected(RejectReason::TooSmall)
        );
        assert_eq!(
            g.evaluate(&uniform(256, 127, [128, 64, 96])),
            GateVerdict::Rejected(RejectReason::TooSmall)
        );
    }

    #[test]
    fn size_check_precedes_grayscale_check() {
        assert_eq!(
            gate().evaluate(&uniform(64, 64, [120, 120, 120])),
            GateVerdict::Rejected(RejectReason::TooSmall)
        );
    }

    #[test]
    fn grayscale_disguised_as_rgb_is_rejected() {
        assert_eq!(
            gate().evaluate(&uniform(256, 256, [128, 129, 127])),
            GateVerdict::Rejected(RejectReason::GrayscaleDisguise)
        );
    }

    #[test]
    fn bright_green_is_rejected() {
        assert_eq!(
            gate().evaluate(&uniform(256, 256, [40, 200, 40])),
            GateVerdict::Rejected(RejectReason::GreenDominant)
        );
    }

    #[test]
    fn colorful_non_tissue_fails_the_ratio_check() {
        assert_eq!(
            gate().evaluate(&uniform(256, 256, [255, 150, 40])),
            GateVerdict::Rejected(RejectReason::LowTissueRatio)
        );
    }

    #[test]
    fn eosin_pink_field_is_accepted() {
        assert_eq!(
            gate().evaluate(&uniform(256, 256, [128, 64, 96])),
            GateVerdict::Accepted
        );
    }

    #[test]
    fn thresholds_come_from_config() {
        let config = GateConfig {
            min_tissue_ratio: 1.1, // impossible to satisfy
            ..GateConfig::default()
        };
        let g = HistopathologyGate::new(config);
        assert_eq!(
            g.evaluate(&uniform(256, 256, [128, 64, 96])),
            GateVerdict::Rejected(RejectReason::LowTissueRatio)
        );
    }
}
