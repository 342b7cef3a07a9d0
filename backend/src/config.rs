use serde::{Deserialize, Serialize};

/// Tunable thresholds for the histopathology content gate.
///
/// Every constant the gate consults lives here so the heuristics can be
/// retuned from a YAML file (or overridden per test) without touching the
/// algorithm. The defaults are the empirically tuned production values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum accepted dimensions; smaller uploads are rejected before any
    /// pixel analysis runs.
    pub min_width: u32,
    pub min_height: u32,
    /// Per-pixel channel tolerance for the grayscale-disguised-as-RGB check.
    pub gray_tolerance: u8,
    /// Saturation floor a pixel must clear to count as stained tissue.
    pub saturation_min: f32,
    /// Eosin (pink/magenta) hue band wraps around 0: [eosin_hue_min, 360]
    /// joined with [0, eosin_hue_max], degrees.
    pub eosin_hue_min: f32,
    pub eosin_hue_max: f32,
    /// Hematoxylin (purple/blue) hue band, degrees.
    pub hematoxylin_hue_min: f32,
    pub hematoxylin_hue_max: f32,
    /// Minimum fraction of tissue-like pixels required to accept.
    pub min_tissue_ratio: f32,
    /// Green dominance: reject when mean(G) > green_mean_ratio * (mean(R) +
    /// mean(B)) and mean(G) > green_mean_min (0-255 scale).
    pub green_mean_ratio: f32,
    pub green_mean_min: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_width: 128,
            min_height: 128,
            gray_tolerance: 3,
            saturation_min: 0.25,
            eosin_hue_min: 300.0,
            eosin_hue_max: 20.0,
            hematoxylin_hue_min: 210.0,
            hematoxylin_hue_max: 290.0,
            min_tissue_ratio: 0.12,
            green_mean_ratio: 0.75,
            green_mean_min: 110.0,
        }
    }
}

impl GateConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string(path)?;
        let config: GateConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let cfg = GateConfig::default();
        assert_eq!(cfg.min_width, 128);
        assert_eq!(cfg.min_height, 128);
        assert_eq!(cfg.gray_tolerance, 3);
        assert_eq!(cfg.saturation_min, 0.25);
        assert_eq!(cfg.min_tissue_ratio, 0.12);
        assert_eq!(cfg.green_mean_min, 110.0);
    }

    #[test]
    fn partial_yaml_overrides_fall_back_to_defaults() {
        let cfg: GateConfig = serde_yaml::from_str("min_tissue_ratio: 0.2\nmin_width: 64\n").unwrap();
        assert_eq!(cfg.min_tissue_ratio, 0.2);
        assert_eq!(cfg.min_width, 64);
        assert_eq!(cfg.min_height, 128);
        assert_eq!(cfg.saturation_min, 0.25);
    }
}
