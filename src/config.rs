use crate::pipeline::AdjustmentParams;
use crate::region::Connectivity;
use crate::seed::ColorRange;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for the tuning tool, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub input_image: PathBuf,
    pub output_image: PathBuf,
    #[serde(default = "default_color_range")]
    pub color_range: ColorRange,
    /// Parameters the session starts from and returns to on reset
    #[serde(default = "default_tuning_params")]
    pub defaults: AdjustmentParams,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_retention")]
    pub log_retention_count: usize,
    #[serde(default)]
    pub stream_logs: bool,
}

fn default_color_range() -> ColorRange {
    ColorRange::new([191, 70, 18], [223, 122, 66])
}

pub fn default_tuning_params() -> AdjustmentParams {
    AdjustmentParams {
        hue_shift: 30.0,
        saturation_scale: 1.0,
        value_scale: 1.0,
        h_tolerance: 15.0,
        s_tolerance: 0.24,
        v_tolerance: 0.26,
        connectivity: Connectivity::Eight,
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention() -> usize {
    10
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            input_image: PathBuf::from("input.png"),
            output_image: PathBuf::from("output.png"),
            color_range: default_color_range(),
            defaults: default_tuning_params(),
            log_dir: default_log_dir(),
            log_retention_count: default_log_retention(),
            stream_logs: false,
        }
    }
}

impl ToolConfig {
    /// Missing file means defaults; a present but invalid file is an error
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: ToolConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.color_range.validate().context("Invalid color_range")?;
        self.defaults.validate().context("Invalid default parameters")?;
        Ok(())
    }
}
