use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "AUTO_DASHBOARD_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Page layout of the summary PDF, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub font_size: f32,
    pub line_height: f32,
    pub margin: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            line_height: 12.0,
            margin: 50.0,
        }
    }
}

/// User-tunable dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Fixed histogram bin count; `None` picks one from the data size.
    pub histogram_bins: Option<usize>,
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    pub csv_file_name: String,
    pub pdf_file_name: String,
    pub pdf: PdfConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            histogram_bins: None,
            preview_rows: 5,
            csv_file_name: "filtered_data.csv".to_string(),
            pdf_file_name: "data_summary.pdf".to_string(),
            pdf: PdfConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from `$AUTO_DASHBOARD_CONFIG`, else `./dashboard.json`, else
    /// defaults, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load_from_file(&path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(bins) = std::env::var("AUTO_DASHBOARD_HISTOGRAM_BINS") {
            let bins = bins
                .parse()
                .context("invalid AUTO_DASHBOARD_HISTOGRAM_BINS value")?;
            self.histogram_bins = Some(bins);
        }
        if let Ok(rows) = std::env::var("AUTO_DASHBOARD_PREVIEW_ROWS") {
            self.preview_rows = rows
                .parse()
                .context("invalid AUTO_DASHBOARD_PREVIEW_ROWS value")?;
        }
        Ok(())
    }
}
