//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

/// Default chart font. Thai-capable so tree labels render for local users.
pub const DEFAULT_CHART_FONT: &str = "TH Sarabun";

/// Default upper bound on an uploaded spreadsheet.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Rendering options handed to the chart renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    /// Font family for every text element (from TREE_CARBON_CHART_FONT)
    pub font_family: String,
    pub width: u32,
    pub height: u32,
    pub bar_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_CHART_FONT.to_string(),
            width: 1000,
            height: 600,
            bar_color: "#4c72b0".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Where uploads, reports and charts are written (from TREE_CARBON_UPLOAD_DIR)
    pub upload_dir: PathBuf,
    /// Request body limit for uploads (from TREE_CARBON_MAX_UPLOAD_BYTES)
    pub max_upload_bytes: usize,
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let upload_dir = std::env::var("TREE_CARBON_UPLOAD_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_upload_dir);

        let max_upload_bytes = std::env::var("TREE_CARBON_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let mut chart = ChartConfig::default();
        if let Ok(font) = std::env::var("TREE_CARBON_CHART_FONT") {
            chart.font_family = font;
        }

        Self {
            upload_dir,
            max_upload_bytes,
            chart,
        }
    }

    /// Create a config writing into `upload_dir` with all other defaults.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chart: ChartConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Per-user data directory, or `./uploads` when none can be determined.
fn default_upload_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "tree-carbon")
        .map(|dirs| dirs.data_dir().join("uploads"))
        .unwrap_or_else(|| PathBuf::from("uploads"))
}
