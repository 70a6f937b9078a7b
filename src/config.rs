use crate::mask::BrushSettings;
use crate::model::Style;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub mask: MaskConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Generation can take minutes on a cold model.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    #[serde(default = "default_brush_width")]
    pub default_brush_width: f32,
    #[serde(default = "default_min_brush_width")]
    pub min_brush_width: f32,
    #[serde(default = "default_max_brush_width")]
    pub max_brush_width: f32,
}

/// Which image object detection runs against after a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionTarget {
    /// The uploaded photo. Positions may drift from the generated content.
    #[default]
    Source,
    /// The freshly generated result, fetched back from the backend.
    Generated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub target: DetectionTarget,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub catalog_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
    #[serde(default)]
    pub default_style: Style,
    #[serde(default)]
    pub recent_sources: Vec<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    180
}

fn default_brush_width() -> f32 {
    20.0
}

fn default_min_brush_width() -> f32 {
    5.0
}

fn default_max_brush_width() -> f32 {
    50.0
}

fn default_prompt() -> String {
    "interior design".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            default_brush_width: default_brush_width(),
            min_brush_width: default_min_brush_width(),
            max_brush_width: default_max_brush_width(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_prompt: default_prompt(),
            default_style: Style::default(),
            recent_sources: Vec::new(),
        }
    }
}

impl MaskConfig {
    /// Brush limits, repaired if the file has them inverted.
    pub fn brush_settings(&self) -> BrushSettings {
        let min = self.min_brush_width.min(self.max_brush_width).max(1.0);
        let max = self.max_brush_width.max(self.min_brush_width).max(min);
        BrushSettings {
            default_width: self.default_brush_width.clamp(min, max),
            min_width: min,
            max_width: max,
        }
    }
}

/// Get the path to the config file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("", "", "lumina").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.toml"))
}

/// Load configuration from the default location, or defaults if missing or invalid
pub fn load_config() -> AppConfig {
    match config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            warn!("{e}; using defaults");
            AppConfig::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    match read_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), "{e}; using defaults");
            AppConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Save configuration to the default location
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_path()?)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml = toml::to_string_pretty(config)?;
    std::fs::write(path, toml)?;
    Ok(())
}

/// Add a source photo path to the recent list
pub fn add_recent_source(config: &mut AppConfig, path: String) {
    config.session.recent_sources.retain(|p| p != &path);
    config.session.recent_sources.insert(0, path);
    config.session.recent_sources.truncate(10);
}

/// Recent photos that still exist on disk, newest first.
pub fn recent_sources(config: &AppConfig, limit: usize) -> Vec<PathBuf> {
    config
        .session
        .recent_sources
        .iter()
        .map(PathBuf::from)
        .filter(|path| path.is_file())
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [backend]
            base_url = "http://studio:9000"

            [detection]
            target = "generated"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://studio:9000");
        assert_eq!(config.backend.connect_timeout_secs, 5);
        assert_eq!(config.detection.target, DetectionTarget::Generated);
        assert_eq!(config.mask.default_brush_width, 20.0);
        assert_eq!(config.session.default_prompt, "interior design");
        assert_eq!(config.session.default_style, Style::Indus);
    }

    #[test]
    fn inverted_brush_limits_are_repaired() {
        let mask = MaskConfig {
            default_brush_width: 80.0,
            min_brush_width: 40.0,
            max_brush_width: 10.0,
        };
        let brush = mask.brush_settings();
        assert_eq!(brush.min_width, 10.0);
        assert_eq!(brush.max_width, 40.0);
        assert_eq!(brush.default_width, 40.0);
    }

    #[test]
    fn recent_sources_are_deduplicated_and_capped() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            add_recent_source(&mut config, format!("room-{i}.jpg"));
        }
        add_recent_source(&mut config, "room-5.jpg".to_string());
        let recent = &config.session.recent_sources;
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], "room-5.jpg");
        assert_eq!(recent.iter().filter(|p| *p == "room-5.jpg").count(), 1);
    }
}
