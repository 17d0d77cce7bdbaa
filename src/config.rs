use crate::effect::{EffectConfig, EffectType};
use crate::render::ColorMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid effect config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} already exists")]
    Exists(PathBuf),
}

/// User configuration loaded from the config file.
/// All fields are optional. CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default effect id
    pub effect: Option<String>,
    /// Base tint (#RGB or #RRGGBB)
    pub color: Option<String>,
    /// Global opacity (0-1)
    pub opacity: Option<f64>,
    /// Speed multiplier
    pub speed: Option<f64>,
    /// Size multiplier
    pub size: Option<f64>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Terminal color mode
    pub color_mode: Option<ColorModeConfig>,
    /// Hide status bar
    pub clean: Option<bool>,
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

impl Config {
    /// Effect settings from the file, over the built-in defaults. Unknown
    /// effect ids fall back to `none`.
    pub fn effect_config(&self) -> EffectConfig {
        let mut cfg = EffectConfig::new(
            self.effect
                .as_deref()
                .and_then(EffectType::from_id)
                .unwrap_or_default(),
        );
        if let Some(color) = &self.color {
            cfg.color = color.clone();
        }
        cfg.opacity = self.opacity;
        cfg.speed = self.speed;
        cfg.size = self.size;
        cfg
    }
}

/// Get the config file path: ~/.config/biofx/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("biofx").join("config.toml"))
}

/// Load config from a file. A missing file is an empty config.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the user config. Problems are logged and the defaults used.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}");
            Config::default()
        }
    }
}

/// Write the commented default config. Refuses to overwrite an existing file.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::Exists(path.to_path_buf()));
    }
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    std::fs::write(path, default_config_string()).map_err(io_err)
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r##"# biofx configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Default effect (use --list to see all)
# effect = "galaxy"

# Base tint, #RGB or #RRGGBB
# color = "#ffffff"

# Global opacity (0-1)
# opacity = 0.7

# Speed and size multipliers
# speed = 1.0
# size = 1.0

# Target FPS (1-120)
# fps = 30

# Color mode: mono, ansi16, ansi256, true-color
# color_mode = "true-color"

# Hide status bar
# clean = false
"##
    .to_string()
}
