// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application configuration stored as RON.

use material_editor_graph::touch::DEFAULT_TOUCH_TIME;
use material_editor_graph::{EditorStyle, LinkPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "MATERIAL_EDITOR_CONFIG";
/// Config file used when the environment variable is unset
pub const DEFAULT_CONFIG_FILE: &str = "material_editor.ron";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Config IO error for {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid RON for [`AppConfig`]
    #[error("Malformed config {path}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: ron::error::SpannedError,
    },

    /// Serializing the config failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial inner size in logical pixels
    pub size: [u32; 2],
    /// Minimum inner size in logical pixels
    pub min_size: [u32; 2],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Material Editor".to_string(),
            size: [1280, 720],
            min_size: [640, 480],
        }
    }
}

/// Texture files loaded during initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory the file names are relative to
    pub directory: PathBuf,
    /// Blueprint header background
    pub header_background: String,
    /// "Save state" icon
    pub save_icon: String,
    /// "Restore state" icon
    pub restore_icon: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            header_background: "BlueprintBackground.png".to_string(),
            save_icon: "ic_save_white_24dp.png".to_string(),
            restore_icon: "ic_restore_white_24dp.png".to_string(),
        }
    }
}

impl AssetConfig {
    /// Full path of an asset file
    pub fn path(&self, file: &str) -> PathBuf {
        self.directory.join(file)
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Texture files
    pub assets: AssetConfig,
    /// Touch highlight duration in seconds
    pub touch_time: f32,
    /// Initial width of the left pane
    pub left_pane_width: f32,
    /// Link creation rules
    pub link_policy: LinkPolicy,
    /// Canvas style
    pub style: EditorStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            touch_time: DEFAULT_TOUCH_TIME,
            left_pane_width: 400.0,
            link_policy: LinkPolicy::default(),
            style: EditorStyle::default(),
        }
    }
}

impl AppConfig {
    /// Config path from the environment, or the default file name
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Config {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the config as pretty RON
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("material_editor_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.touch_time, 1.0);
        assert!(!config.link_policy.enforce_pin_types);
        assert_eq!(
            config.assets.path(&config.assets.header_background),
            Path::new("assets").join("BlueprintBackground.png")
        );
    }

    #[test]
    fn test_serialization() {
        let mut config = AppConfig::default();
        config.window.title = "Test".to_string();
        config.link_policy.enforce_pin_types = true;
        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: AppConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = temp_path("missing.ron");
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let path = temp_path("partial.ron");
        std::fs::write(&path, "(touch_time: 2.5, window: (title: \"Demo\"))").unwrap();
        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.touch_time, 2.5);
        assert_eq!(config.window.title, "Demo");
        assert_eq!(config.window.size, WindowConfig::default().size);
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_path("malformed.ron");
        std::fs::write(&path, "(touch_time: \"soon\"").unwrap();
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("saved.ron");
        let mut config = AppConfig::default();
        config.left_pane_width = 320.0;
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
