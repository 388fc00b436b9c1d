//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: explicit path, else `$XDG_CONFIG_HOME/checktree/checktree.toml`
//! 3. Environment variables: `CHECKTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{Reconciler, RenderOptions, DEFAULT_SECTION_NAME};

/// Unified configuration for checktree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Section name for descriptors that carry none (default: unnamed_section)
    pub default_section: String,
    /// Append node ids when rendering trees
    pub show_ids: bool,
    /// Append payloads when rendering trees
    pub show_payload: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_section: DEFAULT_SECTION_NAME.to_string(),
            show_ids: false,
            show_payload: true,
        }
    }
}

/// Get the XDG config directory for checktree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "checktree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("checktree.toml"))
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given. Without
    ///   it the global file is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let file_source = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                Some(File::from(path).format(FileFormat::Toml).required(true))
            }
            None => global_config_path()
                .filter(|path| path.exists())
                .map(|path| File::from(path).format(FileFormat::Toml).required(false)),
        };

        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("default_section", defaults.default_section)
            .map_err(config_err)?
            .set_default("show_ids", defaults.show_ids)
            .map_err(config_err)?
            .set_default("show_payload", defaults.show_payload)
            .map_err(config_err)?;

        if let Some(source) = file_source {
            builder = builder.add_source(source);
        }
        builder = builder.add_source(Environment::with_prefix("CHECKTREE").try_parsing(true));

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Reconciler configured with the default section name.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.default_section.clone())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_ids: self.show_ids,
            show_payload: self.show_payload,
        }
    }

    /// Render as TOML for display.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
