use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Result;
use crate::substitute::DEFAULT_MAX_FILE_BYTES;

/// Main configuration structure for rootplan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub walker: WalkerSettings,

    #[serde(default)]
    pub replace: ReplaceSettings,

    #[serde(default)]
    pub moves: MoveSettings,
}

/// Directory listing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerSettings {
    /// Cap used when a listing request does not name one
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Text replacement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceSettings {
    /// Files larger than this fail with FileTooLarge
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

/// Move configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveSettings {
    #[serde(default)]
    pub on_destination_exists: DestinationPolicy,
}

/// What a committed move does when its destination already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPolicy {
    /// Report DestinationExists and leave both paths untouched
    #[default]
    Fail,
    /// Replace the destination
    Overwrite,
}

fn default_max_entries() -> usize {
    5000
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for ReplaceSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Settings {
    /// Load settings with layered overrides.
    ///
    /// **Priority (highest to lowest):**
    /// 1. `ROOTPLAN_<SECTION>__<KEY>` environment variables
    /// 2. `explicit` if given, else `./rootplan.toml`
    /// 3. `<user config dir>/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = Self::global_config_path() {
            builder = builder.add_source(File::from(global_path).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path.to_path_buf()).required(true)),
            None => builder.add_source(File::with_name("rootplan").required(false)),
        };

        let settings = builder
            .add_source(
                Environment::with_prefix("ROOTPLAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// `~/.config/rootplan/config.toml` on Linux, platform equivalents elsewhere
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rootplan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
