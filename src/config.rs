//! Settings for the catalog location and path resolution defaults.
//!
//! Merged from three layers, lowest precedence first: built-in defaults,
//! an optional per-user TOML file, and `VERISET_`-prefixed environment
//! variables. The catalog itself is never configured at query time; only
//! where to find it and which sample extension to assume by default.

use config::{Config, Environment, File as ConfigFile};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Well-known location of the single catalog file
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Extension appended to logical sample paths when none is given.
    /// Includes the leading dot, as in `.hdf5`.
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "veriset")
}

fn default_catalog_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("veriset.catalog"))
        .unwrap_or_else(|| PathBuf::from("veriset.catalog"))
}

fn default_extension() -> String {
    ".hdf5".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_path: default_catalog_path(),
            default_extension: default_extension(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, the optional per-user config file, and
    /// the environment (`VERISET_CATALOG_PATH`, `VERISET_DEFAULT_EXTENSION`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(dirs) = project_dirs() {
            let file = dirs.config_dir().join("config.toml");
            if file.exists() {
                builder = builder.add_source(ConfigFile::from(file));
            }
        }

        builder
            .add_source(Environment::with_prefix("VERISET"))
            .build()?
            .try_deserialize()
    }
}
