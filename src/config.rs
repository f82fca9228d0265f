//! Configuration file for batch checks.
//!
//! ```yaml
//! version: "1"
//! extensions: ["rzn"]
//! excluded_paths: ["**/build/**"]
//! fail_on_warnings: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file names looked up in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["razencheck.yaml", ".razencheck.yaml"];

/// Written by `razencheck init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/razencheck.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config must list at least one file extension")]
    NoExtensions,

    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    /// File extensions (without the dot) considered by `check`.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns for paths to skip, e.g. "**/build/**".
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Fail the run on warnings as well as errors.
    #[serde(default)]
    pub fail_on_warnings: bool,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["rzn".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            extensions: default_extensions(),
            excluded_paths: Vec::new(),
            fail_on_warnings: false,
        }
    }
}

impl Config {
    /// Parse and validate a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config at `explicit`, or the first one found by [`discover`],
    /// or the defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(|| discover(cwd)) {
            Some(path) => {
                tracing::info!(path = %path.display(), "using config");
                Self::parse_file(path)
            }
            None => {
                tracing::debug!("no config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoExtensions);
        }
        self.excluded_matcher().map(|_| ())
    }

    /// Compiled matcher for `excluded_paths`.
    pub fn excluded_matcher(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Whether `path` has one of the configured extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

/// First config file in `cwd`, then in the user config directory.
pub fn discover(cwd: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| cwd.join(name))
        .find(|p| p.is_file())
        .or_else(|| {
            let dir = directories::ProjectDirs::from("", "", "razencheck")?;
            Some(dir.config_dir().join(CONFIG_FILE_NAMES[0])).filter(|p| p.is_file())
        })
}
