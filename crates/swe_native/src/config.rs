//! Binding configuration: library location and ephemeris directory.
//!
//! Resolution order is explicit values > config file > environment >
//! platform default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the shared library.
pub const LIBRARY_PATH_ENV: &str = "SWE_LIBRARY_PATH";
/// Environment variable naming the ephemeris file directory.
pub const EPHE_PATH_ENV: &str = "SE_EPHE_PATH";

/// Errors building a [`NativeConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Where to find the native library and its data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeConfig {
    /// Shared library file; a bare name is resolved by the platform loader.
    pub library_path: PathBuf,
    /// Directory with ephemeris files; `None` keeps the native default.
    pub ephe_path: Option<PathBuf>,
}

/// On-disk form: every key optional, unknown keys rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    library_path: Option<PathBuf>,
    ephe_path: Option<PathBuf>,
}

/// Platform file name of the Swiss Ephemeris shared library.
pub const fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "swedll64.dll"
    } else if cfg!(target_os = "macos") {
        "libswe.dylib"
    } else {
        "libswe.so"
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self::new(default_library_name())
    }
}

impl NativeConfig {
    pub fn new(library_path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: library_path.into(),
            ephe_path: None,
        }
    }

    pub fn with_ephe_path(mut self, ephe_path: impl Into<PathBuf>) -> Self {
        self.ephe_path = Some(ephe_path.into());
        self
    }

    /// Parse a TOML document; omitted keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        Self::default().with_toml_overrides(content)
    }

    /// Override with the keys present in a TOML document.
    pub fn with_toml_overrides(mut self, content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        if let Some(lib) = file.library_path {
            self.library_path = lib;
        }
        if let Some(ephe) = file.ephe_path {
            self.ephe_path = Some(ephe);
        }
        Ok(self)
    }

    /// Load a TOML config file over the platform default.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::default().with_file_overrides(path)
    }

    /// Override with the keys present in a TOML config file.
    pub fn with_file_overrides(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = self
            .with_toml_overrides(&content)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("loaded native config from {}", path.display());
        Ok(config)
    }

    /// Platform default overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply [`LIBRARY_PATH_ENV`] and [`EPHE_PATH_ENV`] as returned by
    /// `lookup`; empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(lib) = non_empty(LIBRARY_PATH_ENV) {
            self.library_path = PathBuf::from(lib);
        }
        if let Some(ephe) = non_empty(EPHE_PATH_ENV) {
            self.ephe_path = Some(PathBuf::from(ephe));
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("library_path must not be empty"));
        }
        if let Some(ephe) = &self.ephe_path {
            if ephe.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("ephe_path must not be empty when set"));
            }
        }
        Ok(())
    }
}
