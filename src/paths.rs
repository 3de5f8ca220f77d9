//! Per-user config and cache directory resolution.
//!
//! Paths are resolved once, up front, and handed to each store at
//! construction. Nothing else in the crate consults the environment.

use std::path::PathBuf;

use crate::error::StoreError;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "geocachingapp";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the standard per-user locations, e.g.
    /// `~/.config/geocachingapp` and `~/.cache/geocachingapp` on Linux.
    pub fn resolve() -> Result<Self, StoreError> {
        let config_dir = dirs::config_dir()
            .ok_or(StoreError::MissingUserDir("config"))?
            .join(APP_NAME);
        let cache_dir = dirs::cache_dir()
            .ok_or(StoreError::MissingUserDir("cache"))?
            .join(APP_NAME);
        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Explicit directories, for tests and portable installs.
    pub fn with_dirs(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Create both directories if absent.
    pub fn ensure(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}
