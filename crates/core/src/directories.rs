//! Working directories that must exist before any asset is converted.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Car and track cache folders under the configured asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectories {
    /// Converted car cache.
    pub car_cache: PathBuf,
    /// Converted track cache.
    pub track_cache: PathBuf,
}

impl WorkingDirectories {
    /// Paths derived from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            car_cache: config.car_cache_dir(),
            track_cache: config.track_cache_dir(),
        }
    }

    /// Create any missing directory chain. Safe to call repeatedly.
    pub fn ensure(&self) -> Result<()> {
        for path in [&self.car_cache, &self.track_cache] {
            if path.is_dir() {
                debug!("working directory {} already present", path.display());
                continue;
            }
            fs::create_dir_all(path)
                .with_context(|| format!("failed to create working directory {}", path.display()))?;
            info!("created working directory {}", path.display());
        }
        Ok(())
    }
}
