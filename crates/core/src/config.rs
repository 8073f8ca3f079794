//! Layered application configuration.
//!
//! Values come from built-in defaults, then `~/.config/onfs/config.toml`,
//! then `ONFS_*` environment variables. Command-line `key=value` options are
//! applied on top by [`crate::args::LaunchOptions`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "onfs";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# OpenNFS launcher configuration.
# Every key is optional; command-line key=value options take precedence.

# Folder holding the installed NFS_* editions plus lanes/, misc/ and sfx/.
resource_root = "../resources"

# Working directory for converted assets (car/ and tracks/ are created inside).
asset_root = "./assets"

xres = 1920
yres = 1080

default_edition = "NFS_3"
default_track = "trk001"
default_car = "diab"

training_track = "trk008"
training_car = "diab"

# Skip an edition whose folders are incomplete instead of aborting discovery.
skip_broken_editions = false

# Write <asset_root>/catalog.json after every successful scan.
write_catalog_manifest = true
"#;

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder containing edition and shared resource folders.
    pub resource_root: PathBuf,
    /// Working directory for the car and track caches.
    pub asset_root: PathBuf,
    /// Default display width.
    pub xres: u32,
    /// Default display height.
    pub yres: u32,
    /// Edition used for the default and training selections.
    pub default_edition: String,
    /// Default track for the interactive loop.
    pub default_track: String,
    /// Default car for the interactive loop.
    pub default_car: String,
    /// Track used by training mode.
    pub training_track: String,
    /// Car used by training mode.
    pub training_car: String,
    /// Skip editions with missing layout folders instead of failing discovery.
    pub skip_broken_editions: bool,
    /// Persist the catalog snapshot after discovery.
    pub write_catalog_manifest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("../resources"),
            asset_root: PathBuf::from("./assets"),
            xres: 1920,
            yres: 1080,
            default_edition: "NFS_3".to_string(),
            default_track: "trk001".to_string(),
            default_car: "diab".to_string(),
            training_track: "trk008".to_string(),
            training_car: "diab".to_string(),
            skip_broken_editions: false,
            write_catalog_manifest: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration using `path` as the optional file layer.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("resource_root", path_string(&defaults.resource_root))?
            .set_default("asset_root", path_string(&defaults.asset_root))?
            .set_default("xres", i64::from(defaults.xres))?
            .set_default("yres", i64::from(defaults.yres))?
            .set_default("default_edition", defaults.default_edition)?
            .set_default("default_track", defaults.default_track)?
            .set_default("default_car", defaults.default_car)?
            .set_default("training_track", defaults.training_track)?
            .set_default("training_car", defaults.training_car)?
            .set_default("skip_broken_editions", defaults.skip_broken_editions)?
            .set_default("write_catalog_manifest", defaults.write_catalog_manifest)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ONFS").try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Converted car cache directory.
    pub fn car_cache_dir(&self) -> PathBuf {
        self.asset_root.join("car")
    }

    /// Converted track cache directory.
    pub fn track_cache_dir(&self) -> PathBuf {
        self.asset_root.join("tracks")
    }
}

/// Location of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn default_template_parses_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("onfs").join(CONFIG_FILE);
        write_default_config(&path)?;
        assert!(path.is_file());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "resource_root = \"/games/nfs\"\nxres = 1280\nskip_broken_editions = true\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.resource_root, PathBuf::from("/games/nfs"));
        assert_eq!(config.xres, 1280);
        assert_eq!(config.yres, 1080);
        assert!(config.skip_broken_editions);
        assert_eq!(config.car_cache_dir(), PathBuf::from("./assets/car"));
        Ok(())
    }

    #[test]
    fn existing_config_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "xres = 640\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "xres = 640\n");
        Ok(())
    }
}
