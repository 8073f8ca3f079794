//! Catalog snapshot written next to the converted asset caches.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::AssetCatalog;

/// Result of one discovery run, persisted for tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// When the resource root was scanned.
    pub scanned_at: DateTime<Utc>,
    /// Resource root that was scanned.
    pub resource_root: PathBuf,
    /// Discovered catalog.
    pub catalog: AssetCatalog,
}

impl CatalogManifest {
    /// Snapshot a freshly built catalog.
    pub fn new(resource_root: impl Into<PathBuf>, catalog: AssetCatalog) -> Self {
        Self {
            scanned_at: Utc::now(),
            resource_root: resource_root.into(),
            catalog,
        }
    }

    /// Load a manifest from the given path, returning `None` if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let manifest = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse manifest {}", path.display()))?;
        Ok(Some(manifest))
    }

    /// Persist the manifest, creating parent directories if needed.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create manifest directory {}", parent.display())
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize catalog manifest")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write manifest {}", path.display()))
    }
}

/// Default manifest location inside an asset root.
pub fn manifest_path(asset_root: impl AsRef<Path>) -> PathBuf {
    asset_root.as_ref().join("catalog.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetCatalogEntry, EditionTag};
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn absent_manifest_loads_as_none() -> Result<()> {
        let dir = tempdir()?;
        assert!(CatalogManifest::load(manifest_path(dir.path()))?.is_none());
        Ok(())
    }

    #[test]
    fn persisted_manifest_uses_edition_tokens() -> Result<()> {
        let dir = tempdir()?;
        let mut entry = AssetCatalogEntry::new(EditionTag::Nfs3Ps1, "/res/NFS_3_PS1");
        entry.tracks.push("TRK000".to_string());
        let catalog = AssetCatalog {
            entries: vec![entry],
            has_lanes: true,
            has_misc: true,
            has_sfx: true,
            ignored: vec!["readme_stuff".to_string()],
        };
        let manifest = CatalogManifest::new("/res", catalog);
        let path = manifest_path(dir.path().join("assets"));
        manifest.persist(&path)?;

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(raw["catalog"]["entries"][0]["tag"], "NFS_3_PS1");

        let loaded = CatalogManifest::load(&path)?.expect("manifest written above");
        assert_eq!(loaded, manifest);
        Ok(())
    }
}
