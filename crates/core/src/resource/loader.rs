use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    error::DiscoveryError,
    models::{AssetCatalog, SharedFolder},
};

use super::{
    classifier::{classify_folder, FolderKind},
    layout::resolve_layout,
};

/// Scans a resource root once and produces the installed-asset catalog.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    root: PathBuf,
    skip_broken_editions: bool,
}

impl CatalogBuilder {
    /// Build a catalog for the given resource root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_broken_editions: false,
        }
    }

    /// Skip editions with missing layout folders instead of failing the whole scan.
    pub fn skip_broken_editions(mut self, skip: bool) -> Self {
        self.skip_broken_editions = skip;
        self
    }

    /// Resource root being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify every immediate subdirectory, resolve editions and validate shared folders.
    pub fn build(&self) -> Result<AssetCatalog, DiscoveryError> {
        if !self.root.is_dir() {
            return Err(DiscoveryError::MissingResourceRoot(self.root.clone()));
        }

        let mut catalog = AssetCatalog::default();
        for folder in self.folders()? {
            let name = folder
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            match classify_folder(&name) {
                FolderKind::Edition(tag) => match resolve_layout(tag, &folder) {
                    Ok(entry) => catalog.entries.push(entry),
                    Err(err) if self.skip_broken_editions && err.is_edition_scoped() => {
                        warn!("Skipping {}: {}", name, err);
                        catalog.ignored.push(name);
                    }
                    Err(err) => return Err(err),
                },
                FolderKind::Shared(shared) => catalog.mark_shared(shared),
                FolderKind::Unknown => {
                    warn!("Unknown folder in resources directory: {}", name);
                    catalog.ignored.push(name);
                }
            }
        }

        if let Some(missing) = SharedFolder::ALL
            .into_iter()
            .find(|shared| !catalog.has_shared(*shared))
        {
            return Err(DiscoveryError::MissingSharedFolder(missing));
        }

        let (tracks, cars) = catalog.asset_counts();
        info!(
            "Discovered {} editions with {} tracks and {} cars in {}",
            catalog.entries.len(),
            tracks,
            cars,
            self.root.display()
        );
        Ok(catalog)
    }

    fn folders(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        let io_error = |source| DiscoveryError::Io {
            path: self.root.clone(),
            source,
        };

        let mut folders = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            // `Path::is_dir` follows symlinks, `DirEntry::file_type` does not.
            let path = entry.path();
            if path.is_dir() {
                folders.push(path);
            } else {
                debug!("ignoring non-directory {}", path.display());
            }
        }

        folders.sort();
        Ok(folders)
    }
}

/// Convenience wrapper around [`CatalogBuilder`] with default policy.
pub fn discover_catalog(root: impl Into<PathBuf>) -> Result<AssetCatalog, DiscoveryError> {
    CatalogBuilder::new(root).build()
}
