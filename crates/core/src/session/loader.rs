use chrono::Utc;
use tracing::debug;

use crate::{
    error::LoadError,
    models::{AssetCatalog, AssetCatalogEntry, EditionTag},
    resource::EditionLayout,
};

use super::{
    models::{LoadedCar, LoadedTrack},
    AssetLoader,
};

/// Resolves catalog identifiers to files under each edition's root.
///
/// Only existence is checked; decoding the geometry is left to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct DiskAssetLoader<'a> {
    catalog: &'a AssetCatalog,
}

impl<'a> DiskAssetLoader<'a> {
    pub fn new(catalog: &'a AssetCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve_track(&self, tag: EditionTag, track: &str) -> Result<LoadedTrack, LoadError> {
        let (entry, layout) = self.installed(tag)?;
        let path = layout.track_path(&entry.root, track);
        if !path.exists() {
            return Err(LoadError::UnresolvedTrack {
                edition: tag,
                track: track.to_string(),
                path,
            });
        }
        debug!("resolved track {}/{} to {}", tag, track, path.display());
        Ok(LoadedTrack {
            tag,
            name: track.to_string(),
            path,
            loaded_at: Utc::now(),
        })
    }

    pub fn resolve_car(&self, tag: EditionTag, car: &str) -> Result<LoadedCar, LoadError> {
        let (entry, layout) = self.installed(tag)?;
        let path = layout
            .car_path(&entry.root, car)
            .ok_or(LoadError::CarsNotLocated(tag))?;
        if !path.exists() {
            return Err(LoadError::UnresolvedCar {
                edition: tag,
                car: car.to_string(),
                path,
            });
        }
        debug!("resolved car {}/{} to {}", tag, car, path.display());
        Ok(LoadedCar {
            tag,
            name: car.to_string(),
            path,
            loaded_at: Utc::now(),
        })
    }

    fn installed(
        &self,
        tag: EditionTag,
    ) -> Result<(&'a AssetCatalogEntry, &'static EditionLayout), LoadError> {
        let entry = self
            .catalog
            .entry(tag)
            .ok_or(LoadError::EditionNotInstalled(tag))?;
        let layout = EditionLayout::for_edition(tag).ok_or(LoadError::EditionNotInstalled(tag))?;
        Ok((entry, layout))
    }
}

impl AssetLoader for DiskAssetLoader<'_> {
    type Track = LoadedTrack;
    type Car = LoadedCar;

    fn load_track(&mut self, tag: EditionTag, track: &str) -> anyhow::Result<LoadedTrack> {
        Ok(self.resolve_track(tag, track)?)
    }

    fn load_car(&mut self, tag: EditionTag, car: &str) -> anyhow::Result<LoadedCar> {
        Ok(self.resolve_car(tag, car)?)
    }
}
