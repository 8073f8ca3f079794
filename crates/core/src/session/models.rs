use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EditionTag;

/// Track resolved on disk and owned by the selection loop for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedTrack {
    /// Edition the track belongs to.
    pub tag: EditionTag,
    /// Catalog identifier.
    pub name: String,
    /// Track file or folder.
    pub path: PathBuf,
    /// When the handle was produced.
    pub loaded_at: DateTime<Utc>,
}

/// Car resolved on disk and owned by the selection loop for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedCar {
    /// Edition the car belongs to.
    pub tag: EditionTag,
    /// Catalog identifier, including any traffic prefix.
    pub name: String,
    /// Car file or folder.
    pub path: PathBuf,
    /// When the handle was produced.
    pub loaded_at: DateTime<Utc>,
}

impl LoadedCar {
    /// Whether the car came from one of the traffic sub-folders.
    pub fn is_traffic(&self) -> bool {
        self.name.to_ascii_lowercase().starts_with("traffic/")
    }
}
