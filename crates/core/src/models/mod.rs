//! Shared domain models.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Installed game edition recognised from a resource folder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditionTag {
    /// Need for Speed II: Special Edition.
    #[serde(rename = "NFS_2_SE")]
    Nfs2Se,
    /// Need for Speed II.
    #[serde(rename = "NFS_2")]
    Nfs2,
    /// Need for Speed III: Hot Pursuit, PlayStation release.
    #[serde(rename = "NFS_3_PS1")]
    Nfs3Ps1,
    /// Need for Speed III: Hot Pursuit.
    #[serde(rename = "NFS_3")]
    Nfs3,
    /// Need for Speed: High Stakes.
    #[serde(rename = "NFS_4")]
    Nfs4,
    /// Unclassifiable folder, and the selection sentinel that ends the render loop.
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl EditionTag {
    /// Every known edition in classifier priority order. `Unknown` is not included.
    pub const INSTALLABLE: [EditionTag; 5] = [
        EditionTag::Nfs2Se,
        EditionTag::Nfs2,
        EditionTag::Nfs3Ps1,
        EditionTag::Nfs3,
        EditionTag::Nfs4,
    ];

    /// Canonical folder token, also used as the display and serialized name.
    pub fn token(self) -> &'static str {
        match self {
            EditionTag::Nfs2Se => "NFS_2_SE",
            EditionTag::Nfs2 => "NFS_2",
            EditionTag::Nfs3Ps1 => "NFS_3_PS1",
            EditionTag::Nfs3 => "NFS_3",
            EditionTag::Nfs4 => "NFS_4",
            EditionTag::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable title for menus.
    pub fn title(self) -> &'static str {
        match self {
            EditionTag::Nfs2Se => "Need for Speed II SE",
            EditionTag::Nfs2 => "Need for Speed II",
            EditionTag::Nfs3Ps1 => "Need for Speed III (PS1)",
            EditionTag::Nfs3 => "Need for Speed III: Hot Pursuit",
            EditionTag::Nfs4 => "Need for Speed: High Stakes",
            EditionTag::Unknown => "Unknown",
        }
    }

    /// Whether this tag is the loop-terminating sentinel.
    pub fn is_unknown(self) -> bool {
        self == EditionTag::Unknown
    }
}

impl fmt::Display for EditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for EditionTag {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded = fold_name(value);
        if folded == fold_name(EditionTag::Unknown.token()) {
            return Ok(EditionTag::Unknown);
        }
        EditionTag::INSTALLABLE
            .into_iter()
            .find(|tag| fold_name(tag.token()) == folded)
            .ok_or_else(|| format!("unknown edition '{value}'"))
    }
}

/// Lowercase a name and drop every non-alphanumeric character.
///
/// Folder names in the wild mix `NFS_3`, `nfs3` and `Nfs-3`; folding makes them comparable.
pub fn fold_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Edition-independent resource folders that every installation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedFolder {
    /// AI lane data.
    Lanes,
    /// Fonts, UI textures and other loose assets.
    Misc,
    /// Sound effects.
    Sfx,
}

impl SharedFolder {
    /// All shared folders in validation order.
    pub const ALL: [SharedFolder; 3] = [SharedFolder::Lanes, SharedFolder::Misc, SharedFolder::Sfx];

    /// Token matched against folder names.
    pub fn token(self) -> &'static str {
        match self {
            SharedFolder::Lanes => "lanes",
            SharedFolder::Misc => "misc",
            SharedFolder::Sfx => "sfx",
        }
    }
}

impl fmt::Display for SharedFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Tracks and cars discovered for one installed edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCatalogEntry {
    /// Edition this folder was classified as.
    pub tag: EditionTag,
    /// Edition folder beneath the resource root.
    pub root: PathBuf,
    /// Track identifiers in discovery order.
    pub tracks: Vec<String>,
    /// Car identifiers in discovery order, some prefixed with their traffic sub-folder.
    pub cars: Vec<String>,
}

impl AssetCatalogEntry {
    /// Create an empty entry for an edition rooted at `root`.
    pub fn new(tag: EditionTag, root: impl Into<PathBuf>) -> Self {
        Self {
            tag,
            root: root.into(),
            tracks: Vec::new(),
            cars: Vec::new(),
        }
    }
}

/// Every installed edition plus the presence of the shared resource folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCatalog {
    /// Installed editions in discovery order.
    pub entries: Vec<AssetCatalogEntry>,
    /// A `lanes` folder was found.
    pub has_lanes: bool,
    /// A `misc` folder was found.
    pub has_misc: bool,
    /// A `sfx` folder was found.
    pub has_sfx: bool,
    /// Top-level folders that were skipped with a warning.
    #[serde(default)]
    pub ignored: Vec<String>,
}

impl AssetCatalog {
    /// Record a shared folder as present.
    pub fn mark_shared(&mut self, folder: SharedFolder) {
        match folder {
            SharedFolder::Lanes => self.has_lanes = true,
            SharedFolder::Misc => self.has_misc = true,
            SharedFolder::Sfx => self.has_sfx = true,
        }
    }

    /// Whether a shared folder has been recorded.
    pub fn has_shared(&self, folder: SharedFolder) -> bool {
        match folder {
            SharedFolder::Lanes => self.has_lanes,
            SharedFolder::Misc => self.has_misc,
            SharedFolder::Sfx => self.has_sfx,
        }
    }

    /// First entry for the given edition.
    pub fn entry(&self, tag: EditionTag) -> Option<&AssetCatalogEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    /// Installed edition tags in catalog order.
    pub fn editions(&self) -> Vec<EditionTag> {
        self.entries.iter().map(|entry| entry.tag).collect()
    }

    /// Whether `track` is listed for `tag`.
    pub fn contains_track(&self, tag: EditionTag, track: &str) -> bool {
        self.entries
            .iter()
            .filter(|entry| entry.tag == tag)
            .any(|entry| entry.tracks.iter().any(|name| name == track))
    }

    /// Whether `car` is listed for `tag`.
    pub fn contains_car(&self, tag: EditionTag, car: &str) -> bool {
        self.entries
            .iter()
            .filter(|entry| entry.tag == tag)
            .any(|entry| entry.cars.iter().any(|name| name == car))
    }

    /// Total number of tracks and cars across all editions.
    pub fn asset_counts(&self) -> (usize, usize) {
        self.entries.iter().fold((0, 0), |(tracks, cars), entry| {
            (tracks + entry.tracks.len(), cars + entry.cars.len())
        })
    }
}

/// The (edition, track, car) tuple that drives one load cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSelection {
    /// Edition the track belongs to. `Unknown` ends the render loop.
    pub track_tag: EditionTag,
    /// Track identifier within `track_tag`.
    pub track: String,
    /// Edition the car belongs to.
    pub car_tag: EditionTag,
    /// Car identifier within `car_tag`.
    pub car: String,
}

impl AssetSelection {
    /// Build a selection where track and car come from the same edition.
    pub fn new(tag: EditionTag, track: impl Into<String>, car: impl Into<String>) -> Self {
        Self {
            track_tag: tag,
            track: track.into(),
            car_tag: tag,
            car: car.into(),
        }
    }

    /// Selection returned by a session to stop the render loop.
    pub fn terminate() -> Self {
        Self {
            track_tag: EditionTag::Unknown,
            track: String::new(),
            car_tag: EditionTag::Unknown,
            car: String::new(),
        }
    }

    /// Whether this selection ends the render loop.
    pub fn is_terminal(&self) -> bool {
        self.track_tag.is_unknown()
    }
}

impl fmt::Display for AssetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "track {}/{} with car {}/{}",
            self.track_tag, self.track, self.car_tag, self.car
        )
    }
}
