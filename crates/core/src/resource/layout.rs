use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::{
    error::DiscoveryError,
    models::{AssetCatalogEntry, EditionTag},
};

/// Which directory entries a scan keeps, and how they are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFilter {
    /// Keep names containing the extension anywhere; store them without it.
    Extension(&'static str),
    /// Keep names containing none of these tokens, unchanged.
    Excluding(&'static [&'static str]),
}

impl NameFilter {
    fn apply(self, name: &str) -> Option<String> {
        match self {
            NameFilter::Extension(ext) => name.contains(ext).then(|| strip_extension(name)),
            NameFilter::Excluding(tokens) => tokens
                .iter()
                .all(|token| !name.contains(token))
                .then(|| name.to_string()),
        }
    }
}

/// One directory listing contributing to an edition's car list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarScan {
    /// Folder relative to the edition's car folder; empty for the car folder itself.
    pub sub_path: &'static str,
    /// Prepended to every kept name.
    pub prefix: &'static str,
    /// Entry filter.
    pub filter: NameFilter,
}

/// How an edition's cars are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarRule {
    /// The car folder must exist but its format is not understood; the list stays empty.
    Unlocated,
    /// Scans applied in order; results are concatenated without deduplication.
    Scans(&'static [CarScan]),
}

/// Fixed on-disk conventions for one edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditionLayout {
    /// Edition the rules apply to.
    pub tag: EditionTag,
    /// Track folder relative to the edition root; empty for the root itself.
    pub track_dir: &'static str,
    /// Track entry filter.
    pub track_filter: NameFilter,
    /// Car folder relative to the edition root; empty for the root itself.
    pub car_dir: &'static str,
    /// Car enumeration rule.
    pub cars: CarRule,
}

const TRACK_EXT: &str = ".TRK";
const CAR_EXT: &str = ".GEO";
const KEEP_ALL: NameFilter = NameFilter::Excluding(&[]);

const NFS_2_CARS: [CarScan; 1] = [CarScan {
    sub_path: "",
    prefix: "",
    filter: NameFilter::Extension(CAR_EXT),
}];

const NFS_3_CARS: [CarScan; 3] = [
    CarScan {
        sub_path: "",
        prefix: "",
        filter: NameFilter::Excluding(&["traffic"]),
    },
    CarScan {
        sub_path: "traffic",
        prefix: "traffic/",
        filter: KEEP_ALL,
    },
    CarScan {
        sub_path: "traffic/pursuit",
        prefix: "traffic/pursuit/",
        filter: NameFilter::Excluding(&["PURSUIT"]),
    },
];

const NFS_4_CARS: [CarScan; 4] = [
    CarScan {
        sub_path: "",
        prefix: "",
        filter: NameFilter::Excluding(&["TRAFFIC"]),
    },
    CarScan {
        sub_path: "TRAFFIC",
        prefix: "TRAFFIC/",
        filter: NameFilter::Excluding(&["CHOPPERS", "PURSUIT"]),
    },
    CarScan {
        sub_path: "TRAFFIC/CHOPPERS",
        prefix: "TRAFFIC/CHOPPERS/",
        filter: KEEP_ALL,
    },
    CarScan {
        sub_path: "TRAFFIC/PURSUIT",
        prefix: "TRAFFIC/PURSUIT/",
        filter: KEEP_ALL,
    },
];

static LAYOUTS: [EditionLayout; 5] = [
    EditionLayout {
        tag: EditionTag::Nfs2Se,
        track_dir: "GAMEDATA/TRACKS/SE",
        track_filter: NameFilter::Extension(TRACK_EXT),
        car_dir: "GAMEDATA/CARMODEL/PC",
        cars: CarRule::Unlocated,
    },
    EditionLayout {
        tag: EditionTag::Nfs2,
        track_dir: "GAMEDATA/TRACKS/PC",
        track_filter: NameFilter::Extension(TRACK_EXT),
        car_dir: "GAMEDATA/CARMODEL/PC",
        cars: CarRule::Scans(&NFS_2_CARS),
    },
    EditionLayout {
        tag: EditionTag::Nfs3Ps1,
        track_dir: "",
        track_filter: NameFilter::Extension(TRACK_EXT),
        car_dir: "",
        cars: CarRule::Scans(&NFS_2_CARS),
    },
    EditionLayout {
        tag: EditionTag::Nfs3,
        track_dir: "gamedata/tracks",
        track_filter: KEEP_ALL,
        car_dir: "gamedata/carmodel",
        cars: CarRule::Scans(&NFS_3_CARS),
    },
    EditionLayout {
        tag: EditionTag::Nfs4,
        track_dir: "DATA/TRACKS",
        track_filter: KEEP_ALL,
        car_dir: "DATA/CARS",
        cars: CarRule::Scans(&NFS_4_CARS),
    },
];

impl EditionLayout {
    /// Layout rules for an edition; `None` for `Unknown`.
    pub fn for_edition(tag: EditionTag) -> Option<&'static EditionLayout> {
        LAYOUTS.iter().find(|layout| layout.tag == tag)
    }

    /// Enumerate tracks and cars beneath an edition folder.
    pub fn resolve(&self, root: &Path) -> Result<AssetCatalogEntry, DiscoveryError> {
        let mut entry = AssetCatalogEntry::new(self.tag, root);

        let track_dir = self.required_dir(root, self.track_dir, "track")?;
        entry.tracks = scan(&track_dir, "", self.track_filter)?;

        let car_dir = self.required_dir(root, self.car_dir, "car")?;
        if let CarRule::Scans(scans) = self.cars {
            for car_scan in scans {
                let dir = self.required_dir(&car_dir, car_scan.sub_path, "car")?;
                entry
                    .cars
                    .extend(scan(&dir, car_scan.prefix, car_scan.filter)?);
            }
        }

        debug!(
            "{} at {}: {} tracks, {} cars",
            self.tag,
            root.display(),
            entry.tracks.len(),
            entry.cars.len()
        );
        Ok(entry)
    }

    /// On-disk location of a track identifier.
    ///
    /// Extension filters match anywhere in a name, so `TR01.TRK.BAK` is listed as
    /// `TR01.TRK`; when `{id}{ext}` is absent the track folder is searched for the
    /// entry that produced the identifier.
    pub fn track_path(&self, root: &Path, track: &str) -> PathBuf {
        locate(&root.join(self.track_dir), track, self.track_filter)
    }

    /// On-disk location of a car identifier, if this edition's cars are understood.
    pub fn car_path(&self, root: &Path, car: &str) -> Option<PathBuf> {
        match self.cars {
            CarRule::Unlocated => None,
            CarRule::Scans(scans) => {
                let filter = scans.first().map(|first| first.filter).unwrap_or(KEEP_ALL);
                Some(locate(&root.join(self.car_dir), car, filter))
            }
        }
    }

    fn required_dir(
        &self,
        base: &Path,
        relative: &str,
        kind: &'static str,
    ) -> Result<PathBuf, DiscoveryError> {
        let path = if relative.is_empty() {
            base.to_path_buf()
        } else {
            base.join(relative)
        };
        if !path.is_dir() {
            return Err(DiscoveryError::MissingEditionFolder {
                edition: self.tag,
                kind,
                path,
            });
        }
        Ok(path)
    }
}

/// Resolve the layout of `root` as edition `tag`. `Unknown` has no layout and yields an empty entry.
pub fn resolve_layout(tag: EditionTag, root: &Path) -> Result<AssetCatalogEntry, DiscoveryError> {
    match EditionLayout::for_edition(tag) {
        Some(layout) => layout.resolve(root),
        None => Ok(AssetCatalogEntry::new(tag, root)),
    }
}

fn scan(dir: &Path, prefix: &str, filter: NameFilter) -> Result<Vec<String>, DiscoveryError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| DiscoveryError::Io {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf()),
            source: err.into(),
        })?;
        let name = entry.file_name().to_string_lossy();
        if let Some(kept) = filter.apply(&name) {
            names.push(format!("{prefix}{kept}"));
        }
    }
    Ok(names)
}

fn strip_extension(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

fn locate(dir: &Path, id: &str, filter: NameFilter) -> PathBuf {
    let NameFilter::Extension(ext) = filter else {
        return dir.join(id);
    };
    let candidate = dir.join(format!("{id}{ext}"));
    if candidate.exists() {
        return candidate;
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| filter.apply(&entry.file_name().to_string_lossy()).as_deref() == Some(id))
        .map(|entry| entry.into_path())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, b"")?;
        Ok(())
    }

    #[test]
    fn nfs2_strips_extensions_and_filters_by_substring() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_2");
        touch(&root.join("GAMEDATA/TRACKS/PC/TR00.TRK"))?;
        touch(&root.join("GAMEDATA/TRACKS/PC/TR00.COL"))?;
        touch(&root.join("GAMEDATA/TRACKS/PC/TR01.TRK.BAK"))?;
        touch(&root.join("GAMEDATA/CARMODEL/PC/MCLAREN.GEO"))?;
        touch(&root.join("GAMEDATA/CARMODEL/PC/MCLAREN.QFS"))?;

        let entry = resolve_layout(EditionTag::Nfs2, &root)?;
        assert_eq!(entry.tracks, vec!["TR00", "TR01.TRK"]);
        assert_eq!(entry.cars, vec!["MCLAREN"]);
        Ok(())
    }

    #[test]
    fn nfs2_special_edition_requires_car_folder_but_lists_no_cars() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_2_SE");
        touch(&root.join("GAMEDATA/TRACKS/SE/TR02.TRK"))?;
        touch(&root.join("GAMEDATA/CARMODEL/PC/SUPERCAR.GEO"))?;

        let entry = resolve_layout(EditionTag::Nfs2Se, &root)?;
        assert_eq!(entry.tracks, vec!["TR02"]);
        assert!(entry.cars.is_empty());

        fs::remove_dir_all(root.join("GAMEDATA/CARMODEL"))?;
        let err = resolve_layout(EditionTag::Nfs2Se, &root).unwrap_err();
        assert!(err.is_edition_scoped());
        Ok(())
    }

    #[test]
    fn ps1_release_scans_the_edition_root() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_3_PS1");
        touch(&root.join("TRK000.TRK"))?;
        touch(&root.join("ZDIAB.GEO"))?;
        touch(&root.join("README.TXT"))?;

        let entry = resolve_layout(EditionTag::Nfs3Ps1, &root)?;
        assert_eq!(entry.tracks, vec!["TRK000"]);
        assert_eq!(entry.cars, vec!["ZDIAB"]);
        Ok(())
    }

    #[test]
    fn nfs3_prefixes_traffic_and_filters_pursuit() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_3");
        fs::create_dir_all(root.join("gamedata/tracks/trk001"))?;
        fs::create_dir_all(root.join("gamedata/tracks/trk002"))?;
        let cars = root.join("gamedata/carmodel");
        fs::create_dir_all(cars.join("diab"))?;
        fs::create_dir_all(cars.join("COP1"))?;
        fs::create_dir_all(cars.join("traffic/pursuit/COP1"))?;
        fs::create_dir_all(cars.join("traffic/pursuit/COP1_PURSUIT"))?;
        fs::create_dir_all(cars.join("traffic/bus"))?;

        let entry = resolve_layout(EditionTag::Nfs3, &root)?;
        assert_eq!(entry.tracks, vec!["trk001", "trk002"]);
        assert_eq!(
            entry.cars,
            vec![
                "COP1",
                "diab",
                "traffic/bus",
                "traffic/pursuit",
                "traffic/pursuit/COP1",
            ]
        );
        Ok(())
    }

    #[test]
    fn nfs4_nested_traffic_groups() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_4");
        fs::create_dir_all(root.join("DATA/TRACKS/TR010"))?;
        let cars = root.join("DATA/CARS");
        fs::create_dir_all(cars.join("F355"))?;
        fs::create_dir_all(cars.join("TRAFFIC/TAXI"))?;
        fs::create_dir_all(cars.join("TRAFFIC/CHOPPERS/HELI"))?;
        fs::create_dir_all(cars.join("TRAFFIC/PURSUIT/CRVIC"))?;

        let entry = resolve_layout(EditionTag::Nfs4, &root)?;
        assert_eq!(entry.tracks, vec!["TR010"]);
        assert_eq!(
            entry.cars,
            vec![
                "F355",
                "TRAFFIC/TAXI",
                "TRAFFIC/CHOPPERS/HELI",
                "TRAFFIC/PURSUIT/CRVIC",
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_nested_folder_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_4");
        fs::create_dir_all(root.join("DATA/TRACKS"))?;
        fs::create_dir_all(root.join("DATA/CARS/TRAFFIC/CHOPPERS"))?;

        match resolve_layout(EditionTag::Nfs4, &root) {
            Err(DiscoveryError::MissingEditionFolder { edition, path, .. }) => {
                assert_eq!(edition, EditionTag::Nfs4);
                assert!(path.ends_with("TRAFFIC/PURSUIT"));
            }
            other => panic!("expected missing folder, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn identifiers_with_an_inner_extension_resolve_to_the_listed_file() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("NFS_2");
        touch(&root.join("GAMEDATA/TRACKS/PC/TR00.TRK"))?;
        touch(&root.join("GAMEDATA/TRACKS/PC/TR01.TRK.BAK"))?;
        touch(&root.join("GAMEDATA/CARMODEL/PC/MCLAREN.GEO.OLD"))?;

        let layout = EditionLayout::for_edition(EditionTag::Nfs2).unwrap();
        let entry = layout.resolve(&root)?;
        assert_eq!(entry.tracks, vec!["TR00", "TR01.TRK"]);
        assert_eq!(entry.cars, vec!["MCLAREN.GEO"]);

        let tracks = root.join("GAMEDATA/TRACKS/PC");
        assert_eq!(layout.track_path(&root, "TR00"), tracks.join("TR00.TRK"));
        assert_eq!(layout.track_path(&root, "TR01.TRK"), tracks.join("TR01.TRK.BAK"));
        assert_eq!(
            layout.car_path(&root, "MCLAREN.GEO"),
            Some(root.join("GAMEDATA/CARMODEL/PC/MCLAREN.GEO.OLD"))
        );
        Ok(())
    }

    #[test]
    fn resolves_identifiers_back_to_paths() {
        let root = Path::new("/res/NFS_2");
        let layout = EditionLayout::for_edition(EditionTag::Nfs2).unwrap();
        assert_eq!(
            layout.track_path(root, "TR00"),
            root.join("GAMEDATA/TRACKS/PC").join("TR00.TRK")
        );
        assert_eq!(
            layout.car_path(root, "MCLAREN"),
            Some(root.join("GAMEDATA/CARMODEL/PC").join("MCLAREN.GEO"))
        );

        let nfs3 = EditionLayout::for_edition(EditionTag::Nfs3).unwrap();
        assert_eq!(
            nfs3.car_path(Path::new("/res/NFS_3"), "traffic/pursuit/COP1"),
            Some(Path::new("/res/NFS_3/gamedata/carmodel").join("traffic/pursuit/COP1"))
        );

        let se = EditionLayout::for_edition(EditionTag::Nfs2Se).unwrap();
        assert_eq!(se.car_path(root, "anything"), None);
        assert!(EditionLayout::for_edition(EditionTag::Unknown).is_none());
    }
}
