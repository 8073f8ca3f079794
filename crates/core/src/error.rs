#![allow(missing_docs)]

//! Typed failures raised by argument parsing, discovery and asset loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{EditionTag, SharedFolder};

/// Problems with `key=value` launch arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// Token without `=` or with nothing before it.
    #[error("invalid option on command line ({reason}): {token}")]
    MalformedArgument { token: String, reason: &'static str },

    /// Token that is not valid UTF-8.
    #[error("invalid option on command line (not valid UTF-8): {0}")]
    NonUnicodeArgument(String),

    /// Well-formed token whose value cannot be used.
    #[error("invalid value for '{key}': {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A rendering backend this build does not include.
    #[error("this build was not compiled with {0} support")]
    UnsupportedRenderer(String),
}

/// Failures while scanning the resource root.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The resource root itself is absent.
    #[error("resource directory {} is missing", .0.display())]
    MissingResourceRoot(PathBuf),

    /// An edition's expected layout folder is absent.
    #[error("{edition} {kind} folder {} is missing", .path.display())]
    MissingEditionFolder {
        edition: EditionTag,
        kind: &'static str,
        path: PathBuf,
    },

    /// One of `lanes`, `misc` or `sfx` was not found.
    #[error("missing '{0}' folder in resources directory")]
    MissingSharedFolder(SharedFolder),

    /// Directory listing failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    /// Failures confined to one edition folder, as opposed to the whole resource root.
    pub fn is_edition_scoped(&self) -> bool {
        matches!(self, DiscoveryError::MissingEditionFolder { .. })
    }
}

/// Failures resolving a selection against the installed files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The selection names an edition that is not in the catalog.
    #[error("{0} is not installed")]
    EditionNotInstalled(EditionTag),

    /// The edition keeps its cars somewhere the layout rules do not cover.
    #[error("car storage for {0} has not been located")]
    CarsNotLocated(EditionTag),

    /// Track identifier does not exist on disk.
    #[error("track {track} for {edition} not found at {}", .path.display())]
    UnresolvedTrack {
        edition: EditionTag,
        track: String,
        path: PathBuf,
    },

    /// Car identifier does not exist on disk.
    #[error("car {car} for {edition} not found at {}", .path.display())]
    UnresolvedCar {
        edition: EditionTag,
        car: String,
        path: PathBuf,
    },
}
