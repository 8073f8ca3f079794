#![warn(clippy::all, missing_docs)]

//! Core asset discovery for the OpenNFS launcher.
//!
//! This crate classifies installed game editions under a resource root,
//! applies each edition's on-disk layout rules to catalog tracks and cars,
//! and drives the load/render/reselect loop that hands concrete selections
//! to the rendering or training frontends.

pub mod args;
pub mod config;
pub mod directories;
pub mod error;
pub mod manifest;
pub mod models;
pub mod resource;
pub mod session;

pub use args::{parse_args, parse_args_os, ConfigurationMap, LaunchOptions, RunMode};
pub use config::AppConfig;
pub use directories::WorkingDirectories;
pub use error::{ArgumentError, DiscoveryError, LoadError};
pub use manifest::CatalogManifest;
pub use models::{AssetCatalog, AssetCatalogEntry, AssetSelection, EditionTag, SharedFolder};
pub use resource::{CatalogBuilder, FolderKind};
pub use session::{
    AssetLoader, DiskAssetLoader, LoadedCar, LoadedTrack, LoopState, RenderSession,
    SelectionLoop, TrainingSession,
};
