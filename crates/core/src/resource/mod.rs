//! Resource root discovery.

/// Folder-name classification into editions and shared folders.
pub mod classifier;
/// Per-edition layout rules.
pub mod layout;
/// Catalog construction over a resource root.
pub mod loader;

pub use classifier::{classify_folder, edition_tag, FolderKind};
pub use layout::{resolve_layout, EditionLayout};
pub use loader::{discover_catalog, CatalogBuilder};
