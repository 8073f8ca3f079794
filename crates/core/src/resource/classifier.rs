use crate::models::{fold_name, EditionTag, SharedFolder};

/// What a top-level resource folder turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    /// An installed edition.
    Edition(EditionTag),
    /// One of the shared resource folders.
    Shared(SharedFolder),
    /// Nothing recognisable; callers warn and skip it.
    Unknown,
}

// Tested top to bottom. `NFS_2_SE` must precede `NFS_2` and `NFS_3_PS1` must
// precede `NFS_3` because the shorter token is contained in the longer one.
const EDITION_TOKENS: [(&str, EditionTag); 5] = [
    ("nfs2se", EditionTag::Nfs2Se),
    ("nfs2", EditionTag::Nfs2),
    ("nfs3ps1", EditionTag::Nfs3Ps1),
    ("nfs3", EditionTag::Nfs3),
    ("nfs4", EditionTag::Nfs4),
];

/// Classify a folder base name. Edition tokens win over shared-folder tokens.
pub fn classify_folder(name: &str) -> FolderKind {
    let folded = fold_name(name);

    if let Some((_, tag)) = EDITION_TOKENS
        .into_iter()
        .find(|(token, _)| folded.contains(*token))
    {
        return FolderKind::Edition(tag);
    }

    SharedFolder::ALL
        .into_iter()
        .find(|folder| folded.contains(folder.token()))
        .map(FolderKind::Shared)
        .unwrap_or(FolderKind::Unknown)
}

/// Edition tag for a folder name, `Unknown` for shared or unrecognised folders.
pub fn edition_tag(name: &str) -> EditionTag {
    match classify_folder(name) {
        FolderKind::Edition(tag) => tag,
        FolderKind::Shared(_) | FolderKind::Unknown => EditionTag::Unknown,
    }
}
