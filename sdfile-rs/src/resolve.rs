//! Path resolution: descend every intermediate directory, hand back a
//! cursor inside the parent plus the leaf component still as text. What
//! the leaf means (file, directory, thing to create) is the caller's call.

use crate::{
    dir_entry::DirEntry,
    drive::WordDrive,
    error::SdError,
    names::ShortName,
    search::{find_entry, EntryKind},
};

pub(crate) struct Resolved<'p> {
    /// Cursor whose scans enumerate the leaf's parent directory.
    pub(crate) parent: DirEntry,
    pub(crate) leaf: &'p str,
}

/// Walk `path` from the root cursor. Fails with `IntermediateDirNotFound`
/// when any non-leaf component is missing or malformed.
pub(crate) fn resolve<'p, D: WordDrive>(
    drive: &mut D,
    root: DirEntry,
    path: &'p str,
) -> Result<Resolved<'p>, SdError> {
    let mut parent = root;
    let mut components = path
        .trim_end_matches('/')
        .split('/')
        .filter(|c| !c.is_empty())
        .peekable();
    let mut leaf = "";
    while let Some(component) = components.next() {
        if components.peek().is_none() {
            leaf = component;
            break;
        }
        let name =
            ShortName::parse(component).map_err(|_| SdError::IntermediateDirNotFound)?;
        let mut dir = find_entry(drive, &parent, &name, EntryKind::Directory)
            .map_err(|_| SdError::IntermediateDirNotFound)?;
        drive.change_dir(&mut dir)?;
        parent = dir;
    }
    if leaf.is_empty() {
        return Err(SdError::InvalidPath);
    }
    Ok(Resolved { parent, leaf })
}
