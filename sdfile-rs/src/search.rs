//! Directory search: a find-first/find-next scan with dot skipping.

use crate::{
    dir_entry::DirEntry,
    drive::{DriveError, WordDrive},
    error::SdError,
    names::ShortName,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Directory,
}

/// Scan the directory `dir` points into for `name`. Files match on name
/// plus extension, directories on name alone; `.`/`..` never match.
pub(crate) fn find_entry<D: WordDrive>(
    drive: &mut D,
    dir: &DirEntry,
    name: &ShortName,
    kind: EntryKind,
) -> Result<DirEntry, SdError> {
    let mut cursor = *dir;
    match drive.find_first(&mut cursor) {
        Ok(()) => {}
        Err(DriveError::NotFound) => return Err(SdError::NotFound),
        Err(e) => return Err(e.into()),
    }
    loop {
        if !cursor.is_dot_entry() {
            let hit = match kind {
                EntryKind::File => !cursor.is_directory() && name.matches_file(&cursor),
                EntryKind::Directory => cursor.is_directory() && name.matches_dir(&cursor),
            };
            if hit {
                return Ok(cursor);
            }
        }
        match drive.find_next(&mut cursor) {
            Ok(()) => {}
            Err(DriveError::NotFound) => return Err(SdError::NotFound),
            Err(e) => return Err(e.into()),
        }
    }
}
