//! Directory cursor operations: child enumeration.
//!
//! A directory handle's entry doubles as its scan cursor; `.`/`..` are
//! skipped everywhere so enumeration only ever yields real children.

use crate::{
    dir_entry::DirEntry,
    drive::{DriveError, WordDrive},
    error::SdError,
    file::{File, FileMode},
    sd::Sd,
};

impl File {
    /// Open the child the cursor is on and advance the cursor. Returns an
    /// unusable handle once the directory is exhausted (or on any
    /// failure), which terminates listing loops.
    pub fn open_next<D: WordDrive>(&mut self, sd: &Sd<D>) -> File {
        match self.try_open_next(sd) {
            Ok(f) => f,
            Err(e) => {
                log::debug!("open_next in {} failed: {:?}", self.name(), e);
                File::closed()
            }
        }
    }

    /// Reset the cursor to the first child.
    pub fn rewind<D: WordDrive>(&mut self, sd: &Sd<D>) {
        if !self.open || !self.directory {
            return;
        }
        let mut drive = sd.drive_mut();
        match Self::position_at_first_child(&mut *drive, &mut self.entry) {
            Ok(has_children) => self.at_end = !has_children,
            Err(_) => self.at_end = true,
        }
    }

    fn try_open_next<D: WordDrive>(&mut self, sd: &Sd<D>) -> Result<File, SdError> {
        if !self.open {
            return Err(SdError::NotOpen);
        }
        if !self.directory {
            return Err(SdError::NotADirectory);
        }
        if self.at_end {
            return Err(SdError::NotFound);
        }
        let mut drive = sd.drive_mut();

        let child_entry = self.entry;
        let child_start = child_entry.start_cluster();
        let name = child_entry.display_name();
        let child = if child_entry.is_directory() {
            let mut cursor = child_entry;
            drive.change_dir(&mut cursor)?;
            let has_children = Self::position_at_first_child(&mut *drive, &mut cursor)?;
            let mut f = File::opened(cursor, FileMode::Read, true, name, child_start);
            f.at_end = !has_children;
            f
        } else {
            File::opened(child_entry, FileMode::Read, false, name, child_start)
        };
        sd.registry_mut().register(child_start)?;

        // Advance past the child just handed out.
        loop {
            match drive.find_next(&mut self.entry) {
                Ok(()) => {
                    if !self.entry.is_dot_entry() {
                        break;
                    }
                }
                Err(DriveError::NotFound) => {
                    self.at_end = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(child)
    }

    /// Park `entry` on the first real child of the directory it is in.
    /// Returns false when the directory has none.
    pub(crate) fn position_at_first_child<D: WordDrive>(
        drive: &mut D,
        entry: &mut DirEntry,
    ) -> Result<bool, DriveError> {
        match drive.find_first(entry) {
            Ok(()) => {}
            Err(DriveError::NotFound) => return Ok(false),
            Err(e) => return Err(e),
        }
        loop {
            if !entry.is_dot_entry() {
                return Ok(true);
            }
            match drive.find_next(entry) {
                Ok(()) => {}
                Err(DriveError::NotFound) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
    }
}
