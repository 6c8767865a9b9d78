use crate::{
    dir_entry::DirEntry,
    names::ShortName,
};

/// Failures reported by a storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveError {
    /// Enumeration or lookup ran out of entries.
    NotFound,
    /// Seek or read past the stored data.
    Eof,
    /// The engine rejected the 8.3 name.
    InvalidName,
    /// `change_dir` on something that is not a directory.
    NotDirectory,
    /// Deleting a directory that still has children.
    NotEmpty,
    /// No space left on the medium.
    Full,
    /// Opaque hardware failure.
    Device,
}

/// Contract for a 16-bit word-addressable FAT storage engine.
///
/// The engine owns the medium; `DirEntry` values are cursors it reads and
/// updates in place. Everything below this trait thinks in words; byte
/// granularity is the adapter's problem.
///
/// Cursor rules:
/// - `find_first`/`find_next` enumerate the directory the entry's cursor is
///   in, overwriting the entry with each child in turn. `Err(NotFound)` ends
///   the scan.
/// - `change_dir` descends into the directory the entry names; subsequent
///   scans with that entry list its children.
/// - `create_file`/`create_dir` create under the entry's current directory;
///   on success the entry becomes the created object.
/// - `seek_words` positions the data cursor; `read_words` fills the whole
///   buffer or fails with `Eof` and moves nothing; `write_words` overwrites
///   at the cursor and grows the stored byte size to `max(old,
///   cursor_after * 2)`, never shrinking it.
pub trait WordDrive {
    /// Bring the medium up and return a cursor on the first entry of the
    /// root directory.
    fn init(&mut self) -> Result<DirEntry, DriveError>;

    fn find_first(&mut self, entry: &mut DirEntry) -> Result<(), DriveError>;
    fn find_next(&mut self, entry: &mut DirEntry) -> Result<(), DriveError>;
    fn change_dir(&mut self, entry: &mut DirEntry) -> Result<(), DriveError>;

    fn create_file(&mut self, entry: &mut DirEntry, name: &ShortName) -> Result<(), DriveError>;
    fn create_dir(&mut self, entry: &mut DirEntry, name: &ShortName) -> Result<(), DriveError>;
    fn remove(&mut self, entry: &mut DirEntry) -> Result<(), DriveError>;
    fn rename(&mut self, entry: &mut DirEntry, name: &ShortName) -> Result<(), DriveError>;

    fn seek_words(&mut self, entry: &mut DirEntry, word_pos: u32) -> Result<(), DriveError>;
    fn read_words(&mut self, entry: &mut DirEntry, words: &mut [u16]) -> Result<(), DriveError>;
    fn write_words(&mut self, entry: &mut DirEntry, words: &[u16]) -> Result<(), DriveError>;

    /// Set the stored byte size directly (truncate-on-open, odd-byte
    /// compensation). Data past the new size may be discarded.
    fn set_size(&mut self, entry: &mut DirEntry, bytes: u32) -> Result<(), DriveError>;

    fn close(&mut self, entry: &mut DirEntry) -> Result<(), DriveError>;
}
