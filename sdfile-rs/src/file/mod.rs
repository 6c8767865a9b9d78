//! `File`: byte-granular access on top of a word-granular engine.
//!
//! The engine stores 16-bit words; callers think in bytes. Everything odd
//! about this module follows from that mismatch. A write that ends on an
//! odd byte count leaves its final byte parked in `pending_write` until the
//! next write supplies the low half of the word, a flush pads it, or a
//! close commits it. A read that ends mid-word keeps the unconsumed low
//! half in `pending_read`. Seeking to an odd offset splits the word there:
//! the low half becomes the read-ahead byte and, on writable handles, the
//! high half is re-staged as the pending write byte so a flush cannot lose
//! the neighbor (`pending_from_seek` marks that state).
//!
//! Invariant: whenever `pending_write` is set, it holds the byte at
//! `position - 1` (an even offset) and the engine word cursor sits on that
//! byte's word.

mod dir;
mod print;

pub use print::{Base, FileWriter, Value};

use crate::{
    codec,
    dir_entry::{DirEntry, DisplayName},
    drive::{DriveError, WordDrive},
    error::SdError,
    sd::Sd,
};

/// Access mode fixed at open time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Read,
    /// Truncate to zero, cursor at the start.
    Write,
    /// Keep contents, cursor past the last byte.
    Append,
}

/// An open file or directory cursor.
///
/// Handles are move-only. Failed opens return a handle for which
/// `is_open()` is false and every operation is a no-op sentinel, so call
/// sites need no branching on the open path.
///
/// `close` is mandatory: unregistering needs the volume, so there is no
/// `Drop` impl. A handle that is dropped without `close` keeps its
/// registry slot (and, for writable handles, any un-flushed final byte)
/// until the volume itself is torn down.
pub struct File {
    pub(crate) entry: DirEntry,
    pub(crate) mode: FileMode,
    pub(crate) open: bool,
    pub(crate) directory: bool,
    /// Directory cursors only: enumeration has run out.
    pub(crate) at_end: bool,
    pub(crate) name: DisplayName,
    pub(crate) start_cluster: u32,
    pub(crate) position: u32,
    pub(crate) pending_write: Option<u8>,
    pub(crate) pending_read: Option<u8>,
    pub(crate) pending_from_seek: bool,
}

impl File {
    pub(crate) fn closed() -> File {
        File {
            entry: DirEntry::empty(),
            mode: FileMode::Read,
            open: false,
            directory: false,
            at_end: true,
            name: DisplayName::new(),
            start_cluster: u32::MAX,
            position: 0,
            pending_write: None,
            pending_read: None,
            pending_from_seek: false,
        }
    }

    pub(crate) fn opened(
        entry: DirEntry,
        mode: FileMode,
        directory: bool,
        name: DisplayName,
        start_cluster: u32,
    ) -> File {
        File {
            entry,
            mode,
            open: true,
            directory,
            at_end: false,
            name,
            start_cluster,
            position: 0,
            pending_write: None,
            pending_read: None,
            pending_from_seek: false,
        }
    }

    #[inline(always)]
    pub fn is_open(&self) -> bool {
        self.open && !self.name.is_empty()
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    #[inline(always)]
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Leaf name: `NAME.EXT` for files, `NAME/` for directories, `/` for
    /// the root.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Logical size in bytes. A pending write byte that extends the file
    /// counts; one re-staged by a seek does not.
    pub fn size(&self) -> u32 {
        if !self.open || self.directory {
            return 0;
        }
        let stored = self.entry.size();
        if self.pending_write.is_some() && self.position > stored {
            self.position
        } else {
            stored
        }
    }

    #[inline(always)]
    pub fn position(&self) -> u32 {
        if self.open {
            self.position
        } else {
            0
        }
    }

    /// Bytes left between the cursor and the end of the file.
    pub fn available(&self) -> u32 {
        self.size().saturating_sub(self.position)
    }

    /// Read exactly `buf.len()` bytes. All-or-nothing: returns the full
    /// count, or 0 without moving the cursor when the request cannot be
    /// satisfied.
    pub fn read<D: WordDrive>(&mut self, sd: &Sd<D>, buf: &mut [u8]) -> usize {
        match self.try_read(sd, buf) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("read {} failed: {:?}", self.name(), e);
                0
            }
        }
    }

    /// Next byte without advancing the cursor, or `None` at the end.
    pub fn peek<D: WordDrive>(&mut self, sd: &Sd<D>) -> Option<u8> {
        if !self.open || self.directory {
            return None;
        }
        if let Some(b) = self.pending_read {
            return Some(b);
        }
        if self.available() == 0 {
            return None;
        }
        let mut drive = sd.drive_mut();
        let word_pos = self.position / 2;
        drive.seek_words(&mut self.entry, word_pos).ok()?;
        let mut word = [0u16; 1];
        drive.read_words(&mut self.entry, &mut word).ok()?;
        let cursor = self.cursor_words();
        drive.seek_words(&mut self.entry, cursor).ok()?;
        if self.position % 2 == 0 {
            Some(codec::high_byte(word[0]))
        } else {
            Some(codec::low_byte(word[0]))
        }
    }

    /// Write the whole buffer at the cursor. Returns `buf.len()`, or 0 on
    /// failure with the cursor restored. Overwrites in place; never
    /// truncates the tail of the file.
    pub fn write<D: WordDrive>(&mut self, sd: &Sd<D>, buf: &[u8]) -> usize {
        match self.try_write(sd, buf) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("write {} failed: {:?}", self.name(), e);
                0
            }
        }
    }

    /// Move the cursor to `pos`. Fails (returning false, cursor unmoved)
    /// when `pos > size()`.
    pub fn seek<D: WordDrive>(&mut self, sd: &Sd<D>, pos: u32) -> bool {
        self.try_seek(sd, pos).is_ok()
    }

    /// Commit a pending write byte, if any.
    pub fn flush<D: WordDrive>(&mut self, sd: &Sd<D>) {
        if !self.open || self.directory || self.mode == FileMode::Read {
            return;
        }
        let mut drive = sd.drive_mut();
        if let Err(e) = self.flush_inner(&mut *drive) {
            log::debug!("flush {} failed: {:?}", self.name(), e);
        }
    }

    /// Flush, close the engine entry, and release the registry slot. Safe
    /// to call on an already-closed handle.
    pub fn close<D: WordDrive>(&mut self, sd: &Sd<D>) {
        if !self.open {
            return;
        }
        if !self.directory {
            let mut drive = sd.drive_mut();
            let end = self.size();
            if self.position < end {
                let _ = self.seek_inner(&mut *drive, end);
            }
            if let Err(e) = self.flush_inner(&mut *drive) {
                log::debug!("close {}: flush failed: {:?}", self.name(), e);
            }
            let _ = drive.close(&mut self.entry);
        }
        sd.registry_mut().unregister(self.start_cluster);
        self.open = false;
    }

    pub(crate) fn try_read<D: WordDrive>(
        &mut self,
        sd: &Sd<D>,
        buf: &mut [u8],
    ) -> Result<usize, SdError> {
        if !self.open {
            return Err(SdError::NotOpen);
        }
        if self.directory {
            return Err(SdError::IsDirectory);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if buf.len() as u32 > self.available() {
            return Err(SdError::EndOfFile);
        }
        let mut drive = sd.drive_mut();
        let saved = self.save_cursor_state();
        match self.read_inner(&mut *drive, buf) {
            Ok(()) => Ok(buf.len()),
            Err(e) => {
                self.restore_cursor_state(&mut *drive, saved);
                Err(e)
            }
        }
    }

    fn read_inner<D: WordDrive>(
        &mut self,
        drive: &mut D,
        buf: &mut [u8],
    ) -> Result<(), SdError> {
        // A pending write byte from sequential writing would be skipped by
        // the word reads below; commit it first.
        if self.pending_write.is_some() && !self.pending_from_seek {
            self.flush_inner(drive)?;
        }
        // Odd cursor with nothing read ahead (right after that flush):
        // re-split the word so the low half is consumable.
        if self.position % 2 == 1 && self.pending_read.is_none() {
            drive.seek_words(&mut self.entry, self.position / 2)?;
            let mut word = [0u16; 1];
            drive.read_words(&mut self.entry, &mut word)?;
            self.pending_read = Some(codec::low_byte(word[0]));
        }

        let mut filled = 0;
        if let Some(b) = self.pending_read.take() {
            buf[0] = b;
            filled = 1;
            self.position += 1;
            if self.pending_from_seek {
                // Half of the split word is consumed; line the cursor up
                // past it and drop the re-staged write byte.
                drive.seek_words(&mut self.entry, self.position / 2)?;
                self.pending_write = None;
                self.pending_from_seek = false;
            }
        }

        let remaining = buf.len() - filled;
        let whole = remaining & !1;
        let mut words = [0u16; codec::CHUNK_WORDS];
        let mut done = 0;
        while done < whole {
            let bytes = codec::CHUNK_BYTES.min(whole - done);
            let n = bytes / 2;
            drive.read_words(&mut self.entry, &mut words[..n])?;
            codec::unpack_words(&words[..n], &mut buf[filled + done..filled + done + bytes]);
            done += bytes;
        }
        self.position += whole as u32;

        if remaining % 2 == 1 {
            let mut word = [0u16; 1];
            drive.read_words(&mut self.entry, &mut word)?;
            buf[buf.len() - 1] = codec::high_byte(word[0]);
            self.position += 1;
            if self.position < self.entry.size() {
                self.pending_read = Some(codec::low_byte(word[0]));
            }
        }
        Ok(())
    }

    pub(crate) fn try_write<D: WordDrive>(
        &mut self,
        sd: &Sd<D>,
        data: &[u8],
    ) -> Result<usize, SdError> {
        if !self.open {
            return Err(SdError::NotOpen);
        }
        if self.directory {
            return Err(SdError::IsDirectory);
        }
        if self.mode == FileMode::Read {
            return Err(SdError::NotWritable);
        }
        if data.is_empty() {
            return Ok(0);
        }
        let mut drive = sd.drive_mut();
        let saved = self.save_cursor_state();
        match self.write_inner(&mut *drive, data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                self.restore_cursor_state(&mut *drive, saved);
                Err(e)
            }
        }
    }

    fn write_inner<D: WordDrive>(
        &mut self,
        drive: &mut D,
        data: &[u8],
    ) -> Result<(), SdError> {
        // Any read-ahead byte is stale once we start writing here.
        self.pending_read = None;

        // Odd cursor with no staged byte (reads got us here): pull the
        // stored high half so the combine below preserves it.
        if self.position % 2 == 1 && self.pending_write.is_none() {
            let word_pos = self.position / 2;
            drive.seek_words(&mut self.entry, word_pos)?;
            let mut word = [0u16; 1];
            drive.read_words(&mut self.entry, &mut word)?;
            drive.seek_words(&mut self.entry, word_pos)?;
            self.pending_write = Some(codec::high_byte(word[0]));
            self.pending_from_seek = false;
        }

        let mut rest = data;
        if let Some(hi) = self.pending_write.take() {
            // Cursor already sits on the split word.
            let word = (hi as u16) << 8 | rest[0] as u16;
            drive.write_words(&mut self.entry, &[word])?;
            self.position += 1;
            rest = &rest[1..];
            self.pending_from_seek = false;
        }

        let whole = rest.len() & !1;
        let mut words = [0u16; codec::CHUNK_WORDS];
        let mut done = 0;
        while done < whole {
            let bytes = codec::CHUNK_BYTES.min(whole - done);
            let n = codec::pack_words(&rest[done..done + bytes], &mut words);
            drive.write_words(&mut self.entry, &words[..n])?;
            self.position += bytes as u32;
            done += bytes;
        }

        if rest.len() % 2 == 1 {
            self.pending_write = Some(rest[rest.len() - 1]);
            self.pending_from_seek = false;
            self.position += 1;
        }
        Ok(())
    }

    pub(crate) fn try_seek<D: WordDrive>(&mut self, sd: &Sd<D>, pos: u32) -> Result<(), SdError> {
        if !self.open {
            return Err(SdError::NotOpen);
        }
        if self.directory {
            return Err(SdError::IsDirectory);
        }
        if pos > self.size() {
            return Err(SdError::EndOfFile);
        }
        let mut drive = sd.drive_mut();
        self.seek_inner(&mut *drive, pos)
    }

    fn seek_inner<D: WordDrive>(&mut self, drive: &mut D, pos: u32) -> Result<(), SdError> {
        if self.pending_write.is_some() && !self.pending_from_seek {
            self.flush_inner(drive)?;
        }
        self.pending_read = None;
        self.pending_write = None;
        self.pending_from_seek = false;

        drive.seek_words(&mut self.entry, pos / 2)?;
        if pos % 2 == 1 {
            let mut word = [0u16; 1];
            match drive.read_words(&mut self.entry, &mut word) {
                Ok(()) => {
                    if pos < self.entry.size() {
                        self.pending_read = Some(codec::low_byte(word[0]));
                    }
                    if self.mode != FileMode::Read {
                        // Park the cursor back on the split word and
                        // re-stage its high half so a later flush keeps it.
                        // Read-only handles stay past the word instead,
                        // matching the ordinary read-ahead state.
                        drive.seek_words(&mut self.entry, pos / 2)?;
                        self.pending_write = Some(codec::high_byte(word[0]));
                        self.pending_from_seek = true;
                    }
                }
                // Seeking to the padded end of an odd-sized file.
                Err(DriveError::Eof) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.position = pos;
        Ok(())
    }

    fn flush_inner<D: WordDrive>(&mut self, drive: &mut D) -> Result<(), SdError> {
        let hi = match self.pending_write {
            Some(b) => b,
            None => return Ok(()),
        };
        let word_pos = (self.position - 1) / 2;
        let stored = self.entry.size();
        if self.position < stored {
            // Mid-file: the low half of the split word is live data.
            drive.seek_words(&mut self.entry, word_pos)?;
            let mut word = [0u16; 1];
            drive.read_words(&mut self.entry, &mut word)?;
            drive.seek_words(&mut self.entry, word_pos)?;
            let merged = (hi as u16) << 8 | codec::low_byte(word[0]) as u16;
            drive.write_words(&mut self.entry, &[merged])?;
        } else {
            // Tail: pad the low half and account for the odd byte.
            drive.seek_words(&mut self.entry, word_pos)?;
            drive.write_words(&mut self.entry, &[(hi as u16) << 8])?;
            drive.set_size(&mut self.entry, self.position)?;
        }
        self.pending_write = None;
        self.pending_from_seek = false;
        Ok(())
    }

    /// Append-mode positioning: cursor past the last byte. An odd-sized
    /// file gets its final byte pulled back into the pending slot so the
    /// next write completes that word.
    pub(crate) fn position_at_end<D: WordDrive>(
        &mut self,
        drive: &mut D,
    ) -> Result<(), SdError> {
        let n = self.entry.size();
        if n % 2 == 0 {
            drive.seek_words(&mut self.entry, n / 2)?;
        } else {
            let word_pos = (n - 1) / 2;
            drive.seek_words(&mut self.entry, word_pos)?;
            let mut word = [0u16; 1];
            drive.read_words(&mut self.entry, &mut word)?;
            drive.seek_words(&mut self.entry, word_pos)?;
            drive.set_size(&mut self.entry, n - 1)?;
            self.pending_write = Some(codec::high_byte(word[0]));
            self.pending_from_seek = false;
        }
        self.position = n;
        Ok(())
    }

    /// Engine word cursor implied by the byte state.
    fn cursor_words(&self) -> u32 {
        if self.pending_write.is_some() || self.pending_from_seek {
            self.position / 2
        } else {
            (self.position + 1) / 2
        }
    }

    fn save_cursor_state(&self) -> CursorState {
        CursorState {
            position: self.position,
            pending_write: self.pending_write,
            pending_read: self.pending_read,
            pending_from_seek: self.pending_from_seek,
        }
    }

    fn restore_cursor_state<D: WordDrive>(&mut self, drive: &mut D, saved: CursorState) {
        self.position = saved.position;
        self.pending_write = saved.pending_write;
        self.pending_read = saved.pending_read;
        self.pending_from_seek = saved.pending_from_seek;
        let cursor = self.cursor_words();
        let _ = drive.seek_words(&mut self.entry, cursor);
    }
}

struct CursorState {
    position: u32,
    pending_write: Option<u8>,
    pending_read: Option<u8>,
    pending_from_seek: bool,
}
