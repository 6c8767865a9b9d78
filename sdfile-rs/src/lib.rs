//! Byte-granular file access over 16-bit word-addressable FAT storage.
//!
//! Some storage engines (DSP-class media controllers in particular)
//! address the medium in 16-bit words and know nothing about bytes. This
//! crate puts an Arduino-flavored file API on top of such an engine:
//! `Sd<D>` manages the volume (open/exists/mkdir/remove/rmdir over 8.3
//! paths), `File` adapts byte-granular read/write/seek onto the engine's
//! word operations, and `print`/`println` render text and numbers straight
//! into a file. The engine itself sits behind the [`WordDrive`] trait;
//! [`RamDisk`] is an in-memory implementation for host-side use.
//!
//! Failures degrade to sentinels at the public surface: an unusable
//! handle, `false`, or a zero count. Diagnostics go through the `log`
//! facade.

#![cfg_attr(not(test), no_std)]

mod codec;
mod dir_entry;
mod drive;
mod error;
mod file;
mod names;
mod numfmt;
mod ramdisk;
mod registry;
mod resolve;
mod search;
mod sd;

pub use dir_entry::DirEntry;
pub use drive::{DriveError, WordDrive};
pub use error::SdError;
pub use file::{Base, File, FileMode, FileWriter, Value};
pub use names::ShortName;
pub use ramdisk::RamDisk;
pub use sd::Sd;
