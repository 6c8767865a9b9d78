use crate::drive::DriveError;

/// Errors surfaced by the file layer.
///
/// Nothing here crosses the public API as a `Result`: `Sd` and `File`
/// degrade every failure to a sentinel (an unusable handle, `false`, or a
/// zero count) so call sites can be written uniformly whether the card is
/// present or not. The typed values exist for the internal helpers and for
/// diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdError {
    /// Path is empty, longer than 255 characters, or its leaf breaks 8.3.
    InvalidPath,
    /// A directory in the middle of the path does not exist.
    IntermediateDirNotFound,
    /// The leaf was not found in its parent directory.
    NotFound,
    /// The target is already tracked by the open-file registry.
    AlreadyOpen,
    /// The open-file registry is out of slots.
    TooManyOpen,
    /// Read or seek past the end of the file.
    EndOfFile,
    /// The handle is closed, or the volume was never brought up.
    NotOpen,
    /// Write attempted on a handle opened for reading.
    NotWritable,
    /// Data operation attempted on a directory handle.
    IsDirectory,
    /// Directory operation attempted on a file handle.
    NotADirectory,
    /// Opaque failure from the storage engine or the card below it.
    Drive(DriveError),
}

impl From<DriveError> for SdError {
    fn from(e: DriveError) -> SdError {
        match e {
            DriveError::NotFound => SdError::NotFound,
            DriveError::Eof => SdError::EndOfFile,
            other => SdError::Drive(other),
        }
    }
}
