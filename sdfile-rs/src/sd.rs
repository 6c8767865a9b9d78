//! `Sd<D>`: the volume manager.
//!
//! Owns the storage engine behind a `RefCell` so many `File` handles can
//! share it through a plain `&Sd<D>`; each operation borrows the engine
//! for its own duration. Single-context use only, like the rest of the
//! crate.

use core::cell::{RefCell, RefMut};

use crate::{
    dir_entry::{DirEntry, DisplayName},
    drive::WordDrive,
    error::SdError,
    file::{File, FileMode},
    names::{self, ShortName},
    registry::OpenFiles,
    resolve::{resolve, Resolved},
    search::{find_entry, EntryKind},
};

/// Start token the root directory registers under.
const ROOT_TOKEN: u32 = 0;

pub struct Sd<D: WordDrive> {
    drive: RefCell<D>,
    registry: RefCell<OpenFiles>,
    first_file: Option<DirEntry>,
}

impl<D: WordDrive> Sd<D> {
    pub fn new(drive: D) -> Sd<D> {
        Sd {
            drive: RefCell::new(drive),
            registry: RefCell::new(OpenFiles::new()),
            first_file: None,
        }
    }

    /// Bring the volume up. Every later traversal starts from the root
    /// cursor captured here. Returns false (and logs) when the medium is
    /// absent or unreadable; the other methods then fail cleanly.
    pub fn begin(&mut self) -> bool {
        match self.drive.get_mut().init() {
            Ok(entry) => {
                self.first_file = Some(entry);
                log::debug!("volume ready");
                true
            }
            Err(e) => {
                log::warn!("volume init failed: {:?}", e);
                false
            }
        }
    }

    /// Whether `path` names an existing file or directory.
    pub fn exists(&self, path: &str) -> bool {
        self.try_exists(path).unwrap_or(false)
    }

    /// Open `path`. On any failure the returned handle reports
    /// `is_open() == false` and every operation on it is a no-op.
    pub fn open(&self, path: &str, mode: FileMode) -> File {
        match self.try_open(path, mode) {
            Ok(f) => f,
            Err(e) => {
                log::debug!("open {:?} failed: {:?}", path, e);
                File::closed()
            }
        }
    }

    /// Create a directory, including any missing intermediates. True when
    /// the whole chain exists afterwards.
    pub fn mkdir(&self, path: &str) -> bool {
        match self.try_mkdir(path) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("mkdir {:?} failed: {:?}", path, e);
                false
            }
        }
    }

    /// Delete a file. Refuses directories and anything currently open.
    pub fn remove(&self, path: &str) -> bool {
        match self.try_remove(path, EntryKind::File) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("remove {:?} failed: {:?}", path, e);
                false
            }
        }
    }

    /// Delete an empty directory. Refuses files and anything currently
    /// open.
    pub fn rmdir(&self, path: &str) -> bool {
        match self.try_remove(path, EntryKind::Directory) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("rmdir {:?} failed: {:?}", path, e);
                false
            }
        }
    }

    pub(crate) fn drive_mut(&self) -> RefMut<'_, D> {
        self.drive.borrow_mut()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, OpenFiles> {
        self.registry.borrow_mut()
    }

    fn root(&self) -> Result<DirEntry, SdError> {
        self.first_file.ok_or(SdError::NotOpen)
    }

    fn try_exists(&self, path: &str) -> Result<bool, SdError> {
        names::check_path(path)?;
        if path == "/" {
            return Ok(true);
        }
        let root = self.root()?;
        let mut drive = self.drive_mut();
        let resolved = resolve(&mut *drive, root, path)?;
        let name = ShortName::parse(resolved.leaf)?;
        if resolved.leaf.contains('.') {
            Ok(find_entry(&mut *drive, &resolved.parent, &name, EntryKind::File).is_ok())
        } else {
            Ok(
                find_entry(&mut *drive, &resolved.parent, &name, EntryKind::Directory).is_ok()
                    || find_entry(&mut *drive, &resolved.parent, &name, EntryKind::File).is_ok(),
            )
        }
    }

    fn try_open(&self, path: &str, mode: FileMode) -> Result<File, SdError> {
        names::check_path(path)?;
        let root = self.root()?;
        let mut drive = self.drive_mut();

        if path == "/" {
            if mode != FileMode::Read {
                return Err(SdError::IsDirectory);
            }
            let mut entry = root;
            let has_children =
                File::position_at_first_child(&mut *drive, &mut entry).map_err(SdError::from)?;
            self.registry_mut().register(ROOT_TOKEN)?;
            let mut name = DisplayName::new();
            let _ = name.push('/');
            let mut file = File::opened(entry, FileMode::Read, true, name, ROOT_TOKEN);
            file.at_end = !has_children;
            return Ok(file);
        }

        let resolved = resolve(&mut *drive, root, path)?;
        match mode {
            FileMode::Read => self.open_read(&mut *drive, resolved),
            FileMode::Write | FileMode::Append => self.open_write(&mut *drive, resolved, mode),
        }
    }

    fn open_read(&self, drive: &mut D, resolved: Resolved<'_>) -> Result<File, SdError> {
        let name = ShortName::parse(resolved.leaf)?;
        // A leaf with a dot can only be a file; a dot-less leaf is tried
        // as a directory first, then as an extension-less file.
        let found = if resolved.leaf.contains('.') {
            find_entry(drive, &resolved.parent, &name, EntryKind::File)?
        } else {
            match find_entry(drive, &resolved.parent, &name, EntryKind::Directory) {
                Ok(e) => e,
                Err(SdError::NotFound) => {
                    find_entry(drive, &resolved.parent, &name, EntryKind::File)?
                }
                Err(e) => return Err(e),
            }
        };
        let display = found.display_name();
        let start = found.start_cluster();
        if found.is_directory() {
            let mut entry = found;
            drive.change_dir(&mut entry)?;
            let has_children = File::position_at_first_child(drive, &mut entry)?;
            self.registry_mut().register(start)?;
            let mut file = File::opened(entry, FileMode::Read, true, display, start);
            file.at_end = !has_children;
            Ok(file)
        } else {
            let mut entry = found;
            drive.seek_words(&mut entry, 0)?;
            self.registry_mut().register(start)?;
            Ok(File::opened(entry, FileMode::Read, false, display, start))
        }
    }

    fn open_write(
        &self,
        drive: &mut D,
        resolved: Resolved<'_>,
        mode: FileMode,
    ) -> Result<File, SdError> {
        let name = ShortName::parse(resolved.leaf)?;
        // Never shadow an existing directory with a file.
        if !resolved.leaf.contains('.')
            && find_entry(drive, &resolved.parent, &name, EntryKind::Directory).is_ok()
        {
            return Err(SdError::IsDirectory);
        }
        match find_entry(drive, &resolved.parent, &name, EntryKind::File) {
            Ok(found) => {
                let display = found.display_name();
                let start = found.start_cluster();
                self.registry_mut().register(start)?;
                let mut file = File::opened(found, mode, false, display, start);
                let positioned = match mode {
                    FileMode::Write => drive
                        .set_size(&mut file.entry, 0)
                        .and_then(|_| drive.seek_words(&mut file.entry, 0))
                        .map_err(SdError::from),
                    _ => file.position_at_end(drive),
                };
                if let Err(e) = positioned {
                    self.registry_mut().unregister(start);
                    return Err(e);
                }
                Ok(file)
            }
            Err(SdError::NotFound) => {
                let mut entry = resolved.parent;
                drive.create_file(&mut entry, &name)?;
                let start = entry.start_cluster();
                if let Err(e) = self.registry_mut().register(start) {
                    let _ = drive.remove(&mut entry);
                    return Err(e);
                }
                Ok(File::opened(entry, mode, false, entry.display_name(), start))
            }
            Err(e) => Err(e),
        }
    }

    fn try_mkdir(&self, path: &str) -> Result<(), SdError> {
        names::check_path(path)?;
        if path == "/" {
            return Ok(());
        }
        let root = self.root()?;
        let mut drive = self.drive_mut();
        let mut parent = root;
        for component in path.trim_end_matches('/').split('/').filter(|c| !c.is_empty()) {
            let name = ShortName::parse(component)?;
            if name.has_ext() {
                return Err(SdError::InvalidPath);
            }
            let mut dir =
                match find_entry(&mut *drive, &parent, &name, EntryKind::Directory) {
                    Ok(e) => e,
                    Err(SdError::NotFound) => {
                        let mut entry = parent;
                        drive.create_dir(&mut entry, &name)?;
                        entry
                    }
                    Err(e) => return Err(e),
                };
            drive.change_dir(&mut dir)?;
            parent = dir;
        }
        Ok(())
    }

    fn try_remove(&self, path: &str, kind: EntryKind) -> Result<(), SdError> {
        names::check_path(path)?;
        if path == "/" {
            return Err(SdError::InvalidPath);
        }
        let root = self.root()?;
        let mut drive = self.drive_mut();
        let resolved = resolve(&mut *drive, root, path)?;
        let name = ShortName::parse(resolved.leaf)?;
        let mut found = find_entry(&mut *drive, &resolved.parent, &name, kind)?;
        if self.registry.borrow().is_registered(found.start_cluster()) {
            return Err(SdError::AlreadyOpen);
        }
        drive.remove(&mut found)?;
        Ok(())
    }
}
