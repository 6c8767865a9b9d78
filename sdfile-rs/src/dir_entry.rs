pub(crate) const ATTR_DIRECTORY: u8 = 0x10;
pub(crate) const ATTR_ARCHIVE: u8 = 0x20;

/// Longest display name: 8 + '.' + 3 (or trailing '/') and change.
pub(crate) type DisplayName = heapless::String<16>;

/// Value-type handle on one 8.3 directory entry, doubling as the engine's
/// cursor. The name and extension are space-padded as stored on the medium;
/// the last four fields belong to the engine and mean nothing up here.
#[derive(Clone, Copy, Debug)]
pub struct DirEntry {
    pub(crate) name: [u8; 8],
    pub(crate) ext: [u8; 3],
    pub(crate) attributes: u8,
    pub(crate) size: u32,
    pub(crate) start_cluster: u32,
    pub(crate) dir: u16,
    pub(crate) node: u16,
    pub(crate) scan_pos: u16,
    pub(crate) word_pos: u32,
}

impl DirEntry {
    pub(crate) const fn empty() -> DirEntry {
        DirEntry {
            name: [b' '; 8],
            ext: [b' '; 3],
            attributes: 0,
            size: 0,
            start_cluster: 0,
            dir: 0,
            node: 0,
            scan_pos: 0,
            word_pos: 0,
        }
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        self.attributes & ATTR_DIRECTORY > 0
    }

    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline(always)]
    pub fn start_cluster(&self) -> u32 {
        self.start_cluster
    }

    /// Name with the padding stripped.
    pub fn base_name(&self) -> &[u8] {
        trim_padding(&self.name)
    }

    /// Extension with the padding stripped; empty for directories and
    /// extension-less files.
    pub fn extension(&self) -> &[u8] {
        trim_padding(&self.ext)
    }

    pub(crate) fn is_dot_entry(&self) -> bool {
        self.name[0] == b'.'
    }

    /// `NAME.EXT` for files, `NAME/` for directories.
    pub(crate) fn display_name(&self) -> DisplayName {
        let mut out = DisplayName::new();
        for &b in self.base_name() {
            let _ = out.push(b as char);
        }
        if self.is_directory() {
            let _ = out.push('/');
        } else if !self.extension().is_empty() {
            let _ = out.push('.');
            for &b in self.extension() {
                let _ = out.push(b as char);
            }
        }
        out
    }
}

fn trim_padding(field: &[u8]) -> &[u8] {
    let mut end = field.len();
    while end > 0 && field[end - 1] == b' ' {
        end -= 1;
    }
    &field[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &[u8; 8], ext: &[u8; 3], attributes: u8) -> DirEntry {
        let mut e = DirEntry::empty();
        e.name = *name;
        e.ext = *ext;
        e.attributes = attributes;
        e
    }

    #[test]
    fn display_name_for_file() {
        let e = entry(b"DATA    ", b"TXT", ATTR_ARCHIVE);
        assert_eq!(e.display_name().as_str(), "DATA.TXT");
    }

    #[test]
    fn display_name_without_extension() {
        let e = entry(b"README  ", b"   ", ATTR_ARCHIVE);
        assert_eq!(e.display_name().as_str(), "README");
    }

    #[test]
    fn display_name_for_directory() {
        let e = entry(b"LOGS    ", b"   ", ATTR_DIRECTORY);
        assert_eq!(e.display_name().as_str(), "LOGS/");
    }

    #[test]
    fn dot_entries_detected() {
        assert!(entry(b".       ", b"   ", ATTR_DIRECTORY).is_dot_entry());
        assert!(entry(b"..      ", b"   ", ATTR_DIRECTORY).is_dot_entry());
        assert!(!entry(b"A       ", b"   ", ATTR_DIRECTORY).is_dot_entry());
    }
}
