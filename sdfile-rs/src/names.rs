//! 8.3 name handling and path validation.

use crate::{
    dir_entry::DirEntry,
    error::SdError,
};

pub(crate) const MAX_PATH: usize = 255;

/// A validated 8.3 short name: up to eight name bytes, up to three
/// extension bytes, split on the last dot of the source component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShortName {
    name: [u8; 8],
    name_len: u8,
    ext: [u8; 3],
    ext_len: u8,
}

impl ShortName {
    /// Parse one path component. Rejects empty names, names over eight
    /// bytes, extensions over three, and components with more than one dot.
    pub fn parse(component: &str) -> Result<ShortName, SdError> {
        let bytes = component.as_bytes();
        let (base, ext) = match component.rfind('.') {
            Some(i) => (&bytes[..i], &bytes[i + 1..]),
            None => (bytes, &bytes[..0]),
        };
        if base.is_empty() || base.len() > 8 || ext.len() > 3 {
            return Err(SdError::InvalidPath);
        }
        if base.contains(&b'.') {
            return Err(SdError::InvalidPath);
        }
        let mut name = [0u8; 8];
        name[..base.len()].copy_from_slice(base);
        let mut ext_buf = [0u8; 3];
        ext_buf[..ext.len()].copy_from_slice(ext);
        Ok(ShortName {
            name,
            name_len: base.len() as u8,
            ext: ext_buf,
            ext_len: ext.len() as u8,
        })
    }

    pub fn base(&self) -> &[u8] {
        &self.name[..self.name_len as usize]
    }

    pub fn ext(&self) -> &[u8] {
        &self.ext[..self.ext_len as usize]
    }

    pub fn has_ext(&self) -> bool {
        self.ext_len > 0
    }

    /// Space-padded, uppercased fields as stored on the medium.
    pub(crate) fn padded(&self) -> ([u8; 8], [u8; 3]) {
        let mut name = [b' '; 8];
        for (dst, src) in name.iter_mut().zip(self.base()) {
            *dst = src.to_ascii_uppercase();
        }
        let mut ext = [b' '; 3];
        for (dst, src) in ext.iter_mut().zip(self.ext()) {
            *dst = src.to_ascii_uppercase();
        }
        (name, ext)
    }

    /// File match: name and extension, case-insensitive.
    pub(crate) fn matches_file(&self, entry: &DirEntry) -> bool {
        ascii_eq_ignore_case(self.base(), entry.base_name())
            && ascii_eq_ignore_case(self.ext(), entry.extension())
    }

    /// Directory match: name only; directories carry no extension here.
    pub(crate) fn matches_dir(&self, entry: &DirEntry) -> bool {
        ascii_eq_ignore_case(self.base(), entry.base_name())
    }
}

fn ascii_eq_ignore_case(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_ascii_uppercase() == y.to_ascii_uppercase())
}

/// Component after the final `/`, ignoring a trailing slash.
pub(crate) fn last_component(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// Cheap validity gate run before any traversal: length bound, root special
/// case, and the 8.3 bound on the trailing component.
pub(crate) fn check_path(path: &str) -> Result<(), SdError> {
    if path.is_empty() || path.len() > MAX_PATH {
        return Err(SdError::InvalidPath);
    }
    if path == "/" {
        return Ok(());
    }
    ShortName::parse(last_component(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_dot() {
        let n = ShortName::parse("DATA.TXT").unwrap();
        assert_eq!(n.base(), b"DATA");
        assert_eq!(n.ext(), b"TXT");
        assert!(n.has_ext());
    }

    #[test]
    fn extension_optional() {
        let n = ShortName::parse("LOGS").unwrap();
        assert_eq!(n.base(), b"LOGS");
        assert!(!n.has_ext());
    }

    #[test]
    fn bounds_enforced() {
        assert!(ShortName::parse("ABCDEFGH.TXT").is_ok());
        assert!(ShortName::parse("ABCDEFGHI.TXT").is_err());
        assert!(ShortName::parse("A.ABCD").is_err());
        assert!(ShortName::parse("").is_err());
        assert!(ShortName::parse(".TXT").is_err());
        assert!(ShortName::parse("A.B.C").is_err());
    }

    #[test]
    fn padding_uppercases() {
        let n = ShortName::parse("log.txt").unwrap();
        let (name, ext) = n.padded();
        assert_eq!(&name, b"LOG     ");
        assert_eq!(&ext, b"TXT");
    }

    #[test]
    fn last_component_variants() {
        assert_eq!(last_component("/A/B/C.TXT"), "C.TXT");
        assert_eq!(last_component("/DIR/"), "DIR");
        assert_eq!(last_component("NAME"), "NAME");
    }

    #[test]
    fn check_path_gate() {
        assert!(check_path("/").is_ok());
        assert!(check_path("/A/B.TXT").is_ok());
        assert!(check_path("").is_err());
        assert!(check_path("/A/TOOLONGNAME.TXT").is_err());
        let long: heapless::String<300> =
            core::iter::repeat('A').take(260).collect();
        assert!(check_path(long.as_str()).is_err());
    }
}
