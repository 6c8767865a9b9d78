//! Registry of open files, keyed by start cluster.
//!
//! One open handle per object at a time; the root directory registers
//! under the reserved token 0.

use heapless::Vec;

use crate::error::SdError;

pub(crate) const MAX_OPEN_FILES: usize = 8;

pub(crate) struct OpenFiles {
    slots: Vec<u32, MAX_OPEN_FILES>,
}

impl OpenFiles {
    pub(crate) const fn new() -> OpenFiles {
        OpenFiles { slots: Vec::new() }
    }

    pub(crate) fn register(&mut self, start_cluster: u32) -> Result<(), SdError> {
        if self.is_registered(start_cluster) {
            return Err(SdError::AlreadyOpen);
        }
        self.slots
            .push(start_cluster)
            .map_err(|_| SdError::TooManyOpen)
    }

    pub(crate) fn unregister(&mut self, start_cluster: u32) {
        if let Some(i) = self.slots.iter().position(|&s| s == start_cluster) {
            self.slots.swap_remove(i);
        }
    }

    pub(crate) fn is_registered(&self, start_cluster: u32) -> bool {
        self.slots.iter().any(|&s| s == start_cluster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_register_rejected() {
        let mut reg = OpenFiles::new();
        assert_eq!(reg.register(5), Ok(()));
        assert_eq!(reg.register(5), Err(SdError::AlreadyOpen));
        reg.unregister(5);
        assert_eq!(reg.register(5), Ok(()));
    }

    #[test]
    fn unregister_missing_is_harmless() {
        let mut reg = OpenFiles::new();
        reg.unregister(9);
        assert!(!reg.is_registered(9));
    }

    #[test]
    fn capacity_bounded() {
        let mut reg = OpenFiles::new();
        for i in 0..MAX_OPEN_FILES as u32 {
            assert_eq!(reg.register(i), Ok(()));
        }
        assert_eq!(reg.register(99), Err(SdError::TooManyOpen));
        reg.unregister(0);
        assert_eq!(reg.register(99), Ok(()));
    }
}
