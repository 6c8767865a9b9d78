//! Byte stream <-> 16-bit word packing.
//!
//! The medium stores big-endian byte pairs: the byte at even offset `2*i`
//! is the high half of word `i`, the byte at `2*i + 1` the low half.

/// Data moves through the engine in slabs of this many bytes.
pub(crate) const CHUNK_BYTES: usize = 512;
pub(crate) const CHUNK_WORDS: usize = CHUNK_BYTES / 2;

/// Pack an even number of bytes into words. Returns the word count.
pub(crate) fn pack_words(bytes: &[u8], words: &mut [u16]) -> usize {
    debug_assert!(bytes.len() % 2 == 0);
    let n = bytes.len() / 2;
    for (i, pair) in bytes.chunks_exact(2).enumerate() {
        words[i] = u16::from_be_bytes([pair[0], pair[1]]);
    }
    n
}

/// Unpack words back into bytes; `bytes` must hold `2 * words.len()`.
pub(crate) fn unpack_words(words: &[u16], bytes: &mut [u8]) {
    for (i, w) in words.iter().enumerate() {
        let [hi, lo] = w.to_be_bytes();
        bytes[2 * i] = hi;
        bytes[2 * i + 1] = lo;
    }
}

#[inline(always)]
pub(crate) fn high_byte(word: u16) -> u8 {
    (word >> 8) as u8
}

#[inline(always)]
pub(crate) fn low_byte(word: u16) -> u8 {
    (word & 0xff) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_byte_is_high_half() {
        let mut words = [0u16; 2];
        assert_eq!(pack_words(&[0x12, 0x34, 0xab, 0xcd], &mut words), 2);
        assert_eq!(words, [0x1234, 0xabcd]);
    }

    #[test]
    fn unpack_inverts_pack() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let mut words = [0u16; 3];
        pack_words(&bytes, &mut words);
        let mut back = [0u8; 6];
        unpack_words(&words, &mut back);
        assert_eq!(back, bytes);
    }

    #[test]
    fn halves() {
        assert_eq!(high_byte(0x12ab), 0x12);
        assert_eq!(low_byte(0x12ab), 0xab);
    }
}
