//! Byte-stream form of FIFO words.
//!
//! Each word travels as 8 bytes, most significant byte first, so bit 0 of a
//! word is the top bit of its first byte.

use bytes::{Buf, BufMut, BytesMut};

/// Bytes per word on a byte stream.
pub const WORD_SIZE: usize = 8;

/// Append `words` to `dst`.
pub fn encode_words(words: &[u64], dst: &mut BytesMut) {
    dst.reserve(words.len() * WORD_SIZE);
    for word in words {
        dst.put_u64(*word);
    }
}

/// Take exactly `count` words from `src`.
///
/// Returns `None`, consuming nothing, if fewer than `count` complete words are
/// buffered.
pub fn decode_words(src: &mut BytesMut, count: usize) -> Option<Vec<u64>> {
    let needed = count.checked_mul(WORD_SIZE)?;
    if src.len() < needed {
        return None;
    }
    let mut words = Vec::with_capacity(count);
    for _ in 0..count {
        words.push(src.get_u64());
    }
    Some(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_big_endian() {
        let mut buf = BytesMut::new();
        encode_words(&[0x0102_0304_0506_0708], &mut buf);
        assert_eq!(&buf[..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn decode_waits_for_complete_words() {
        let mut buf = BytesMut::new();
        encode_words(&[1, 2], &mut buf);
        buf.truncate(12);

        assert_eq!(decode_words(&mut buf, 2), None);
        assert_eq!(buf.len(), 12);
        assert_eq!(decode_words(&mut buf, 1), Some(vec![1]));
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn decode_zero_words() {
        let mut buf = BytesMut::new();
        assert_eq!(decode_words(&mut buf, 0), Some(vec![]));
    }
}
