//! Canonical binary encoding shared by every condition and fulfillment type.
//!
//! Two primitives make up the whole format:
//!
//! - `varuint`: values below `0x80` take a single byte. Larger values are
//!   written as `0x80 | k` followed by the minimal `k`-byte big-endian
//!   representation.
//! - `varbytes`: a `varuint` length followed by the raw bytes.
//!
//! **CRITICAL**: condition hashes are computed over these bytes. Changing the
//! layout changes every condition ever published.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::cmp::Ordering;

use crate::error::{ConditionError, Result};

/// High bit marking the long form of a varuint.
const LONG_FORM: u8 = 0x80;

/// Deepest nesting of composite fulfillments a [`Reader`] accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Number of bytes `varuint(value)` occupies.
pub fn varuint_len(value: u64) -> usize {
    if value < LONG_FORM as u64 {
        1
    } else {
        1 + be_len(value)
    }
}

/// Number of bytes `varbytes` of a buffer with this length occupies.
pub fn varbytes_len(len: usize) -> usize {
    varuint_len(len as u64) + len
}

fn be_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

/// Append-only encoder over a byte vector.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a varuint.
    pub fn write_var_uint(&mut self, value: u64) {
        if value < LONG_FORM as u64 {
            self.buf.push(value as u8);
            return;
        }
        let len = be_len(value);
        self.buf.push(LONG_FORM | len as u8);
        self.buf.extend_from_slice(&value.to_be_bytes()[8 - len..]);
    }

    /// Write a length-prefixed byte string.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_var_uint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// Write raw bytes without framing.
    pub fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor-based decoder over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
        }
    }

    /// Enter one level of a composite fulfillment.
    ///
    /// Parsing recurses once per level, so input nested deeper than
    /// [`MAX_NESTING_DEPTH`] is rejected before it can exhaust the stack.
    pub fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ConditionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave a level entered with [`Reader::descend`].
    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take exactly `n` raw bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(ConditionError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    /// Read a varuint, rejecting non-minimal encodings.
    pub fn read_var_uint(&mut self) -> Result<u64> {
        let first = self.read_u8()?;
        if first & LONG_FORM == 0 {
            return Ok(first as u64);
        }

        let len = (first & !LONG_FORM) as usize;
        if len == 0 || len > 8 {
            return Err(ConditionError::NonCanonical(format!(
                "varuint length of length {len}"
            )));
        }
        let bytes = self.read(len)?;
        if bytes[0] == 0 {
            return Err(ConditionError::NonCanonical(
                "varuint with leading zero byte".into(),
            ));
        }
        let value = bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        if value < LONG_FORM as u64 {
            return Err(ConditionError::NonCanonical(format!(
                "varuint {value} in long form"
            )));
        }
        Ok(value)
    }

    /// Read a length-prefixed byte string.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_var_uint()?;
        let len = usize::try_from(len).map_err(|_| ConditionError::UnexpectedEof {
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.read(len)
    }

    /// Fail unless the whole input was consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ConditionError::TrailingBytes(n)),
        }
    }
}

/// Parse an unsigned URI field written in canonical form: lowercase digits
/// of `radix` (10 or 16), no sign and no leading zeros.
pub fn parse_uri_number(field: &str, text: &str, radix: u32) -> Result<u64> {
    let canonical = !text.is_empty()
        && !(text.len() > 1 && text.starts_with('0'))
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || (radix == 16 && matches!(c, 'a'..='f')));
    if !canonical {
        return Err(ConditionError::InvalidUri(format!(
            "{field} '{text}' is not in canonical form"
        )));
    }
    u64::from_str_radix(text, radix)
        .map_err(|e| ConditionError::InvalidUri(format!("{field} '{text}': {e}")))
}

/// Canonical ordering of encoded entries: descending byte order.
///
/// Used for the threshold hash preimage, for both entry lists of a threshold
/// payload and as the selection tie-break, so the same multiset of children
/// always encodes identically.
pub fn canonical_cmp(a: &[u8], b: &[u8]) -> Ordering {
    b.cmp(a)
}

/// Sort encoded entries into canonical order.
pub fn sort_canonical<T: AsRef<[u8]>>(entries: &mut [T]) {
    entries.sort_by(|a, b| canonical_cmp(a.as_ref(), b.as_ref()));
}

/// Encode bytes as base64url without padding.
pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url, tolerating trailing padding.
pub fn base64url_decode(text: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .map_err(|e| ConditionError::Decoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_numbers_must_be_canonical() {
        assert_eq!(parse_uri_number("length", "230", 10).unwrap(), 230);
        assert_eq!(parse_uri_number("length", "0", 10).unwrap(), 0);
        assert_eq!(parse_uri_number("bitmask", "c", 16).unwrap(), 12);
        for text in ["", "+230", "0230", "-1", " 1", "C", "1.5"] {
            assert!(parse_uri_number("field", text, 16).is_err(), "{text:?}");
        }
        assert!(parse_uri_number("length", "c", 10).is_err());
        assert!(parse_uri_number("length", "18446744073709551616", 10).is_err());
    }

    #[test]
    fn test_reader_bounds_nesting() {
        let mut reader = Reader::new(&[]);
        for _ in 0..MAX_NESTING_DEPTH {
            reader.descend().unwrap();
        }
        assert_eq!(
            reader.descend(),
            Err(ConditionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            })
        );
        reader.ascend();
        assert!(reader.descend().is_ok());
    }

    fn encode(value: u64) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_var_uint(value);
        w.into_bytes()
    }

    #[test]
    fn test_var_uint_encoding() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(32), vec![0x20]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x81, 0x80]);
        assert_eq!(encode(230), vec![0x81, 0xe6]);
        assert_eq!(encode(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode(u64::MAX), {
            let mut v = vec![0x88];
            v.extend_from_slice(&[0xff; 8]);
            v
        });
    }

    #[test]
    fn test_var_uint_len_matches_writer() {
        for value in [0, 1, 127, 128, 255, 256, 65_535, 65_536, u32::MAX as u64, u64::MAX] {
            assert_eq!(varuint_len(value), encode(value).len(), "value {value}");
        }
    }

    #[test]
    fn test_var_uint_decode() {
        for value in [0, 5, 127, 128, 300, 1 << 40] {
            let bytes = encode(value);
            let mut r = Reader::new(&bytes);
            assert_eq!(r.read_var_uint().unwrap(), value);
            r.finish().unwrap();
        }
    }

    #[test]
    fn test_var_uint_rejects_non_canonical() {
        // 5 written in long form
        let mut r = Reader::new(&[0x81, 0x05]);
        assert!(matches!(
            r.read_var_uint(),
            Err(ConditionError::NonCanonical(_))
        ));

        // leading zero byte
        let mut r = Reader::new(&[0x82, 0x00, 0xff]);
        assert!(matches!(
            r.read_var_uint(),
            Err(ConditionError::NonCanonical(_))
        ));

        // length of length out of range
        let mut r = Reader::new(&[0x80]);
        assert!(r.read_var_uint().is_err());
        let mut r = Reader::new(&[0x89, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(r.read_var_uint().is_err());
    }

    #[test]
    fn test_var_bytes_truncated() {
        let mut r = Reader::new(&[0x05, 0x01, 0x02]);
        assert_eq!(
            r.read_var_bytes(),
            Err(ConditionError::UnexpectedEof {
                needed: 5,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_finish_reports_trailing() {
        let mut r = Reader::new(&[0x01, 0xaa, 0xbb]);
        assert_eq!(r.read_var_bytes().unwrap(), &[0xaa]);
        assert_eq!(r.finish(), Err(ConditionError::TrailingBytes(1)));
    }

    #[test]
    fn test_canonical_order_is_descending() {
        let mut entries = vec![vec![0x08, 0x20, 0xa9], vec![0x08, 0x20, 0xfd], vec![0x01]];
        sort_canonical(&mut entries);
        assert_eq!(
            entries,
            vec![vec![0x08, 0x20, 0xfd], vec![0x08, 0x20, 0xa9], vec![0x01]]
        );
    }

    proptest::proptest! {
        #[test]
        fn prop_var_uint_decodes_what_it_encodes(value: u64) {
            let bytes = encode(value);
            proptest::prop_assert_eq!(bytes.len(), varuint_len(value));
            let mut r = Reader::new(&bytes);
            proptest::prop_assert_eq!(r.read_var_uint().unwrap(), value);
            proptest::prop_assert!(r.is_empty());
        }
    }

    #[test]
    fn test_base64url() {
        assert_eq!(base64url_encode(&[0xfb, 0xff]), "-_8");
        assert_eq!(base64url_decode("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(base64url_decode("-_8=").unwrap(), vec![0xfb, 0xff]);
        assert!(base64url_decode("+/8").is_err());
    }
}
