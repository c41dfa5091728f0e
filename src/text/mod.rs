//! Text encodings, plus a decoder and an editable encoder that work through
//! any of them.
//!
//! Codepoints are `i32`. Negative values are misencoded bytes (`byte - 0x100`),
//! which lets renderers show them distinctly instead of failing the string.

mod encodings;

pub use encodings::{Iso88591, Utf16, Utf8};

use crate::{Error, Result};

/// Codec for one text encoding.
pub trait TextEncoding: Sync {
    fn name(&self) -> &'static str;

    /// Decode the first codepoint of `src`. Returns `None` only when `src` is empty.
    fn read(&self, src: &[u8]) -> Option<(i32, usize)>;

    /// Decode the last codepoint of `src`. Returns `None` only when `src` is empty.
    fn unread(&self, src: &[u8]) -> Option<(i32, usize)>;

    /// Encode `codepoint` into `dst`, returning the byte count, or `None` if
    /// this encoding cannot represent it.
    fn write(&self, codepoint: i32, dst: &mut [u8; 4]) -> Option<usize>;
}

pub static UTF8: Utf8 = Utf8;
pub static ISO88591: Iso88591 = Iso88591;
pub static UTF16LE: Utf16 = Utf16 { big_endian: false };
pub static UTF16BE: Utf16 = Utf16 { big_endian: true };

static REGISTRY: [&(dyn TextEncoding); 4] = [&UTF8, &ISO88591, &UTF16LE, &UTF16BE];

/// Registered encodings in id order.
pub fn encodings() -> &'static [&'static dyn TextEncoding] {
    &REGISTRY
}

/// Look up an encoding by id (its index in [`encodings`]).
pub fn encoding_by_id(id: usize) -> Option<&'static dyn TextEncoding> {
    REGISTRY.get(id).copied()
}

/// Look up an encoding by name. Case and punctuation are ignored, so
/// `"UTF-8"`, `"utf_8"` and `"utf8"` all match.
pub fn encoding_by_name(name: &str) -> Result<&'static dyn TextEncoding> {
    let norm: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    REGISTRY
        .iter()
        .copied()
        .find(|e| e.name() == norm)
        .ok_or_else(|| Error::UnknownEncoding(name.to_string()))
}

/// Cursor over encoded bytes.
pub struct TextDecoder<'a> {
    encoding: &'static dyn TextEncoding,
    src: &'a [u8],
    pos: usize,
}

impl<'a> TextDecoder<'a> {
    pub fn new(src: &'a [u8], encoding: &'static dyn TextEncoding) -> Self {
        Self { encoding, src, pos: 0 }
    }

    pub fn utf8(src: &'a [u8]) -> Self {
        Self::new(src, &UTF8)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    /// Next codepoint and its encoded length.
    pub fn read(&mut self) -> Option<(i32, usize)> {
        let rest = self.src.get(self.pos..)?;
        let (cp, len) = match self.encoding.read(rest)? {
            (_, 0) => (rest[0] as i32 - 0x100, 1),
            ok => ok,
        };
        self.pos += len;
        Some((cp, len))
    }

    /// Previous codepoint and its encoded length; moves the cursor back.
    pub fn unread(&mut self) -> Option<(i32, usize)> {
        if self.pos == 0 {
            return None;
        }
        let head = &self.src[..self.pos];
        let (cp, len) = match self.encoding.unread(head)? {
            (_, 0) => (head[head.len() - 1] as i32 - 0x100, 1),
            ok => ok,
        };
        self.pos -= len;
        Some((cp, len))
    }
}

impl Iterator for TextDecoder<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        self.read().map(|(cp, _)| cp)
    }
}

/// Growable encoded text buffer.
#[derive(Clone)]
pub struct TextEncoder {
    encoding: &'static dyn TextEncoding,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for TextEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEncoder")
            .field("encoding", &self.encoding.name())
            .field("bytes", &self.bytes)
            .finish()
    }
}

impl TextEncoder {
    pub fn new(encoding: &'static dyn TextEncoding) -> Self {
        Self { encoding, bytes: Vec::new() }
    }

    pub fn with_bytes(encoding: &'static dyn TextEncoding, bytes: Vec<u8>) -> Self {
        Self { encoding, bytes }
    }

    pub fn encoding(&self) -> &'static dyn TextEncoding {
        self.encoding
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Replace `len` bytes at `pos` with `src`, verbatim.
    pub fn replace_raw(&mut self, pos: usize, len: usize, src: &[u8]) -> Result<()> {
        let end = pos.checked_add(len).filter(|&end| end <= self.bytes.len());
        let Some(end) = end else {
            return Err(Error::IndexOutOfRange { index: pos.saturating_add(len), len: self.bytes.len() });
        };
        self.bytes.splice(pos..end, src.iter().copied());
        Ok(())
    }

    fn encode(&self, codepoint: i32) -> Result<([u8; 4], usize)> {
        let mut tmp = [0u8; 4];
        let n = self.encoding.write(codepoint, &mut tmp).ok_or(Error::Unencodable {
            codepoint,
            encoding: self.encoding.name(),
        })?;
        Ok((tmp, n))
    }

    /// Append one codepoint, returning its encoded length.
    pub fn append(&mut self, codepoint: i32) -> Result<usize> {
        let (tmp, n) = self.encode(codepoint)?;
        self.bytes.extend_from_slice(&tmp[..n]);
        Ok(n)
    }

    /// Insert one codepoint at `pos`, returning the position just after it.
    pub fn insert(&mut self, pos: usize, codepoint: i32) -> Result<usize> {
        let (tmp, n) = self.encode(codepoint)?;
        self.replace_raw(pos, 0, &tmp[..n])?;
        Ok(pos + n)
    }

    /// Delete the codepoint starting at `pos`. Returns `pos`.
    pub fn delete_forward(&mut self, pos: usize) -> Result<usize> {
        let len = self.next_len(pos);
        if len == 0 {
            return Err(Error::IndexOutOfRange { index: pos, len: self.bytes.len() });
        }
        self.replace_raw(pos, len, &[])?;
        Ok(pos)
    }

    /// Delete the codepoint ending at `pos`. Returns the new position.
    pub fn delete_backward(&mut self, pos: usize) -> Result<usize> {
        let len = self.prev_len(pos);
        if len == 0 {
            return Err(Error::IndexOutOfRange { index: pos, len: self.bytes.len() });
        }
        let start = pos - len;
        self.replace_raw(start, len, &[])?;
        Ok(start)
    }

    /// Encoded length of the codepoint starting at `pos`, 0 at the end.
    pub fn next_len(&self, pos: usize) -> usize {
        match self.bytes.get(pos..) {
            Some(rest) if !rest.is_empty() => self.encoding.read(rest).map_or(1, |(_, n)| n.max(1)),
            _ => 0,
        }
    }

    /// Encoded length of the codepoint ending at `pos`, 0 at the start.
    pub fn prev_len(&self, pos: usize) -> usize {
        if pos == 0 || pos > self.bytes.len() {
            return 0;
        }
        self.encoding.unread(&self.bytes[..pos]).map_or(1, |(_, n)| n.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_normalizes() {
        assert_eq!(encoding_by_name("UTF-8").unwrap().name(), "utf8");
        assert_eq!(encoding_by_name("ISO-8859-1").unwrap().name(), "iso88591");
        assert!(encoding_by_name("ebcdic").is_err());
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(encoding_by_id(0).map(|e| e.name()), Some("utf8"));
        assert_eq!(encoding_by_id(3).map(|e| e.name()), Some("utf16be"));
        assert!(encoding_by_id(4).is_none());
    }

    #[test]
    fn test_decoder_forward_and_back() {
        let src = "x\u{20ac}".as_bytes();
        let mut dec = TextDecoder::utf8(src);
        assert_eq!(dec.read(), Some((b'x' as i32, 1)));
        assert_eq!(dec.read(), Some((0x20ac, 3)));
        assert_eq!(dec.read(), None);
        assert_eq!(dec.unread(), Some((0x20ac, 3)));
        assert_eq!(dec.position(), 1);
    }

    #[test]
    fn test_decoder_reports_misencoded_bytes() {
        let cps: Vec<i32> = TextDecoder::utf8(&[b'a', 0xff, b'b']).collect();
        assert_eq!(cps, vec![b'a' as i32, 0xff - 0x100, b'b' as i32]);
    }

    #[test]
    fn test_encoder_insert_and_delete() {
        let mut enc = TextEncoder::new(&UTF8);
        enc.replace_raw(0, 0, b"ab").unwrap();
        let p = enc.insert(1, 0x20ac).unwrap();
        assert_eq!(p, 4);
        assert_eq!(enc.as_bytes(), "a\u{20ac}b".as_bytes());
        assert_eq!(enc.delete_backward(p).unwrap(), 1);
        assert_eq!(enc.as_bytes(), b"ab");
        assert_eq!(enc.delete_forward(0).unwrap(), 0);
        assert_eq!(enc.as_bytes(), b"b");
    }

    #[test]
    fn test_encoder_bounds() {
        let mut enc = TextEncoder::new(&UTF8);
        assert!(enc.delete_backward(0).is_err());
        assert!(enc.delete_forward(0).is_err());
        assert!(enc.replace_raw(1, 0, b"x").is_err());
        assert!(enc.append(-5).is_err());
    }
}
