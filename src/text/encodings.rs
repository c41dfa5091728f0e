//! Built-in codecs.
//!
//! A byte that does not start a valid sequence decodes as `byte - 0x100`, so
//! misencoded input always yields a negative codepoint of length 1.

use super::TextEncoding;

fn misencoded(byte: u8) -> i32 {
    byte as i32 - 0x100
}

fn is_cont(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl TextEncoding for Utf8 {
    fn name(&self) -> &'static str {
        "utf8"
    }

    fn read(&self, src: &[u8]) -> Option<(i32, usize)> {
        let lead = *src.first()?;
        let (len, bits) = match lead {
            0x00..=0x7f => return Some((lead as i32, 1)),
            0x80..=0xbf => return Some((misencoded(lead), 1)),
            0xc0..=0xdf => (2, (lead & 0x1f) as i32),
            0xe0..=0xef => (3, (lead & 0x0f) as i32),
            0xf0..=0xf7 => (4, (lead & 0x07) as i32),
            _ => return Some((misencoded(lead), 1)),
        };
        if src.len() < len || !src[1..len].iter().all(|&b| is_cont(b)) {
            return Some((misencoded(lead), 1));
        }
        let cp = src[1..len]
            .iter()
            .fold(bits, |acc, &b| (acc << 6) | (b & 0x3f) as i32);
        Some((cp, len))
    }

    fn unread(&self, src: &[u8]) -> Option<(i32, usize)> {
        let last = *src.last()?;
        if last < 0x80 {
            return Some((last as i32, 1));
        }
        // Walk back over at most three continuation bytes to find the lead.
        let mut start = src.len() - 1;
        while start > 0 && src.len() - start < 4 && is_cont(src[start]) {
            start -= 1;
        }
        if let Some((cp, len)) = self.read(&src[start..]) {
            if cp >= 0 && start + len == src.len() {
                return Some((cp, len));
            }
        }
        Some((misencoded(last), 1))
    }

    fn write(&self, codepoint: i32, dst: &mut [u8; 4]) -> Option<usize> {
        let cp = u32::try_from(codepoint).ok()?;
        if cp < 0x80 {
            dst[0] = cp as u8;
            Some(1)
        } else if cp < 0x800 {
            dst[0] = 0xc0 | (cp >> 6) as u8;
            dst[1] = 0x80 | (cp & 0x3f) as u8;
            Some(2)
        } else if cp < 0x10000 {
            dst[0] = 0xe0 | (cp >> 12) as u8;
            dst[1] = 0x80 | ((cp >> 6) & 0x3f) as u8;
            dst[2] = 0x80 | (cp & 0x3f) as u8;
            Some(3)
        } else if cp < 0x200000 {
            // Anything above U+10FFFF is not Unicode, but the decoder accepts it too.
            dst[0] = 0xf0 | (cp >> 18) as u8;
            dst[1] = 0x80 | ((cp >> 12) & 0x3f) as u8;
            dst[2] = 0x80 | ((cp >> 6) & 0x3f) as u8;
            dst[3] = 0x80 | (cp & 0x3f) as u8;
            Some(4)
        } else {
            None
        }
    }
}

/// Latin-1: every byte is its own codepoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso88591;

impl TextEncoding for Iso88591 {
    fn name(&self) -> &'static str {
        "iso88591"
    }

    fn read(&self, src: &[u8]) -> Option<(i32, usize)> {
        src.first().map(|&b| (b as i32, 1))
    }

    fn unread(&self, src: &[u8]) -> Option<(i32, usize)> {
        src.last().map(|&b| (b as i32, 1))
    }

    fn write(&self, codepoint: i32, dst: &mut [u8; 4]) -> Option<usize> {
        dst[0] = u8::try_from(codepoint).ok()?;
        Some(1)
    }
}

/// UTF-16 in either byte order. Unpaired surrogates decode as themselves.
#[derive(Debug, Clone, Copy)]
pub struct Utf16 {
    pub big_endian: bool,
}

impl Utf16 {
    fn unit(&self, pair: &[u8]) -> i32 {
        if self.big_endian {
            ((pair[0] as i32) << 8) | pair[1] as i32
        } else {
            pair[0] as i32 | ((pair[1] as i32) << 8)
        }
    }

    fn put(&self, unit: u32, dst: &mut [u8]) {
        let bytes = if self.big_endian {
            (unit as u16).to_be_bytes()
        } else {
            (unit as u16).to_le_bytes()
        };
        dst[..2].copy_from_slice(&bytes);
    }
}

impl TextEncoding for Utf16 {
    fn name(&self) -> &'static str {
        if self.big_endian { "utf16be" } else { "utf16le" }
    }

    fn read(&self, src: &[u8]) -> Option<(i32, usize)> {
        match src.len() {
            0 => return None,
            1 => return Some((misencoded(src[0]), 1)),
            _ => {}
        }
        let hi = self.unit(&src[0..2]);
        if (0xd800..0xdc00).contains(&hi) && src.len() >= 4 {
            let lo = self.unit(&src[2..4]);
            if (0xdc00..0xe000).contains(&lo) {
                return Some((0x10000 + ((hi & 0x3ff) << 10) + (lo & 0x3ff), 4));
            }
        }
        Some((hi, 2))
    }

    fn unread(&self, src: &[u8]) -> Option<(i32, usize)> {
        let n = src.len();
        match n {
            0 => return None,
            1 => return Some((misencoded(src[0]), 1)),
            _ => {}
        }
        let lo = self.unit(&src[n - 2..]);
        if (0xdc00..0xe000).contains(&lo) && n >= 4 {
            let hi = self.unit(&src[n - 4..n - 2]);
            if (0xd800..0xdc00).contains(&hi) {
                return Some((0x10000 + ((hi & 0x3ff) << 10) + (lo & 0x3ff), 4));
            }
        }
        Some((lo, 2))
    }

    fn write(&self, codepoint: i32, dst: &mut [u8; 4]) -> Option<usize> {
        let cp = u32::try_from(codepoint).ok()?;
        if cp < 0x10000 {
            self.put(cp, &mut dst[0..2]);
            Some(2)
        } else if cp < 0x110000 {
            let v = cp - 0x10000;
            self.put(0xd800 | (v >> 10), &mut dst[0..2]);
            self.put(0xdc00 | (v & 0x3ff), &mut dst[2..4]);
            Some(4)
        } else {
            None
        }
    }
}
