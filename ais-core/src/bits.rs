//! Immutable bit sequences and the field codec used by every decoder.
//!
//! All ranges are MSB-first, `begin..end` in bit positions from the start of
//! the view. Reads past the end of the view yield zero bits: several layouts
//! declare trailing fields that some encoders omit entirely.

use std::fmt;
use std::ops::Range;

use serde::{Serialize, Serializer};

/// AIS six-bit text alphabet. Index 0 (`@`) is the pad symbol.
pub const TEXT_CHARSET: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";

/// Fixed-length, immutable sequence of bits.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitView {
    bytes: Vec<u8>,
    len: usize,
}

impl BitView {
    /// Wrap packed MSB-first bytes. `len` is clamped to the bits available.
    pub fn from_bytes(bytes: Vec<u8>, len: usize) -> Self {
        let len = len.min(bytes.len() * 8);
        BitView { bytes, len }
    }

    /// Pack a sequence of 6-bit symbols, then drop `trailing` bits off the end.
    pub fn from_sixbit(values: &[u8], trailing: usize) -> Self {
        let total = values.len() * 6;
        let mut bytes = vec![0u8; total.div_ceil(8)];
        for (i, &v) in values.iter().enumerate() {
            for b in 0..6 {
                if (v >> (5 - b)) & 1 == 1 {
                    let pos = i * 6 + b;
                    bytes[pos / 8] |= 1 << (7 - pos % 8);
                }
            }
        }
        BitView::from_bytes(bytes, total.saturating_sub(trailing))
    }

    /// Parse a string of `0`/`1` characters.
    pub fn from_bit_str(s: &str) -> Option<Self> {
        let mut bytes = vec![0u8; s.len().div_ceil(8)];
        for (pos, c) in s.chars().enumerate() {
            match c {
                '0' => {}
                '1' => bytes[pos / 8] |= 1 << (7 - pos % 8),
                _ => return None,
            }
        }
        Some(BitView::from_bytes(bytes, s.len()))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Single bit at `pos`, zero past the end.
    pub fn bit(&self, pos: usize) -> u8 {
        if pos >= self.len {
            return 0;
        }
        (self.bytes[pos / 8] >> (7 - pos % 8)) & 1
    }

    /// Copy out `begin..end`. Missing suffix bits read as zero, so the result
    /// always has length `end - begin`.
    pub fn bits(&self, begin: usize, end: usize) -> BitView {
        let width = end.saturating_sub(begin);
        let mut bytes = vec![0u8; width.div_ceil(8)];
        for i in 0..width {
            if self.bit(begin + i) == 1 {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        BitView::from_bytes(bytes, width)
    }

    /// Everything from `begin` to the end of the view.
    pub fn tail(&self, begin: usize) -> BitView {
        self.bits(begin, self.len.max(begin))
    }

    // -----------------------------------------------------------------------
    // Typed extraction
    // -----------------------------------------------------------------------

    /// Unsigned binary value of `range` (at most 64 bits wide).
    pub fn unsigned(&self, range: Range<usize>) -> u64 {
        debug_assert!(range.len() <= 64, "field wider than 64 bits");
        range.fold(0u64, |acc, pos| (acc << 1) | self.bit(pos) as u64)
    }

    /// Two's-complement value of `range`: raw - 2^width when the MSB is set.
    pub fn signed(&self, range: Range<usize>) -> i64 {
        let width = range.len();
        if width == 0 {
            return 0;
        }
        let msb = self.bit(range.start);
        let raw = self.unsigned(range) as i128;
        if msb == 1 {
            (raw - (1i128 << width)) as i64
        } else {
            raw as i64
        }
    }

    /// Single-bit boolean.
    pub fn flag(&self, pos: usize) -> bool {
        self.bit(pos) == 1
    }

    /// Signed value divided by `divisor`.
    pub fn scaled(&self, range: Range<usize>, divisor: f64) -> f64 {
        self.signed(range) as f64 / divisor
    }

    /// Unsigned value divided by `divisor`.
    pub fn scaled_unsigned(&self, range: Range<usize>, divisor: f64) -> f64 {
        self.unsigned(range) as f64 / divisor
    }

    /// Six-bit text. Pad symbols become spaces, then both ends are trimmed.
    /// A partial trailing group (fewer than 6 bits) is ignored.
    pub fn text(&self, range: Range<usize>) -> String {
        let chars = range.len() / 6;
        let mut s = String::with_capacity(chars);
        for i in 0..chars {
            let start = range.start + i * 6;
            let idx = self.unsigned(start..start + 6) as usize;
            match TEXT_CHARSET[idx] {
                b'@' => s.push(' '),
                c => s.push(c as char),
            }
        }
        s.trim().to_string()
    }

    /// Six-bit text from `begin` through the last whole character of the view.
    pub fn text_to_end(&self, begin: usize) -> String {
        let chars = self.len.saturating_sub(begin) / 6;
        self.text(begin..begin + chars * 6)
    }

    /// Raw bit pattern of `range`, for spare and reserved fields.
    pub fn raw(&self, range: Range<usize>) -> BitView {
        self.bits(range.start, range.end)
    }
}

impl fmt::Display for BitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in 0..self.len {
            f.write_str(if self.bit(pos) == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitView({}b: {})", self.len, self)
    }
}

impl Serialize for BitView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn view(s: &str) -> BitView {
        BitView::from_bit_str(s).unwrap()
    }

    #[test]
    fn test_zero_padding_past_end() {
        let v = view("101");
        let padded = v.bits(0, 10);
        assert_eq!(padded.len(), 10);
        assert_eq!(padded.to_string(), "1010000000");
    }

    #[test]
    fn test_bits_idempotent() {
        let v = view("110010111");
        let first = v.bits(2, 7);
        let second = v.bits(2, 7);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "00101");
        assert_eq!(v.to_string(), "110010111");
    }

    #[test]
    fn test_unsigned() {
        let v = view("000110101");
        assert_eq!(v.unsigned(0..6), 6);
        assert_eq!(v.unsigned(3..9), 0b110101);
        assert_eq!(v.unsigned(0..0), 0);
        // Past the end reads zeros.
        assert_eq!(v.unsigned(7..11), 0b0100);
    }

    #[test]
    fn test_signed_twos_complement() {
        assert_eq!(view("11111111").signed(0..8), -1);
        assert_eq!(view("10000000").signed(0..8), -128);
        assert_eq!(view("01111111").signed(0..8), 127);
        assert_eq!(view("1").signed(0..1), -1);
    }

    #[test]
    fn test_scaled() {
        // -600000 in 28-bit two's complement.
        let raw = (1u32 << 28) - 600_000;
        let s = format!("{raw:028b}");
        assert_eq!(view(&s).scaled(0..28, 600_000.0), -1.0);
        assert_eq!(view("0001100100").scaled_unsigned(0..10, 10.0), 10.0);
    }

    #[test]
    fn test_flag() {
        let v = view("01");
        assert!(!v.flag(0));
        assert!(v.flag(1));
        assert!(!v.flag(99));
    }

    #[test]
    fn test_text_pad_and_trim() {
        // "@HI@@" -> " HI  " -> "HI"
        let v = BitView::from_sixbit(&[0, 8, 9, 0, 0], 0);
        assert_eq!(v.text(0..30), "HI");
        // space symbol (32) is also trimmed
        let v = BitView::from_sixbit(&[32, 1, 32], 0);
        assert_eq!(v.text(0..18), "A");
    }

    #[test]
    fn test_text_to_end_ignores_partial_char() {
        let v = BitView::from_sixbit(&[8, 9], 2);
        assert_eq!(v.len(), 10);
        assert_eq!(v.text_to_end(0), "H");
    }

    #[test]
    fn test_from_sixbit_drops_trailing() {
        let v = BitView::from_sixbit(&[0b111111], 2);
        assert_eq!(v.to_string(), "1111");
    }

    #[test]
    fn test_tail_and_raw() {
        let v = view("1100110");
        assert_eq!(v.tail(4).to_string(), "110");
        assert_eq!(v.tail(10).len(), 0);
        assert_eq!(v.raw(1..3).to_string(), "10");
    }

    #[test]
    fn test_from_bit_str_rejects_garbage() {
        assert!(BitView::from_bit_str("10x").is_none());
    }
}
