//! Armored payload decoding: six-bit-per-character text + fill bits -> bits.
//!
//! The armoring alphabet is the 64 printable characters `0`..=`W` and
//! `` ` ``..=`w`. Each maps to a 6-bit value; the last character of the
//! final fragment carries `fill_bits` (0-5) padding bits that are dropped.

use crate::bits::BitView;
use crate::types::{AisError, Result};

/// Maximum number of fill bits a sentence may declare.
pub const MAX_FILL_BITS: u8 = 5;

/// Map one armored character onto its 6-bit value.
pub fn armor_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'W' => Some(c - b'0'),
        b'`'..=b'w' => Some(c - b'0' - 8),
        _ => None,
    }
}

/// Decode an armored payload into a bit view.
pub fn decode_armored(payload: &str, fill_bits: u8) -> Result<BitView> {
    if fill_bits > MAX_FILL_BITS {
        return Err(AisError::InvalidFillBits(fill_bits));
    }

    let mut values = Vec::with_capacity(payload.len());
    for c in payload.bytes() {
        let v = armor_value(c).ok_or(AisError::InvalidCharacter(c as char))?;
        values.push(v);
    }

    // Fill bits can't remove more than the payload holds.
    if values.is_empty() && fill_bits > 0 {
        return Err(AisError::InvalidFillBits(fill_bits));
    }

    Ok(BitView::from_sixbit(&values, fill_bits as usize))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::TEXT_CHARSET;

    /// Armor 6-bit values back into payload characters (test-only).
    fn armor(values: &[u8]) -> String {
        values
            .iter()
            .map(|&v| {
                let c = v + b'0';
                (if c > b'W' { c + 8 } else { c }) as char
            })
            .collect()
    }

    fn sixbit_text(s: &str) -> Vec<u8> {
        s.bytes()
            .map(|c| TEXT_CHARSET.iter().position(|&t| t == c).unwrap() as u8)
            .collect()
    }

    #[test]
    fn test_armor_value_ranges() {
        assert_eq!(armor_value(b'0'), Some(0));
        assert_eq!(armor_value(b'W'), Some(39));
        assert_eq!(armor_value(b'`'), Some(40));
        assert_eq!(armor_value(b'w'), Some(63));
        assert_eq!(armor_value(b'X'), None);
        assert_eq!(armor_value(b'_'), None);
        assert_eq!(armor_value(b'x'), None);
    }

    #[test]
    fn test_all_64_symbols_roundtrip() {
        let values: Vec<u8> = (0..64).collect();
        let payload = armor(&values);
        let bits = decode_armored(&payload, 0).unwrap();
        assert_eq!(bits.len(), 64 * 6);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(bits.unsigned(i * 6..i * 6 + 6), *v as u64);
        }
    }

    #[test]
    fn test_hello_roundtrip() {
        let payload = armor(&sixbit_text("HELLO"));
        let bits = decode_armored(&payload, 0).unwrap();
        assert_eq!(bits.len(), 30);
        assert_eq!(bits.text(0..30), "HELLO");
    }

    #[test]
    fn test_fill_bits_dropped() {
        let bits = decode_armored("w", 2).unwrap();
        assert_eq!(bits.to_string(), "1111");
    }

    #[test]
    fn test_invalid_character() {
        assert!(matches!(
            decode_armored("15Mq!", 0),
            Err(AisError::InvalidCharacter('!'))
        ));
    }

    #[test]
    fn test_invalid_fill_bits() {
        assert!(matches!(
            decode_armored("15Mq", 6),
            Err(AisError::InvalidFillBits(6))
        ));
        assert!(matches!(
            decode_armored("", 1),
            Err(AisError::InvalidFillBits(1))
        ));
        assert!(decode_armored("", 0).unwrap().is_empty());
    }
}
