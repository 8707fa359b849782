//! NMEA 4.10 tag blocks: `\c:1671533231,s:station*hh\` in front of a sentence.
//!
//! Parameters are comma-separated `key:value` pairs. The checksum covers the
//! text between the opening backslash and `*`, same XOR as sentences.

use serde::Serialize;

use crate::sentence::{checksum, parse_hex_checksum, verify_checksum, ChecksumMode};
use crate::types::{AisError, Result};

/// Sentence grouping parameter (`g:<number>-<total>-<id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    pub sentence: u32,
    pub total: u32,
    pub id: u32,
}

/// Out-of-band metadata carried ahead of a sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagBlock {
    /// `c`: UNIX time in seconds (milliseconds are scaled down).
    pub timestamp: Option<i64>,
    /// `s`: source station.
    pub source: Option<String>,
    /// `d`: destination.
    pub destination: Option<String>,
    /// `n`: line count.
    pub line_count: Option<u32>,
    /// `r`: relative time.
    pub relative_time: Option<i64>,
    /// `g`: sentence grouping.
    pub group: Option<TagGroup>,
    /// `t`: free text.
    pub text: Option<String>,
    /// Unrecognised parameters, in order.
    pub extras: Vec<(String, String)>,
    pub checksum_ok: bool,
}

fn malformed(text: &str, why: &str) -> AisError {
    AisError::MalformedTagBlock(format!("{why}: {text:?}"))
}

/// Parse the text between the two backslashes of a tag block.
pub fn parse_tag_block(text: &str, mode: ChecksumMode) -> Result<TagBlock> {
    let (params, declared) = text
        .rsplit_once('*')
        .ok_or_else(|| malformed(text, "missing checksum"))?;
    let declared = parse_hex_checksum(declared).ok_or_else(|| malformed(text, "bad checksum"))?;

    let mut tb = TagBlock {
        checksum_ok: verify_checksum("tag block", declared, checksum(params), mode)?,
        ..TagBlock::default()
    };

    for param in params.split(',').filter(|p| !p.is_empty()) {
        let (key, value) = param
            .split_once(':')
            .ok_or_else(|| malformed(text, "parameter without ':'"))?;
        match key {
            "c" => tb.timestamp = Some(parse_timestamp(value).ok_or_else(|| malformed(text, "bad c"))?),
            "s" => tb.source = Some(value.to_string()),
            "d" => tb.destination = Some(value.to_string()),
            "n" => tb.line_count = Some(value.parse().map_err(|_| malformed(text, "bad n"))?),
            "r" => tb.relative_time = Some(value.parse().map_err(|_| malformed(text, "bad r"))?),
            "g" => tb.group = Some(parse_group(value).ok_or_else(|| malformed(text, "bad g"))?),
            "t" => tb.text = Some(value.to_string()),
            _ => tb.extras.push((key.to_string(), value.to_string())),
        }
    }

    Ok(tb)
}

/// Some sources send milliseconds; anything past year ~2286 in seconds is
/// treated as milliseconds.
fn parse_timestamp(value: &str) -> Option<i64> {
    let v: i64 = value.parse().ok()?;
    Some(if v > 9_999_999_999 { v / 1000 } else { v })
}

fn parse_group(value: &str) -> Option<TagGroup> {
    let mut parts = value.splitn(3, '-');
    let sentence = parts.next()?.parse().ok()?;
    let total = parts.next()?.parse().ok()?;
    let id = parts.next()?.parse().ok()?;
    Some(TagGroup {
        sentence,
        total,
        id,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
