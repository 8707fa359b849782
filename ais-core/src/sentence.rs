//! Parse one NMEA-armored text line into a `Sentence`.
//!
//! Wire grammar (after an optional `\...\` tag block):
//!
//! ```text
//! !AIVDM,<count>,<index>,<seq-id>,<channel>,<payload>,<fill>*<hh>
//! ```
//!
//! The checksum is the XOR of every byte between the leading marker and `*`.
//! Only the VDM (other vessels) and VDO (own vessel) formatters are accepted;
//! any talker prefix is allowed.

use serde::Serialize;
use tracing::warn;

use crate::tagblock::{self, TagBlock};
use crate::types::{AisError, Result};

/// How checksum mismatches are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChecksumMode {
    /// Drop mismatching lines.
    Strict,
    /// Log mismatches and keep going.
    #[default]
    Permissive,
}

impl std::str::FromStr for ChecksumMode {
    type Err = AisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ChecksumMode::Strict),
            "permissive" | "lenient" => Ok(ChecksumMode::Permissive),
            other => Err(AisError::Config(format!("unknown checksum mode: {other}"))),
        }
    }
}

impl std::fmt::Display for ChecksumMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumMode::Strict => write!(f, "strict"),
            ChecksumMode::Permissive => write!(f, "permissive"),
        }
    }
}

/// The two accepted sentence formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Carrier {
    /// Messages received from other stations.
    Vdm,
    /// Own-vessel messages.
    Vdo,
}

/// One parsed protocol line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    pub talker: String,
    pub carrier: Carrier,
    pub fragment_count: u8,
    /// 1-based.
    pub fragment_index: u8,
    pub sequence_id: Option<u8>,
    pub channel: Option<char>,
    pub payload: String,
    pub fill_bits: u8,
    pub checksum: u8,
    /// False only in permissive mode, when the checksum didn't match.
    pub checksum_ok: bool,
    pub tag_block: Option<TagBlock>,
}

impl Sentence {
    pub fn is_single_fragment(&self) -> bool {
        self.fragment_count == 1
    }

    pub fn is_last_fragment(&self) -> bool {
        self.fragment_index == self.fragment_count
    }
}

/// XOR of all bytes in `data`.
pub fn checksum(data: &str) -> u8 {
    data.bytes().fold(0, |acc, b| acc ^ b)
}

/// Parse two uppercase or lowercase hex digits.
pub(crate) fn parse_hex_checksum(s: &str) -> Option<u8> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(s, 16).ok()
}

/// Check a declared checksum against the computed one, honouring `mode`.
///
/// Returns whether the checksum matched; errors only in strict mode.
pub(crate) fn verify_checksum(
    what: &str,
    expected: u8,
    actual: u8,
    mode: ChecksumMode,
) -> Result<bool> {
    if expected == actual {
        return Ok(true);
    }
    match mode {
        ChecksumMode::Strict => Err(AisError::ChecksumMismatch { expected, actual }),
        ChecksumMode::Permissive => {
            warn!(
                expected = format_args!("{expected:02X}"),
                actual = format_args!("{actual:02X}"),
                "{what} checksum mismatch, continuing"
            );
            Ok(false)
        }
    }
}

fn malformed(line: &str, why: &str) -> AisError {
    AisError::MalformedSentence(format!("{why}: {line:?}"))
}

/// Parse a single line into a `Sentence`.
pub fn parse_sentence(line: &str, mode: ChecksumMode) -> Result<Sentence> {
    let line = line.trim_end_matches(['\r', '\n', ' ', '\t']).trim_start();

    // Optional tag block: \key:value,...*hh\
    let (tag_block, body) = if let Some(rest) = line.strip_prefix('\\') {
        let end = rest
            .find('\\')
            .ok_or_else(|| malformed(line, "unterminated tag block"))?;
        let tb = tagblock::parse_tag_block(&rest[..end], mode)?;
        (Some(tb), &rest[end + 1..])
    } else {
        (None, line)
    };

    let inner = body
        .strip_prefix('!')
        .or_else(|| body.strip_prefix('$'))
        .ok_or_else(|| malformed(line, "missing leading marker"))?;

    let (data, declared) = inner
        .rsplit_once('*')
        .ok_or_else(|| malformed(line, "missing checksum delimiter"))?;
    let declared =
        parse_hex_checksum(declared).ok_or_else(|| malformed(line, "bad checksum field"))?;

    let fields: Vec<&str> = data.split(',').collect();
    if fields.len() != 7 {
        return Err(malformed(line, "expected 7 fields"));
    }

    let address = fields[0];
    if address.len() != 5 || !address.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(malformed(line, "bad address field"));
    }
    let (talker, formatter) = address.split_at(2);
    let carrier = match formatter {
        "VDM" => Carrier::Vdm,
        "VDO" => Carrier::Vdo,
        _ => return Err(AisError::UnsupportedCarrier(address.to_string())),
    };

    let fragment_count = parse_digit_field(fields[1])
        .filter(|&n| n >= 1)
        .ok_or_else(|| malformed(line, "bad fragment count"))?;
    let fragment_index = parse_digit_field(fields[2])
        .filter(|&n| (1..=fragment_count).contains(&n))
        .ok_or_else(|| malformed(line, "bad fragment index"))?;
    let sequence_id = match fields[3] {
        "" => None,
        s => Some(parse_digit_field(s).ok_or_else(|| malformed(line, "bad sequence id"))?),
    };
    let channel = match fields[4].len() {
        0 => None,
        1 => fields[4].chars().next(),
        _ => return Err(malformed(line, "bad channel")),
    };
    let payload = fields[5];
    if payload.bytes().any(|b| !b.is_ascii_graphic()) {
        return Err(malformed(line, "bad payload"));
    }
    let fill_bits =
        parse_digit_field(fields[6]).ok_or_else(|| malformed(line, "bad fill bits"))?;

    let checksum_ok = verify_checksum("sentence", declared, checksum(data), mode)?;

    Ok(Sentence {
        talker: talker.to_string(),
        carrier,
        fragment_count,
        fragment_index,
        sequence_id,
        channel,
        payload: payload.to_string(),
        fill_bits,
        checksum: declared,
        checksum_ok,
        tag_block,
    })
}

/// Small non-negative decimal field (1-2 digits).
fn parse_digit_field(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TYPE1: &str = "!AIVDM,1,1,,B,15MqdBP000G@qoLEi69PVGaN0D0=,0*3A";
    const TYPE5_PART1: &str =
        "!AIVDM,2,1,3,B,55P5TL01VIaAL@7WKO@mBplU@<PDhh000000001S;AJ::4A80?4i@E53,0*3E";

    #[test]
    fn test_parse_single_fragment() {
        let s = parse_sentence(TYPE1, ChecksumMode::Strict).unwrap();
        assert_eq!(s.talker, "AI");
        assert_eq!(s.carrier, Carrier::Vdm);
        assert_eq!(s.fragment_count, 1);
        assert_eq!(s.fragment_index, 1);
        assert_eq!(s.sequence_id, None);
        assert_eq!(s.channel, Some('B'));
        assert_eq!(s.payload, "15MqdBP000G@qoLEi69PVGaN0D0=");
        assert_eq!(s.fill_bits, 0);
        assert_eq!(s.checksum, 0x3A);
        assert!(s.checksum_ok);
        assert!(s.is_single_fragment());
        assert!(s.tag_block.is_none());
    }

    #[test]
    fn test_parse_multi_fragment_fields() {
        let s = parse_sentence(TYPE5_PART1, ChecksumMode::Strict).unwrap();
        assert_eq!(s.fragment_count, 2);
        assert_eq!(s.fragment_index, 1);
        assert_eq!(s.sequence_id, Some(3));
        assert!(!s.is_last_fragment());
    }

    #[test]
    fn test_checksum_xor() {
        assert_eq!(checksum("AIVDM,1,1,,B,15MqdBP000G@qoLEi69PVGaN0D0=,0"), 0x3A);
        assert_eq!(checksum(""), 0);
    }

    #[test]
    fn test_trailing_crlf_accepted() {
        let line = format!("{TYPE1}\r\n");
        assert!(parse_sentence(&line, ChecksumMode::Strict).is_ok());
    }

    #[test]
    fn test_checksum_mismatch_strict() {
        let bad = TYPE1.replace("*3A", "*3B");
        assert!(matches!(
            parse_sentence(&bad, ChecksumMode::Strict),
            Err(AisError::ChecksumMismatch {
                expected: 0x3B,
                actual: 0x3A
            })
        ));
    }

    #[test]
    fn test_checksum_mismatch_permissive() {
        let bad = TYPE1.replace("*3A", "*3B");
        let s = parse_sentence(&bad, ChecksumMode::Permissive).unwrap();
        assert!(!s.checksum_ok);
        assert_eq!(s.checksum, 0x3B);
    }

    #[test]
    fn test_vdo_and_other_talkers() {
        let body = "BSVDO,1,1,,A,15MqdBP000G@qoLEi69PVGaN0D0=,0";
        let line = format!("!{body}*{:02X}", checksum(body));
        let s = parse_sentence(&line, ChecksumMode::Strict).unwrap();
        assert_eq!(s.talker, "BS");
        assert_eq!(s.carrier, Carrier::Vdo);
    }

    #[test]
    fn test_unsupported_carrier() {
        let body = "GPGGA,1,1,,A,15Mq,0";
        let line = format!("!{body}*{:02X}", checksum(body));
        assert!(matches!(
            parse_sentence(&line, ChecksumMode::Strict),
            Err(AisError::UnsupportedCarrier(_))
        ));
    }

    #[test]
    fn test_malformed_lines() {
        let cases = [
            "",
            "AIVDM,1,1,,B,15Mq,0*00",
            "!AIVDM,1,1,,B,15Mq,0",
            "!AIVDM,1,1,,B,15Mq,0*3",
            "!AIVDM,1,1,,B,15Mq,0*3AX",
            "!AIVDM,1,1,B,15Mq,0*00",
            "!AIVDM,0,1,,B,15Mq,0*00",
            "!AIVDM,x,1,,B,15Mq,0*00",
            "!AIVDM,1,0,,B,15Mq,0*00",
            "!AIVDM,1,7,,B,15Mq,0*00",
            "!AIVDM,2,3,1,B,15Mq,0*00",
            "!AIVDM,1,1,,AB,15Mq,0*00",
            "!AIVDM,1,1,,B,15Mq,*00",
        ];
        for line in cases {
            assert!(
                matches!(
                    parse_sentence(line, ChecksumMode::Permissive),
                    Err(AisError::MalformedSentence(_))
                ),
                "expected MalformedSentence for {line:?}"
            );
        }
    }

    #[test]
    fn test_tag_block_prefix() {
        let line = format!("\\s:2573345,c:1671533231*09\\{TYPE1}");
        let s = parse_sentence(&line, ChecksumMode::Strict).unwrap();
        let tb = s.tag_block.unwrap();
        assert_eq!(tb.source.as_deref(), Some("2573345"));
        assert_eq!(tb.timestamp, Some(1671533231));
        assert_eq!(s.payload, "15MqdBP000G@qoLEi69PVGaN0D0=");
    }

    #[test]
    fn test_unterminated_tag_block() {
        let line = "\\s:2573345,c:1671533231*09!AIVDM";
        assert!(matches!(
            parse_sentence(line, ChecksumMode::Permissive),
            Err(AisError::MalformedSentence(_))
        ));
    }

    #[test]
    fn test_checksum_mode_from_str() {
        assert_eq!("strict".parse::<ChecksumMode>().unwrap(), ChecksumMode::Strict);
        assert_eq!(
            "Permissive".parse::<ChecksumMode>().unwrap(),
            ChecksumMode::Permissive
        );
        assert!("maybe".parse::<ChecksumMode>().is_err());
    }
}
