//! Reassembled AIS frames: one logical message's bit payload.
//!
//! Responsibilities:
//! - Concatenate fragment payloads and decode the armoring into bits
//! - Classify the message type from the first 6 bits
//! - Validate a frame against a message type's declared length before decoding

use crate::armor::decode_armored;
use crate::bits::BitView;
use crate::sentence::{Carrier, Sentence};
use crate::tagblock::TagBlock;
use crate::types::{AisError, Header, MessageType, Result};

/// A fully reassembled AIS message payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Decoded bits, fill bits already dropped.
    pub bits: BitView,
    /// Concatenated armored payload.
    pub payload: String,
    /// Fill bits of the last fragment.
    pub fill_bits: u8,
    /// Number of sentences this frame was built from.
    pub fragments: u8,
    pub channel: Option<char>,
    pub carrier: Carrier,
    pub tag_block: Option<TagBlock>,
}

impl Frame {
    /// Build a frame from an ordered, complete run of fragments.
    pub fn from_sentences(sentences: &[Sentence]) -> Result<Frame> {
        let last = sentences
            .last()
            .ok_or_else(|| AisError::MalformedSentence("no fragments".into()))?;

        let payload: String = sentences.iter().map(|s| s.payload.as_str()).collect();
        let bits = decode_armored(&payload, last.fill_bits)?;

        Ok(Frame {
            bits,
            payload,
            fill_bits: last.fill_bits,
            fragments: sentences.len() as u8,
            channel: sentences.iter().find_map(|s| s.channel),
            carrier: sentences[0].carrier,
            tag_block: sentences.iter().find_map(|s| s.tag_block.clone()),
        })
    }

    /// Build a frame straight from an armored payload (no sentence framing).
    pub fn from_payload(payload: &str, fill_bits: u8) -> Result<Frame> {
        Ok(Frame {
            bits: decode_armored(payload, fill_bits)?,
            payload: payload.to_string(),
            fill_bits,
            fragments: 1,
            channel: None,
            carrier: Carrier::Vdm,
            tag_block: None,
        })
    }

    /// Build a frame around an existing bit view.
    pub fn from_bits(bits: BitView) -> Frame {
        Frame {
            bits,
            payload: String::new(),
            fill_bits: 0,
            fragments: 1,
            channel: None,
            carrier: Carrier::Vdm,
            tag_block: None,
        }
    }

    /// Payload length in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Raw 6-bit discriminant.
    pub fn message_code(&self) -> u8 {
        self.bits.unsigned(0..6) as u8
    }

    /// Message type, or `UnsupportedMessageType` outside 1..=27.
    pub fn message_type(&self) -> Result<MessageType> {
        MessageType::from_code(self.message_code())
    }

    /// Shared header: type, repeat indicator, MMSI.
    pub fn header(&self) -> Header {
        Header {
            message_type: self.message_code(),
            repeat_indicator: self.bits.unsigned(6..8) as u8,
            mmsi: self.bits.unsigned(8..38) as u32,
        }
    }

    /// Check that this frame carries `kind` and that its length fits the
    /// type's declared bounds. Runs before any field extraction.
    pub fn ensure(&self, kind: MessageType) -> Result<()> {
        let code = self.message_code();
        if code != kind.code() {
            return Err(AisError::InvalidFrame {
                message_type: kind.code(),
                reason: format!("discriminant is {code}"),
            });
        }

        let info = kind.info();
        let len = self.len();
        if len < info.min_bits || len > info.max_bits {
            let reason = if info.is_fixed_length() {
                format!("expected {} bits, got {len}", info.min_bits)
            } else {
                format!(
                    "expected {}..={} bits, got {len}",
                    info.min_bits, info.max_bits
                )
            };
            return Err(AisError::InvalidFrame {
                message_type: kind.code(),
                reason,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
