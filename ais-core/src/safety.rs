//! Safety related text messages (12 addressed, 14 broadcast).
//! Acknowledgements (13) share the binary acknowledge layout.

use serde::Serialize;

use crate::frame::Frame;
use crate::types::*;

/// Type 12: addressed safety related message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressedSafetyMessage {
    #[serde(flatten)]
    pub header: Header,
    pub sequence_number: u8,
    pub destination_mmsi: u32,
    pub retransmit: bool,
    pub text: String,
}

pub fn decode_addressed_safety(frame: &Frame) -> Result<AddressedSafetyMessage> {
    frame.ensure(MessageType::AddressedSafetyRelated)?;
    let b = &frame.bits;

    Ok(AddressedSafetyMessage {
        header: frame.header(),
        sequence_number: b.unsigned(38..40) as u8,
        destination_mmsi: b.unsigned(40..70) as u32,
        retransmit: b.flag(70),
        text: b.text_to_end(72),
    })
}

/// Type 14: safety related broadcast message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyBroadcastMessage {
    #[serde(flatten)]
    pub header: Header,
    pub text: String,
}

pub fn decode_safety_broadcast(frame: &Frame) -> Result<SafetyBroadcastMessage> {
    frame.ensure(MessageType::SafetyRelatedBroadcast)?;

    Ok(SafetyBroadcastMessage {
        header: frame.header(),
        text: frame.bits.text_to_end(40),
    })
}
