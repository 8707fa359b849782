//! Binary messages: addressed (6), broadcast (8), acknowledgements (7, 13),
//! DGNSS corrections (17), and single/multiple slot binary (25, 26).
//!
//! Messages 6 and 8 always carry a DAC/FI header and go through
//! [`decode_asm`]. Messages 25 and 26 only do when their structured flag is
//! set; otherwise the payload is kept as raw bits.

use serde::Serialize;

use crate::asm::{decode_asm, ApplicationSpecificMessage};
use crate::bits::BitView;
use crate::commstate::{CommunicationState, COMM_STATE_BITS};
use crate::fields::check_position;
use crate::frame::Frame;
use crate::position::LOW_RES;
use crate::types::*;

/// Width of a DAC/FI application identifier.
const APP_ID_BITS: usize = 16;

/// Payload of a binary message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinaryData {
    Structured {
        dac: u16,
        fi: u8,
        application: ApplicationSpecificMessage,
    },
    Unstructured {
        data: BitView,
    },
}

impl BinaryData {
    /// Split a 16-bit application identifier off `bits[start..end]` and
    /// dispatch the remainder.
    fn structured(bits: &BitView, start: usize, end: usize) -> BinaryData {
        let dac = bits.unsigned(start..start + 10) as u16;
        let fi = bits.unsigned(start + 10..start + APP_ID_BITS) as u8;
        let data = bits.bits(start + APP_ID_BITS, end.max(start + APP_ID_BITS));
        BinaryData::Structured {
            dac,
            fi,
            application: decode_asm(dac, fi, &data),
        }
    }

    fn unstructured(bits: &BitView, start: usize, end: usize) -> BinaryData {
        BinaryData::Unstructured {
            data: bits.bits(start, end.max(start)),
        }
    }
}

// ---------------------------------------------------------------------------
// Types 6 and 8
// ---------------------------------------------------------------------------

/// Type 6: binary data addressed to one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressedBinaryMessage {
    #[serde(flatten)]
    pub header: Header,
    pub sequence_number: u8,
    pub destination_mmsi: u32,
    pub retransmit: bool,
    pub data: BinaryData,
}

pub fn decode_addressed_binary(frame: &Frame) -> Result<AddressedBinaryMessage> {
    frame.ensure(MessageType::AddressedBinary)?;
    let b = &frame.bits;

    Ok(AddressedBinaryMessage {
        header: frame.header(),
        sequence_number: b.unsigned(38..40) as u8,
        destination_mmsi: b.unsigned(40..70) as u32,
        retransmit: b.flag(70),
        data: BinaryData::structured(b, 72, b.len()),
    })
}

/// Type 8: binary broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryBroadcastMessage {
    #[serde(flatten)]
    pub header: Header,
    pub data: BinaryData,
}

pub fn decode_binary_broadcast(frame: &Frame) -> Result<BinaryBroadcastMessage> {
    frame.ensure(MessageType::BinaryBroadcast)?;
    let b = &frame.bits;

    Ok(BinaryBroadcastMessage {
        header: frame.header(),
        data: BinaryData::structured(b, 40, b.len()),
    })
}

// ---------------------------------------------------------------------------
// Acknowledgements (7, 13)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcknowledgedMessage {
    pub mmsi: u32,
    pub sequence_number: u8,
}

/// Types 7 and 13: acknowledgement of up to four addressed messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledge {
    #[serde(flatten)]
    pub header: Header,
    pub acknowledgements: Vec<AcknowledgedMessage>,
}

/// Decode types 7 and 13. One to four 32-bit entries follow the header;
/// only entries that are fully present are returned.
pub fn decode_acknowledge(frame: &Frame) -> Result<Acknowledge> {
    let kind = match frame.message_code() {
        13 => MessageType::SafetyRelatedAcknowledge,
        _ => MessageType::BinaryAcknowledge,
    };
    frame.ensure(kind)?;
    let b = &frame.bits;

    let acknowledgements = (0..4)
        .map(|i| 40 + i * 32)
        .take_while(|&start| b.len() >= start + 32)
        .map(|start| AcknowledgedMessage {
            mmsi: b.unsigned(start..start + 30) as u32,
            sequence_number: b.unsigned(start + 30..start + 32) as u8,
        })
        .collect();

    Ok(Acknowledge {
        header: frame.header(),
        acknowledgements,
    })
}

// ---------------------------------------------------------------------------
// DGNSS broadcast (17)
// ---------------------------------------------------------------------------

/// Type 17: DGNSS corrections from a base station. The correction words
/// are kept as raw bits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GnssBroadcast {
    #[serde(flatten)]
    pub header: Header,
    /// Reference station position, 1/10 minute resolution.
    pub longitude: f64,
    pub latitude: f64,
    pub data: BitView,
}

pub fn decode_gnss_broadcast(frame: &Frame) -> Result<GnssBroadcast> {
    frame.ensure(MessageType::GnssBinaryBroadcast)?;
    let b = &frame.bits;
    let header = frame.header();

    let msg = GnssBroadcast {
        header,
        longitude: b.scaled(40..58, LOW_RES),
        latitude: b.scaled(58..75, LOW_RES),
        data: b.tail(80),
    };
    check_position(header.mmsi, msg.longitude, msg.latitude);
    Ok(msg)
}

// ---------------------------------------------------------------------------
// Single and multiple slot binary (25, 26)
// ---------------------------------------------------------------------------

/// Types 25 and 26 share a header: addressed flag, structured flag, then
/// an optional destination and an optional application identifier.
fn slot_binary_payload(b: &BitView, end: usize) -> (Option<u32>, BinaryData) {
    let addressed = b.flag(38);
    let structured = b.flag(39);

    let (destination, start) = if addressed {
        (Some(b.unsigned(40..70) as u32), 70)
    } else {
        (None, 40)
    };

    let data = if structured {
        BinaryData::structured(b, start, end)
    } else {
        BinaryData::unstructured(b, start, end)
    };
    (destination, data)
}

/// Type 25: single slot binary message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleSlotBinaryMessage {
    #[serde(flatten)]
    pub header: Header,
    pub destination_mmsi: Option<u32>,
    pub data: BinaryData,
}

pub fn decode_single_slot_binary(frame: &Frame) -> Result<SingleSlotBinaryMessage> {
    frame.ensure(MessageType::SingleSlotBinary)?;
    let b = &frame.bits;
    let (destination_mmsi, data) = slot_binary_payload(b, b.len());

    Ok(SingleSlotBinaryMessage {
        header: frame.header(),
        destination_mmsi,
        data,
    })
}

/// Type 26: multiple slot binary message, with a trailing communication
/// state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipleSlotBinaryMessage {
    #[serde(flatten)]
    pub header: Header,
    pub destination_mmsi: Option<u32>,
    pub data: BinaryData,
    pub communication_state: CommunicationState,
}

pub fn decode_multiple_slot_binary(frame: &Frame) -> Result<MultipleSlotBinaryMessage> {
    frame.ensure(MessageType::MultipleSlotBinary)?;
    let b = &frame.bits;

    // Selector bit followed by the 19-bit state, always last.
    let selector = b.len() - COMM_STATE_BITS - 1;
    let (destination_mmsi, data) = slot_binary_payload(b, selector);

    Ok(MultipleSlotBinaryMessage {
        header: frame.header(),
        destination_mmsi,
        data,
        communication_state: CommunicationState::decode(b, selector + 1, b.flag(selector)),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
