//! Static and voyage data: type 5 (class A) and type 24 (class B, two parts).

use serde::Serialize;

use crate::fields::{check_range, is_auxiliary_craft, Dimensions, Eta};
use crate::frame::Frame;
use crate::types::*;

/// Type 5: static and voyage related data. Usually sent as two fragments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipStaticData {
    #[serde(flatten)]
    pub header: Header,
    pub ais_version: u8,
    pub imo_number: u32,
    pub call_sign: String,
    pub ship_name: String,
    pub ship_type: u8,
    pub dimensions: Dimensions,
    pub position_fixing_device: PositionFixingDevice,
    pub eta: Eta,
    /// Metres, 0.1 m resolution.
    pub draught: f64,
    pub destination: String,
    /// False when a DTE is available.
    pub dte: bool,
}

pub fn decode_ship_static_data(frame: &Frame) -> Result<ShipStaticData> {
    frame.ensure(MessageType::ShipAndVoyageData)?;

    let b = &frame.bits;
    let header = frame.header();

    let msg = ShipStaticData {
        header,
        ais_version: b.unsigned(38..40) as u8,
        imo_number: b.unsigned(40..70) as u32,
        call_sign: b.text(70..112),
        ship_name: b.text(112..232),
        ship_type: b.unsigned(232..240) as u8,
        dimensions: Dimensions::decode(b, 240),
        position_fixing_device: PositionFixingDevice::from_code(b.unsigned(270..274) as u8),
        eta: Eta::decode(b, 274),
        draught: b.scaled_unsigned(294..302, 10.0),
        destination: b.text(302..422),
        dte: b.flag(422),
    };

    check_range(header.mmsi, "eta_month", msg.eta.month, 0, 12);
    check_range(header.mmsi, "eta_day", msg.eta.day, 0, 31);

    Ok(msg)
}

// ---------------------------------------------------------------------------
// Type 24
// ---------------------------------------------------------------------------

/// Where part B's 30-bit block points: hull dimensions, or the parent
/// vessel for auxiliary craft (MMSI 98MIDxxxx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartBReference {
    Dimensions(Dimensions),
    MothershipMmsi(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "part")]
pub enum StaticDataPart {
    A {
        ship_name: String,
    },
    B {
        ship_type: u8,
        vendor_id: String,
        unit_model_code: u8,
        serial_number: u32,
        call_sign: String,
        reference: PartBReference,
        position_fixing_device: PositionFixingDevice,
    },
}

/// Type 24: class B static data report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticDataReport {
    #[serde(flatten)]
    pub header: Header,
    #[serde(flatten)]
    pub part: StaticDataPart,
}

const PART_B_BITS: usize = 168;

pub fn decode_static_data_report(frame: &Frame) -> Result<StaticDataReport> {
    frame.ensure(MessageType::StaticDataReport)?;

    let b = &frame.bits;
    let header = frame.header();

    // Part A may be 160 or 168 bits; part B is fixed.
    let part_number = b.unsigned(38..40);
    if part_number == 1 && b.len() != PART_B_BITS {
        return Err(AisError::InvalidFrame {
            message_type: 24,
            reason: format!("part B needs {PART_B_BITS} bits, got {}", b.len()),
        });
    }

    let part = match part_number {
        0 => StaticDataPart::A {
            ship_name: b.text(40..160),
        },
        1 => StaticDataPart::B {
            ship_type: b.unsigned(40..48) as u8,
            vendor_id: b.text(48..66),
            unit_model_code: b.unsigned(66..70) as u8,
            serial_number: b.unsigned(70..90) as u32,
            call_sign: b.text(90..132),
            reference: if is_auxiliary_craft(header.mmsi) {
                PartBReference::MothershipMmsi(b.unsigned(132..162) as u32)
            } else {
                PartBReference::Dimensions(Dimensions::decode(b, 132))
            },
            position_fixing_device: PositionFixingDevice::from_code(b.unsigned(162..166) as u8),
        },
        n => {
            return Err(AisError::InvalidFrame {
                message_type: 24,
                reason: format!("reserved part number {n}"),
            })
        }
    };

    Ok(StaticDataReport { header, part })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
