//! Base station report / UTC response (4, 11) and UTC inquiry (10).

use serde::Serialize;

use crate::commstate::CommunicationState;
use crate::fields::{check_position, check_range, check_second};
use crate::frame::Frame;
use crate::position::HIGH_RES;
use crate::types::*;

/// Types 4 and 11: UTC/date and position of a base station (4) or of a
/// mobile station answering an inquiry (11). The layouts are identical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStationReport {
    #[serde(flatten)]
    pub header: Header,
    /// 1-9999, 0 = not available.
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub position_fixing_device: PositionFixingDevice,
    pub raim: bool,
    pub communication_state: CommunicationState,
}

pub fn decode_base_station_report(frame: &Frame) -> Result<BaseStationReport> {
    let kind = match frame.message_code() {
        11 => MessageType::UtcAndDateResponse,
        _ => MessageType::BaseStationReport,
    };
    frame.ensure(kind)?;

    let b = &frame.bits;
    let header = frame.header();
    let mmsi = header.mmsi;

    let msg = BaseStationReport {
        header,
        year: b.unsigned(38..52) as u16,
        month: b.unsigned(52..56) as u8,
        day: b.unsigned(56..61) as u8,
        hour: b.unsigned(61..66) as u8,
        minute: b.unsigned(66..72) as u8,
        second: b.unsigned(72..78) as u8,
        position_accuracy: b.flag(78),
        longitude: b.scaled(79..107, HIGH_RES),
        latitude: b.scaled(107..134, HIGH_RES),
        position_fixing_device: PositionFixingDevice::from_code(b.unsigned(134..138) as u8),
        raim: b.flag(148),
        communication_state: CommunicationState::decode(b, 149, false),
    };

    // 13 / 32 / 24 / 60 are the "not available" codes; seconds 61-63 are status codes.
    check_range(mmsi, "month", msg.month, 0, 12);
    check_range(mmsi, "day", msg.day, 0, 31);
    check_range(mmsi, "hour", msg.hour, 0, 24);
    check_range(mmsi, "minute", msg.minute, 0, 60);
    check_second(mmsi, msg.second);
    check_position(mmsi, msg.longitude, msg.latitude);

    Ok(msg)
}

/// Type 10: request for a type 11 reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtcDateInquiry {
    #[serde(flatten)]
    pub header: Header,
    pub destination_mmsi: u32,
}

pub fn decode_utc_inquiry(frame: &Frame) -> Result<UtcDateInquiry> {
    frame.ensure(MessageType::UtcAndDateInquiry)?;
    Ok(UtcDateInquiry {
        header: frame.header(),
        destination_mmsi: frame.bits.unsigned(40..70) as u32,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitView;
    use crate::commstate::{Sotdma, SotdmaSubMessage, SyncState};

    #[test]
    fn test_type4_base_station() {
        let frame = Frame::from_payload("403OviQuMGCqWrRO9>E6fE700@GO", 0).unwrap();
        let msg = decode_base_station_report(&frame).unwrap();
        assert_eq!(msg.header.message_type, 4);
        assert_eq!(msg.header.mmsi, 3669702);
        assert_eq!((msg.year, msg.month, msg.day), (2007, 5, 14));
        assert_eq!((msg.hour, msg.minute, msg.second), (19, 57, 39));
        assert!(msg.position_accuracy);
        assert!((msg.longitude + 76.35236166666667).abs() < 1e-9);
        assert!((msg.latitude - 36.883766666666666).abs() < 1e-9);
        assert_eq!(msg.position_fixing_device, PositionFixingDevice::Surveyed);
        assert!(!msg.raim);
        assert_eq!(
            msg.communication_state,
            CommunicationState::Sotdma(Sotdma {
                sync_state: SyncState::UtcDirect,
                slot_timeout: 4,
                sub_message: SotdmaSubMessage::SlotNumber(1503),
            })
        );
    }

    #[test]
    fn test_type11_shares_layout() {
        // Same bits as the type 4 report with the discriminant rewritten to 11.
        let frame = Frame::from_payload("403OviQuMGCqWrRO9>E6fE700@GO", 0).unwrap();
        let mut bits = format!("{:06b}", 11);
        bits.push_str(&frame.bits.to_string()[6..]);
        let frame = Frame::from_bits(BitView::from_bit_str(&bits).unwrap());

        let msg = decode_base_station_report(&frame).unwrap();
        assert_eq!(msg.header.message_type, 11);
        assert_eq!(msg.year, 2007);
    }

    #[test]
    fn test_type10_inquiry() {
        let frame = Frame::from_payload(":5MlU41GMK6@", 0).unwrap();
        let msg = decode_utc_inquiry(&frame).unwrap();
        assert_eq!(msg.header.mmsi, 366814480);
        assert_eq!(msg.destination_mmsi, 366832740);
    }

    #[test]
    fn test_type10_wrong_length() {
        let frame = Frame::from_payload(":5MlU41GMK6@0", 0).unwrap();
        assert!(matches!(
            decode_utc_inquiry(&frame),
            Err(AisError::InvalidFrame { message_type: 10, .. })
        ));
    }
}
