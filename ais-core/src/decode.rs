//! Decode reassembled frames into typed AIS messages.
//!
//! The first 6 bits of a frame select one of 27 message types:
//! - 1-3:    Class A position report (3 carries ITDMA)
//! - 4, 11:  Base station report / UTC response
//! - 5, 24:  Static and voyage data (class A / class B)
//! - 6, 8:   Binary addressed / broadcast, with DAC/FI sub-dispatch
//! - 7, 13:  Binary / safety acknowledge
//! - 9:      SAR aircraft position
//! - 10:     UTC inquiry
//! - 12, 14: Safety related text
//! - 15, 16, 20, 22, 23: Link management
//! - 17:     DGNSS corrections
//! - 18, 19: Class B position reports
//! - 21:     Aid-to-navigation report
//! - 25, 26: Single / multiple slot binary
//! - 27:     Long range broadcast

use serde::Serialize;

use crate::aton::*;
use crate::binary::*;
use crate::fields::{LAT_NOT_AVAILABLE, LON_NOT_AVAILABLE};
use crate::frame::Frame;
use crate::link::*;
use crate::position::*;
use crate::safety::*;
use crate::station::*;
use crate::types::*;
use crate::voyage::*;

/// Any decoded AIS message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    PositionReport(PositionReport),
    BaseStationReport(BaseStationReport),
    ShipStaticData(ShipStaticData),
    AddressedBinary(AddressedBinaryMessage),
    BinaryAcknowledge(Acknowledge),
    BinaryBroadcast(BinaryBroadcastMessage),
    SarAircraftPosition(SarAircraftPositionReport),
    UtcDateInquiry(UtcDateInquiry),
    UtcDateResponse(BaseStationReport),
    AddressedSafety(AddressedSafetyMessage),
    SafetyAcknowledge(Acknowledge),
    SafetyBroadcast(SafetyBroadcastMessage),
    Interrogation(Interrogation),
    AssignedModeCommand(AssignedModeCommand),
    GnssBroadcast(GnssBroadcast),
    ClassBPosition(ClassBPositionReport),
    ExtendedClassBPosition(ExtendedClassBPositionReport),
    DataLinkManagement(DataLinkManagement),
    AidToNavigation(AidToNavigationReport),
    ChannelManagement(ChannelManagement),
    GroupAssignment(GroupAssignmentCommand),
    StaticDataReport(StaticDataReport),
    SingleSlotBinary(SingleSlotBinaryMessage),
    MultipleSlotBinary(MultipleSlotBinaryMessage),
    LongRangeBroadcast(LongRangeBroadcast),
}

impl Message {
    pub fn header(&self) -> &Header {
        match self {
            Message::PositionReport(m) => &m.header,
            Message::BaseStationReport(m) | Message::UtcDateResponse(m) => &m.header,
            Message::ShipStaticData(m) => &m.header,
            Message::AddressedBinary(m) => &m.header,
            Message::BinaryAcknowledge(m) | Message::SafetyAcknowledge(m) => &m.header,
            Message::BinaryBroadcast(m) => &m.header,
            Message::SarAircraftPosition(m) => &m.header,
            Message::UtcDateInquiry(m) => &m.header,
            Message::AddressedSafety(m) => &m.header,
            Message::SafetyBroadcast(m) => &m.header,
            Message::Interrogation(m) => &m.header,
            Message::AssignedModeCommand(m) => &m.header,
            Message::GnssBroadcast(m) => &m.header,
            Message::ClassBPosition(m) => &m.header,
            Message::ExtendedClassBPosition(m) => &m.header,
            Message::DataLinkManagement(m) => &m.header,
            Message::AidToNavigation(m) => &m.header,
            Message::ChannelManagement(m) => &m.header,
            Message::GroupAssignment(m) => &m.header,
            Message::StaticDataReport(m) => &m.header,
            Message::SingleSlotBinary(m) => &m.header,
            Message::MultipleSlotBinary(m) => &m.header,
            Message::LongRangeBroadcast(m) => &m.header,
        }
    }

    /// Raw 6-bit message type.
    pub fn message_type(&self) -> u8 {
        self.header().message_type
    }

    pub fn mmsi(&self) -> u32 {
        self.header().mmsi
    }

    pub fn repeat_indicator(&self) -> u8 {
        self.header().repeat_indicator
    }

    /// Reported (longitude, latitude), if this message carries one and it
    /// is not the "not available" sentinel.
    pub fn position(&self) -> Option<(f64, f64)> {
        let (lon, lat) = match self {
            Message::PositionReport(m) => (m.longitude, m.latitude),
            Message::BaseStationReport(m) | Message::UtcDateResponse(m) => {
                (m.longitude, m.latitude)
            }
            Message::SarAircraftPosition(m) => (m.longitude, m.latitude),
            Message::GnssBroadcast(m) => (m.longitude, m.latitude),
            Message::ClassBPosition(m) => (m.longitude, m.latitude),
            Message::ExtendedClassBPosition(m) => (m.longitude, m.latitude),
            Message::AidToNavigation(m) => (m.longitude, m.latitude),
            Message::LongRangeBroadcast(m) => (m.longitude, m.latitude),
            _ => return None,
        };
        if lon == LON_NOT_AVAILABLE || lat == LAT_NOT_AVAILABLE {
            return None;
        }
        Some((lon, lat))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Per-type decode function.
pub type Decoder = fn(&Frame) -> Result<Message>;

/// Decoder for each message type. Exhaustive over [`MessageType`].
pub fn decoder_for(kind: MessageType) -> Decoder {
    use crate::types::MessageType as K;

    match kind {
        K::PositionReportClassAScheduled | K::PositionReportClassAAssigned
        | K::PositionReportClassAResponse => {
            |f| decode_position_report(f).map(Message::PositionReport)
        }
        K::BaseStationReport => |f| decode_base_station_report(f).map(Message::BaseStationReport),
        K::ShipAndVoyageData => |f| decode_ship_static_data(f).map(Message::ShipStaticData),
        K::AddressedBinary => |f| decode_addressed_binary(f).map(Message::AddressedBinary),
        K::BinaryAcknowledge => |f| decode_acknowledge(f).map(Message::BinaryAcknowledge),
        K::BinaryBroadcast => |f| decode_binary_broadcast(f).map(Message::BinaryBroadcast),
        K::SarAircraftPositionReport => {
            |f| decode_sar_aircraft_position(f).map(Message::SarAircraftPosition)
        }
        K::UtcAndDateInquiry => |f| decode_utc_inquiry(f).map(Message::UtcDateInquiry),
        K::UtcAndDateResponse => |f| decode_base_station_report(f).map(Message::UtcDateResponse),
        K::AddressedSafetyRelated => |f| decode_addressed_safety(f).map(Message::AddressedSafety),
        K::SafetyRelatedAcknowledge => |f| decode_acknowledge(f).map(Message::SafetyAcknowledge),
        K::SafetyRelatedBroadcast => |f| decode_safety_broadcast(f).map(Message::SafetyBroadcast),
        K::Interrogation => |f| decode_interrogation(f).map(Message::Interrogation),
        K::AssignedModeCommand => {
            |f| decode_assigned_mode_command(f).map(Message::AssignedModeCommand)
        }
        K::GnssBinaryBroadcast => |f| decode_gnss_broadcast(f).map(Message::GnssBroadcast),
        K::StandardClassBPositionReport => {
            |f| decode_class_b_position(f).map(Message::ClassBPosition)
        }
        K::ExtendedClassBPositionReport => {
            |f| decode_extended_class_b_position(f).map(Message::ExtendedClassBPosition)
        }
        K::DataLinkManagement => {
            |f| decode_data_link_management(f).map(Message::DataLinkManagement)
        }
        K::AidToNavigationReport => |f| decode_aid_to_navigation(f).map(Message::AidToNavigation),
        K::ChannelManagement => |f| decode_channel_management(f).map(Message::ChannelManagement),
        K::GroupAssignmentCommand => |f| decode_group_assignment(f).map(Message::GroupAssignment),
        K::StaticDataReport => |f| decode_static_data_report(f).map(Message::StaticDataReport),
        K::SingleSlotBinary => |f| decode_single_slot_binary(f).map(Message::SingleSlotBinary),
        K::MultipleSlotBinary => {
            |f| decode_multiple_slot_binary(f).map(Message::MultipleSlotBinary)
        }
        K::LongRangeBroadcast => |f| decode_long_range_broadcast(f).map(Message::LongRangeBroadcast),
    }
}

/// Decode a frame. Fails with `UnsupportedMessageType` for discriminants
/// outside 1..=27 and `InvalidFrame` when the length doesn't fit the type.
pub fn decode(frame: &Frame) -> Result<Message> {
    let kind = frame.message_type()?;
    decoder_for(kind)(frame)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
