//! Shared types, error enum, and message-type metadata for ais-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by ais-core.
#[derive(Debug, Error)]
pub enum AisError {
    #[error("malformed sentence: {0}")]
    MalformedSentence(String),
    #[error("checksum mismatch: expected {expected:02X}, got {actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("unsupported sentence carrier: {0}")]
    UnsupportedCarrier(String),
    #[error("invalid armored character: {0:?}")]
    InvalidCharacter(char),
    #[error("invalid fill bit count: {0}")]
    InvalidFillBits(u8),
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(u8),
    #[error("invalid frame for message type {message_type}: {reason}")]
    InvalidFrame { message_type: u8, reason: String },
    #[error("malformed tag block: {0}")]
    MalformedTagBlock(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AisError>;

// ---------------------------------------------------------------------------
// Message type metadata
// ---------------------------------------------------------------------------

/// Metadata for a top-level message type.
///
/// `min_bits == max_bits` marks a fixed-length layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgInfo {
    pub name: &'static str,
    pub min_bits: usize,
    pub max_bits: usize,
}

impl MsgInfo {
    pub fn is_fixed_length(&self) -> bool {
        self.min_bits == self.max_bits
    }
}

const fn info(name: &'static str, min_bits: usize, max_bits: usize) -> MsgInfo {
    MsgInfo {
        name,
        min_bits,
        max_bits,
    }
}

/// Known message type table, indexed by discriminant.
pub const MSG_TABLE: &[(u8, MsgInfo)] = &[
    (1, info("Position report class A (scheduled)", 168, 168)),
    (2, info("Position report class A (assigned schedule)", 168, 168)),
    (3, info("Position report class A (response to interrogation)", 168, 168)),
    (4, info("Base station report", 168, 168)),
    // Some encoders drop the trailing DTE + spare bits.
    (5, info("Static and voyage related data", 420, 424)),
    (6, info("Binary addressed message", 88, 1008)),
    (7, info("Binary acknowledge", 72, 168)),
    (8, info("Binary broadcast message", 56, 1008)),
    (9, info("Standard SAR aircraft position report", 168, 168)),
    (10, info("UTC and date inquiry", 72, 72)),
    (11, info("UTC and date response", 168, 168)),
    (12, info("Addressed safety related message", 72, 1008)),
    (13, info("Safety related acknowledge", 72, 168)),
    (14, info("Safety related broadcast message", 40, 1008)),
    (15, info("Interrogation", 88, 160)),
    (16, info("Assigned mode command", 96, 144)),
    (17, info("DGNSS binary broadcast message", 80, 816)),
    (18, info("Standard class B CS position report", 168, 168)),
    (19, info("Extended class B equipment position report", 312, 312)),
    (20, info("Data link management", 72, 160)),
    (21, info("Aid-to-navigation report", 272, 360)),
    (22, info("Channel management", 168, 168)),
    (23, info("Group assignment command", 160, 160)),
    // Part A is 160 bits; many transponders pad it to 168.
    (24, info("Static data report", 160, 168)),
    (25, info("Single slot binary message", 40, 168)),
    (26, info("Multiple slot binary message", 60, 1064)),
    (27, info("Long range AIS broadcast message", 96, 96)),
];

/// Look up message-type metadata. Returns `None` for codes outside 1..=27.
pub fn msg_info(code: u8) -> Option<&'static MsgInfo> {
    MSG_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, info)| info)
}

/// Top-level AIS message discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageType {
    PositionReportClassAScheduled = 1,
    PositionReportClassAAssigned = 2,
    PositionReportClassAResponse = 3,
    BaseStationReport = 4,
    ShipAndVoyageData = 5,
    AddressedBinary = 6,
    BinaryAcknowledge = 7,
    BinaryBroadcast = 8,
    SarAircraftPositionReport = 9,
    UtcAndDateInquiry = 10,
    UtcAndDateResponse = 11,
    AddressedSafetyRelated = 12,
    SafetyRelatedAcknowledge = 13,
    SafetyRelatedBroadcast = 14,
    Interrogation = 15,
    AssignedModeCommand = 16,
    GnssBinaryBroadcast = 17,
    StandardClassBPositionReport = 18,
    ExtendedClassBPositionReport = 19,
    DataLinkManagement = 20,
    AidToNavigationReport = 21,
    ChannelManagement = 22,
    GroupAssignmentCommand = 23,
    StaticDataReport = 24,
    SingleSlotBinary = 25,
    MultipleSlotBinary = 26,
    LongRangeBroadcast = 27,
}

impl MessageType {
    /// Every message type in discriminant order.
    pub const ALL: [MessageType; 27] = [
        MessageType::PositionReportClassAScheduled,
        MessageType::PositionReportClassAAssigned,
        MessageType::PositionReportClassAResponse,
        MessageType::BaseStationReport,
        MessageType::ShipAndVoyageData,
        MessageType::AddressedBinary,
        MessageType::BinaryAcknowledge,
        MessageType::BinaryBroadcast,
        MessageType::SarAircraftPositionReport,
        MessageType::UtcAndDateInquiry,
        MessageType::UtcAndDateResponse,
        MessageType::AddressedSafetyRelated,
        MessageType::SafetyRelatedAcknowledge,
        MessageType::SafetyRelatedBroadcast,
        MessageType::Interrogation,
        MessageType::AssignedModeCommand,
        MessageType::GnssBinaryBroadcast,
        MessageType::StandardClassBPositionReport,
        MessageType::ExtendedClassBPositionReport,
        MessageType::DataLinkManagement,
        MessageType::AidToNavigationReport,
        MessageType::ChannelManagement,
        MessageType::GroupAssignmentCommand,
        MessageType::StaticDataReport,
        MessageType::SingleSlotBinary,
        MessageType::MultipleSlotBinary,
        MessageType::LongRangeBroadcast,
    ];

    /// Map a 6-bit discriminant onto a message type.
    pub fn from_code(code: u8) -> Result<MessageType> {
        match code {
            1..=27 => Ok(Self::ALL[code as usize - 1]),
            _ => Err(AisError::UnsupportedMessageType(code)),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn info(self) -> &'static MsgInfo {
        // Every variant has a table row.
        &MSG_TABLE[self as usize - 1].1
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

// ---------------------------------------------------------------------------
// Shared header
// ---------------------------------------------------------------------------

/// Fields common to every message: bits 0-37.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub message_type: u8,
    pub repeat_indicator: u8,
    pub mmsi: u32,
}

// ---------------------------------------------------------------------------
// Coded enumerations
// ---------------------------------------------------------------------------

/// Navigation status, 4 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationStatus {
    UnderwayUsingEngine,
    AtAnchor,
    NotUnderCommand,
    RestrictedManoeuverability,
    ConstrainedByHerDraught,
    Moored,
    Aground,
    EngagedInFishing,
    UnderwaySailing,
    PowerDrivenTowingAstern,
    PowerDrivenPushingAhead,
    AisSartActive,
    Undefined,
    Reserved(u8),
}

impl NavigationStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => NavigationStatus::UnderwayUsingEngine,
            1 => NavigationStatus::AtAnchor,
            2 => NavigationStatus::NotUnderCommand,
            3 => NavigationStatus::RestrictedManoeuverability,
            4 => NavigationStatus::ConstrainedByHerDraught,
            5 => NavigationStatus::Moored,
            6 => NavigationStatus::Aground,
            7 => NavigationStatus::EngagedInFishing,
            8 => NavigationStatus::UnderwaySailing,
            11 => NavigationStatus::PowerDrivenTowingAstern,
            12 => NavigationStatus::PowerDrivenPushingAhead,
            14 => NavigationStatus::AisSartActive,
            15 => NavigationStatus::Undefined,
            other => NavigationStatus::Reserved(other),
        }
    }
}

/// Special manoeuvre indicator, 2 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManeuverIndicator {
    NotAvailable,
    NoSpecialManeuver,
    SpecialManeuver,
    Reserved,
}

impl ManeuverIndicator {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ManeuverIndicator::NotAvailable,
            1 => ManeuverIndicator::NoSpecialManeuver,
            2 => ManeuverIndicator::SpecialManeuver,
            _ => ManeuverIndicator::Reserved,
        }
    }
}

/// Electronic position fixing device (EPFD), 4 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionFixingDevice {
    Undefined,
    Gps,
    Glonass,
    CombinedGpsGlonass,
    LoranC,
    Chayka,
    IntegratedNavigationSystem,
    Surveyed,
    Galileo,
    InternalGnss,
    Reserved(u8),
}

impl PositionFixingDevice {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => PositionFixingDevice::Undefined,
            1 => PositionFixingDevice::Gps,
            2 => PositionFixingDevice::Glonass,
            3 => PositionFixingDevice::CombinedGpsGlonass,
            4 => PositionFixingDevice::LoranC,
            5 => PositionFixingDevice::Chayka,
            6 => PositionFixingDevice::IntegratedNavigationSystem,
            7 => PositionFixingDevice::Surveyed,
            8 => PositionFixingDevice::Galileo,
            15 => PositionFixingDevice::InternalGnss,
            other => PositionFixingDevice::Reserved(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
