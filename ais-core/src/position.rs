//! Position reports: class A (1/2/3), SAR aircraft (9), class B (18/19),
//! and long-range broadcast (27).

use serde::Serialize;

use crate::commstate::CommunicationState;
use crate::fields::{
    check_course, check_heading, check_position, check_range, check_second, check_speed,
    Dimensions,
};
use crate::frame::Frame;
use crate::types::*;

/// Lat/lon scale for 1/10000 minute resolution.
pub(crate) const HIGH_RES: f64 = 600_000.0;
/// Lat/lon scale for 1/10 minute resolution.
pub(crate) const LOW_RES: f64 = 600.0;

// ---------------------------------------------------------------------------
// Class A
// ---------------------------------------------------------------------------

/// Types 1, 2, 3: class A position report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    #[serde(flatten)]
    pub header: Header,
    pub navigation_status: NavigationStatus,
    /// Raw ROT_AIS indicator, see [`PositionReport::rate_of_turn_deg_per_min`].
    pub rate_of_turn: i8,
    pub speed_over_ground: f64,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course_over_ground: f64,
    pub true_heading: u16,
    pub timestamp: u8,
    pub maneuver: ManeuverIndicator,
    pub raim: bool,
    pub communication_state: CommunicationState,
}

impl PositionReport {
    /// Rate of turn in degrees/minute. `None` when not available or when
    /// only the turn direction is known (±127).
    pub fn rate_of_turn_deg_per_min(&self) -> Option<f64> {
        match self.rate_of_turn {
            -128 | -127 | 127 => None,
            r => {
                let v = (r as f64 / 4.733).powi(2);
                Some(if r < 0 { -v } else { v })
            }
        }
    }
}

/// Decode types 1, 2, 3. Type 3 carries ITDMA, the others SOTDMA.
pub fn decode_position_report(frame: &Frame) -> Result<PositionReport> {
    let kind = match frame.message_code() {
        1 => MessageType::PositionReportClassAScheduled,
        2 => MessageType::PositionReportClassAAssigned,
        3 => MessageType::PositionReportClassAResponse,
        code => {
            return Err(AisError::InvalidFrame {
                message_type: code,
                reason: "not a class A position report".into(),
            })
        }
    };
    frame.ensure(kind)?;

    let b = &frame.bits;
    let header = frame.header();
    let mmsi = header.mmsi;

    let msg = PositionReport {
        header,
        navigation_status: NavigationStatus::from_code(b.unsigned(38..42) as u8),
        rate_of_turn: b.signed(42..50) as i8,
        speed_over_ground: b.scaled_unsigned(50..60, 10.0),
        position_accuracy: b.flag(60),
        longitude: b.scaled(61..89, HIGH_RES),
        latitude: b.scaled(89..116, HIGH_RES),
        course_over_ground: b.scaled_unsigned(116..128, 10.0),
        true_heading: b.unsigned(128..137) as u16,
        timestamp: b.unsigned(137..143) as u8,
        maneuver: ManeuverIndicator::from_code(b.unsigned(143..145) as u8),
        raim: b.flag(148),
        communication_state: CommunicationState::decode(
            b,
            149,
            kind == MessageType::PositionReportClassAResponse,
        ),
    };

    check_speed(mmsi, msg.speed_over_ground);
    check_position(mmsi, msg.longitude, msg.latitude);
    check_course(mmsi, msg.course_over_ground);
    check_heading(mmsi, msg.true_heading);
    check_second(mmsi, msg.timestamp);

    Ok(msg)
}

// ---------------------------------------------------------------------------
// SAR aircraft
// ---------------------------------------------------------------------------

/// Type 9: standard SAR aircraft position report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarAircraftPositionReport {
    #[serde(flatten)]
    pub header: Header,
    /// Metres; 4095 = not available.
    pub altitude: u16,
    /// Knots, 1 kn resolution; 1023 = not available.
    pub speed_over_ground: u16,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course_over_ground: f64,
    pub timestamp: u8,
    pub regional_reserved: u8,
    pub dte: bool,
    pub assigned: bool,
    pub raim: bool,
    pub communication_state: CommunicationState,
}

pub fn decode_sar_aircraft_position(frame: &Frame) -> Result<SarAircraftPositionReport> {
    frame.ensure(MessageType::SarAircraftPositionReport)?;

    let b = &frame.bits;
    let header = frame.header();

    let msg = SarAircraftPositionReport {
        header,
        altitude: b.unsigned(38..50) as u16,
        speed_over_ground: b.unsigned(50..60) as u16,
        position_accuracy: b.flag(60),
        longitude: b.scaled(61..89, HIGH_RES),
        latitude: b.scaled(89..116, HIGH_RES),
        course_over_ground: b.scaled_unsigned(116..128, 10.0),
        timestamp: b.unsigned(128..134) as u8,
        regional_reserved: b.unsigned(134..142) as u8,
        dte: b.flag(142),
        assigned: b.flag(146),
        raim: b.flag(147),
        communication_state: CommunicationState::decode(b, 149, b.flag(148)),
    };

    check_position(header.mmsi, msg.longitude, msg.latitude);
    check_course(header.mmsi, msg.course_over_ground);

    Ok(msg)
}

// ---------------------------------------------------------------------------
// Class B
// ---------------------------------------------------------------------------

/// Type 18: standard class B CS position report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassBPositionReport {
    #[serde(flatten)]
    pub header: Header,
    pub regional_reserved: u8,
    pub speed_over_ground: f64,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course_over_ground: f64,
    pub true_heading: u16,
    pub timestamp: u8,
    pub regional_reserved_2: u8,
    /// True for a CS (carrier sense) unit, false for SOTDMA.
    pub cs_unit: bool,
    pub display: bool,
    pub dsc: bool,
    pub band: bool,
    pub accepts_message_22: bool,
    pub assigned: bool,
    pub raim: bool,
    pub communication_state: CommunicationState,
}

pub fn decode_class_b_position(frame: &Frame) -> Result<ClassBPositionReport> {
    frame.ensure(MessageType::StandardClassBPositionReport)?;

    let b = &frame.bits;
    let header = frame.header();
    let mmsi = header.mmsi;

    let msg = ClassBPositionReport {
        header,
        regional_reserved: b.unsigned(38..46) as u8,
        speed_over_ground: b.scaled_unsigned(46..56, 10.0),
        position_accuracy: b.flag(56),
        longitude: b.scaled(57..85, HIGH_RES),
        latitude: b.scaled(85..112, HIGH_RES),
        course_over_ground: b.scaled_unsigned(112..124, 10.0),
        true_heading: b.unsigned(124..133) as u16,
        timestamp: b.unsigned(133..139) as u8,
        regional_reserved_2: b.unsigned(139..141) as u8,
        cs_unit: b.flag(141),
        display: b.flag(142),
        dsc: b.flag(143),
        band: b.flag(144),
        accepts_message_22: b.flag(145),
        assigned: b.flag(146),
        raim: b.flag(147),
        communication_state: CommunicationState::decode(b, 149, b.flag(148)),
    };

    check_speed(mmsi, msg.speed_over_ground);
    check_position(mmsi, msg.longitude, msg.latitude);
    check_course(mmsi, msg.course_over_ground);
    check_heading(mmsi, msg.true_heading);
    check_second(mmsi, msg.timestamp);

    Ok(msg)
}

/// Type 19: extended class B equipment position report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedClassBPositionReport {
    #[serde(flatten)]
    pub header: Header,
    pub regional_reserved: u8,
    pub speed_over_ground: f64,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub course_over_ground: f64,
    pub true_heading: u16,
    pub timestamp: u8,
    pub regional_reserved_2: u8,
    pub ship_name: String,
    pub ship_type: u8,
    pub dimensions: Dimensions,
    pub position_fixing_device: PositionFixingDevice,
    pub raim: bool,
    pub dte: bool,
    pub assigned: bool,
}

pub fn decode_extended_class_b_position(frame: &Frame) -> Result<ExtendedClassBPositionReport> {
    frame.ensure(MessageType::ExtendedClassBPositionReport)?;

    let b = &frame.bits;
    let header = frame.header();
    let mmsi = header.mmsi;

    let msg = ExtendedClassBPositionReport {
        header,
        regional_reserved: b.unsigned(38..46) as u8,
        speed_over_ground: b.scaled_unsigned(46..56, 10.0),
        position_accuracy: b.flag(56),
        longitude: b.scaled(57..85, HIGH_RES),
        latitude: b.scaled(85..112, HIGH_RES),
        course_over_ground: b.scaled_unsigned(112..124, 10.0),
        true_heading: b.unsigned(124..133) as u16,
        timestamp: b.unsigned(133..139) as u8,
        regional_reserved_2: b.unsigned(139..143) as u8,
        ship_name: b.text(143..263),
        ship_type: b.unsigned(263..271) as u8,
        dimensions: Dimensions::decode(b, 271),
        position_fixing_device: PositionFixingDevice::from_code(b.unsigned(301..305) as u8),
        raim: b.flag(305),
        dte: b.flag(306),
        assigned: b.flag(307),
    };

    check_speed(mmsi, msg.speed_over_ground);
    check_position(mmsi, msg.longitude, msg.latitude);
    check_course(mmsi, msg.course_over_ground);
    check_heading(mmsi, msg.true_heading);

    Ok(msg)
}

// ---------------------------------------------------------------------------
// Long range
// ---------------------------------------------------------------------------

/// Type 27: long-range AIS broadcast (satellite reception).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRangeBroadcast {
    #[serde(flatten)]
    pub header: Header,
    pub position_accuracy: bool,
    pub raim: bool,
    pub navigation_status: NavigationStatus,
    pub longitude: f64,
    pub latitude: f64,
    /// Knots, 1 kn resolution; 63 = not available.
    pub speed_over_ground: u8,
    /// Degrees, 1° resolution; 511 = not available.
    pub course_over_ground: u16,
    /// False when the position is less than 5 seconds old.
    pub position_latency: bool,
}

pub fn decode_long_range_broadcast(frame: &Frame) -> Result<LongRangeBroadcast> {
    frame.ensure(MessageType::LongRangeBroadcast)?;

    let b = &frame.bits;
    let header = frame.header();

    let msg = LongRangeBroadcast {
        header,
        position_accuracy: b.flag(38),
        raim: b.flag(39),
        navigation_status: NavigationStatus::from_code(b.unsigned(40..44) as u8),
        longitude: b.scaled(44..62, LOW_RES),
        latitude: b.scaled(62..79, LOW_RES),
        speed_over_ground: b.unsigned(79..85) as u8,
        course_over_ground: b.unsigned(85..94) as u16,
        position_latency: b.flag(94),
    };

    check_position(header.mmsi, msg.longitude, msg.latitude);
    if msg.course_over_ground != 511 {
        check_range(header.mmsi, "course_over_ground", msg.course_over_ground, 0, 359);
    }

    Ok(msg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
