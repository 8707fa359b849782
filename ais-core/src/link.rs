//! Data link and channel management: interrogation (15), assigned mode
//! command (16), data link management (20), channel management (22), and
//! group assignment (23).
//!
//! Types 15, 16 and 20 are variable length. Each optional group decodes
//! to `None` (or is left out) unless the frame is long enough to hold all
//! of it; partial groups are never read.

use serde::Serialize;

use crate::fields::check_position;
use crate::frame::Frame;
use crate::position::LOW_RES;
use crate::types::*;

// ---------------------------------------------------------------------------
// Interrogation (15)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterrogationRequest {
    /// Message type being requested.
    pub message_type: u8,
    pub slot_offset: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterrogatedStation {
    pub mmsi: u32,
    pub first: InterrogationRequest,
    pub second: Option<InterrogationRequest>,
}

/// Type 15: request for specific messages from one or two stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interrogation {
    #[serde(flatten)]
    pub header: Header,
    pub station_1: InterrogatedStation,
    pub station_2: Option<InterrogatedStation>,
}

pub fn decode_interrogation(frame: &Frame) -> Result<Interrogation> {
    frame.ensure(MessageType::Interrogation)?;
    let b = &frame.bits;
    let len = b.len();

    let request = |start: usize| InterrogationRequest {
        message_type: b.unsigned(start..start + 6) as u8,
        slot_offset: b.unsigned(start + 6..start + 18) as u16,
    };

    let station_1 = InterrogatedStation {
        mmsi: b.unsigned(40..70) as u32,
        first: request(70),
        second: (len >= 108).then(|| request(90)),
    };
    let station_2 = (len >= 158).then(|| InterrogatedStation {
        mmsi: b.unsigned(110..140) as u32,
        first: request(140),
        second: None,
    });

    Ok(Interrogation {
        header: frame.header(),
        station_1,
        station_2,
    })
}

// ---------------------------------------------------------------------------
// Assigned mode command (16)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotAssignment {
    pub destination_mmsi: u32,
    pub offset: u16,
    pub increment: u16,
}

/// Type 16: base station assigns a reporting schedule to one or two stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedModeCommand {
    #[serde(flatten)]
    pub header: Header,
    pub assignment_a: SlotAssignment,
    pub assignment_b: Option<SlotAssignment>,
}

pub fn decode_assigned_mode_command(frame: &Frame) -> Result<AssignedModeCommand> {
    frame.ensure(MessageType::AssignedModeCommand)?;
    let b = &frame.bits;

    let assignment = |start: usize| SlotAssignment {
        destination_mmsi: b.unsigned(start..start + 30) as u32,
        offset: b.unsigned(start + 30..start + 42) as u16,
        increment: b.unsigned(start + 42..start + 52) as u16,
    };

    Ok(AssignedModeCommand {
        header: frame.header(),
        assignment_a: assignment(40),
        assignment_b: (b.len() >= 144).then(|| assignment(92)),
    })
}

// ---------------------------------------------------------------------------
// Data link management (20)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotReservation {
    pub offset: u16,
    pub number_of_slots: u8,
    /// Minutes.
    pub timeout: u8,
    pub increment: u16,
}

/// Type 20: up to four slot reservations by a base station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataLinkManagement {
    #[serde(flatten)]
    pub header: Header,
    pub reservations: Vec<SlotReservation>,
}

const RESERVATION_BITS: usize = 30;

pub fn decode_data_link_management(frame: &Frame) -> Result<DataLinkManagement> {
    frame.ensure(MessageType::DataLinkManagement)?;
    let b = &frame.bits;

    let reservations = (0..4)
        .map(|i| 40 + i * RESERVATION_BITS)
        .take_while(|&start| b.len() >= start + RESERVATION_BITS)
        .map(|start| SlotReservation {
            offset: b.unsigned(start..start + 12) as u16,
            number_of_slots: b.unsigned(start + 12..start + 16) as u8,
            timeout: b.unsigned(start + 16..start + 19) as u8,
            increment: b.unsigned(start + 19..start + 30) as u16,
        })
        .collect();

    Ok(DataLinkManagement {
        header: frame.header(),
        reservations,
    })
}

// ---------------------------------------------------------------------------
// Channel management (22)
// ---------------------------------------------------------------------------

/// Type 22 applies either to a rectangular area or to two stations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ChannelManagementTarget {
    Area {
        ne_longitude: f64,
        ne_latitude: f64,
        sw_longitude: f64,
        sw_latitude: f64,
    },
    Addressed {
        destination_mmsi_1: u32,
        destination_mmsi_2: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelManagement {
    #[serde(flatten)]
    pub header: Header,
    pub channel_a: u16,
    pub channel_b: u16,
    pub tx_rx_mode: u8,
    /// True for low power.
    pub power: bool,
    pub target: ChannelManagementTarget,
    /// True for 12.5 kHz bandwidth.
    pub channel_a_band: bool,
    pub channel_b_band: bool,
    /// Transitional zone size in nautical miles minus one.
    pub zone_size: u8,
}

pub fn decode_channel_management(frame: &Frame) -> Result<ChannelManagement> {
    frame.ensure(MessageType::ChannelManagement)?;
    let b = &frame.bits;
    let header = frame.header();

    let target = if b.flag(139) {
        ChannelManagementTarget::Addressed {
            destination_mmsi_1: b.unsigned(69..99) as u32,
            destination_mmsi_2: b.unsigned(104..134) as u32,
        }
    } else {
        let (ne_longitude, ne_latitude) = (b.scaled(69..87, LOW_RES), b.scaled(87..104, LOW_RES));
        let (sw_longitude, sw_latitude) = (b.scaled(104..122, LOW_RES), b.scaled(122..139, LOW_RES));
        check_position(header.mmsi, ne_longitude, ne_latitude);
        check_position(header.mmsi, sw_longitude, sw_latitude);
        ChannelManagementTarget::Area {
            ne_longitude,
            ne_latitude,
            sw_longitude,
            sw_latitude,
        }
    };

    Ok(ChannelManagement {
        header,
        channel_a: b.unsigned(40..52) as u16,
        channel_b: b.unsigned(52..64) as u16,
        tx_rx_mode: b.unsigned(64..68) as u8,
        power: b.flag(68),
        target,
        channel_a_band: b.flag(140),
        channel_b_band: b.flag(141),
        zone_size: b.unsigned(142..145) as u8,
    })
}

// ---------------------------------------------------------------------------
// Group assignment (23)
// ---------------------------------------------------------------------------

/// Type 23: assigns reporting behaviour to every station of a given kind
/// inside an area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAssignmentCommand {
    #[serde(flatten)]
    pub header: Header,
    pub ne_longitude: f64,
    pub ne_latitude: f64,
    pub sw_longitude: f64,
    pub sw_latitude: f64,
    pub station_type: u8,
    pub ship_type: u8,
    pub tx_rx_mode: u8,
    pub report_interval: u8,
    /// Minutes; 0 = none.
    pub quiet_time: u8,
}

pub fn decode_group_assignment(frame: &Frame) -> Result<GroupAssignmentCommand> {
    frame.ensure(MessageType::GroupAssignmentCommand)?;
    let b = &frame.bits;
    let header = frame.header();

    let msg = GroupAssignmentCommand {
        header,
        ne_longitude: b.scaled(40..58, LOW_RES),
        ne_latitude: b.scaled(58..75, LOW_RES),
        sw_longitude: b.scaled(75..93, LOW_RES),
        sw_latitude: b.scaled(93..110, LOW_RES),
        station_type: b.unsigned(110..114) as u8,
        ship_type: b.unsigned(114..122) as u8,
        tx_rx_mode: b.unsigned(144..146) as u8,
        report_interval: b.unsigned(146..150) as u8,
        quiet_time: b.unsigned(150..154) as u8,
    };
    check_position(header.mmsi, msg.ne_longitude, msg.ne_latitude);
    check_position(header.mmsi, msg.sw_longitude, msg.sw_latitude);
    Ok(msg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitView;

    fn frame(payload: &str, fill: u8) -> Frame {
        Frame::from_payload(payload, fill).expect("valid payload")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_type15_one_station_two_requests() {
        let msg = decode_interrogation(&frame("?h3Ovn1GP<K0<P@59a0", 2)).unwrap();
        assert_eq!(msg.header.repeat_indicator, 3);
        assert_eq!(msg.header.mmsi, 3669720);
        assert_eq!(msg.station_1.mmsi, 367014320);
        assert_eq!(
            msg.station_1.first,
            InterrogationRequest {
                message_type: 3,
                slot_offset: 516
            }
        );
        assert_eq!(
            msg.station_1.second,
            Some(InterrogationRequest {
                message_type: 5,
                slot_offset: 617
            })
        );
        assert_eq!(msg.station_2, None);
    }

    #[test]
    fn test_type15_minimum_length() {
        let f = frame("?h3Ovn1GP<K0<P@59a0", 2);
        let short = Frame::from_bits(f.bits.bits(0, 88));
        let msg = decode_interrogation(&short).unwrap();
        assert_eq!(msg.station_1.first.message_type, 3);
        assert_eq!(msg.station_1.second, None);
    }

    #[test]
    fn test_type15_two_stations() {
        let s = format!(
            "{:06b}{:02b}{:030b}{:02b}{:030b}{:06b}{:012b}{:02b}{:06b}{:012b}{:02b}{:030b}{:06b}{:012b}{:02b}",
            15, 0, 3669720, 0, 111, 5, 10, 0, 0, 0, 0, 222, 24, 20, 0
        );
        let frame = Frame::from_bits(BitView::from_bit_str(&s).unwrap());
        assert_eq!(frame.len(), 160);
        let msg = decode_interrogation(&frame).unwrap();
        let station_2 = msg.station_2.expect("second station");
        assert_eq!(station_2.mmsi, 222);
        assert_eq!(station_2.first.message_type, 24);
        assert_eq!(station_2.first.slot_offset, 20);
    }

    #[test]
    fn test_type16_single_assignment() {
        let msg = decode_assigned_mode_command(&frame("@01uEO@mMk7P<P00", 0)).unwrap();
        assert_eq!(msg.header.mmsi, 2053501);
        assert_eq!(
            msg.assignment_a,
            SlotAssignment {
                destination_mmsi: 224251000,
                offset: 200,
                increment: 0
            }
        );
        assert_eq!(msg.assignment_b, None);
    }

    #[test]
    fn test_type16_two_assignments() {
        let s = format!(
            "{:06b}{:02b}{:030b}{:02b}{:030b}{:012b}{:010b}{:030b}{:012b}{:010b}",
            16, 0, 2053501, 0, 1, 2, 3, 4, 5, 6
        );
        let frame = Frame::from_bits(BitView::from_bit_str(&s).unwrap());
        assert_eq!(frame.len(), 144);
        let msg = decode_assigned_mode_command(&frame).unwrap();
        assert_eq!(
            msg.assignment_b,
            Some(SlotAssignment {
                destination_mmsi: 4,
                offset: 5,
                increment: 6
            })
        );
    }

    #[test]
    fn test_type20_one_reservation() {
        let msg = decode_data_link_management(&frame("Dh3Ovk1UAN>4", 0)).unwrap();
        assert_eq!(msg.header.mmsi, 3669708);
        assert_eq!(
            msg.reservations,
            vec![SlotReservation {
                offset: 1620,
                number_of_slots: 5,
                timeout: 7,
                increment: 225
            }]
        );
    }

    #[test]
    fn test_type20_partial_block_ignored() {
        // Two full blocks and part of a third.
        let mut s = format!("{:06b}{:02b}{:030b}{:02b}", 20, 0, 3669708, 0);
        s += &"0".repeat(60 + 20);
        let frame = Frame::from_bits(BitView::from_bit_str(&s).unwrap());
        let msg = decode_data_link_management(&frame).unwrap();
        assert_eq!(msg.reservations.len(), 2);
    }

    #[test]
    fn test_type22_area() {
        let msg = decode_channel_management(&frame("F030p:j2N2P5aJR0r;6f3rj10000", 0)).unwrap();
        assert_eq!(msg.header.mmsi, 3160107);
        assert_eq!((msg.channel_a, msg.channel_b), (2087, 2088));
        assert!(!msg.power);
        match msg.target {
            ChannelManagementTarget::Area {
                ne_longitude,
                ne_latitude,
                sw_longitude,
                sw_latitude,
            } => {
                assert!(approx(ne_longitude, -128.5));
                assert!(approx(ne_latitude, 55.0));
                assert!(approx(sw_longitude, -133.66666666666666));
                assert!(approx(sw_latitude, 53.5));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(msg.zone_size, 2);
    }

    #[test]
    fn test_type22_addressed() {
        let mut s = format!(
            "{:06b}{:02b}{:030b}{:02b}{:012b}{:012b}{:04b}{}",
            22, 0, 3160107, 0, 2087, 2088, 0, 0
        );
        s += &format!("{:030b}{:05b}{:030b}{:05b}", 244000001, 0, 244000002, 0);
        s += "1";
        s += &"0".repeat(168 - 140);
        let frame = Frame::from_bits(BitView::from_bit_str(&s).unwrap());
        let msg = decode_channel_management(&frame).unwrap();
        assert_eq!(
            msg.target,
            ChannelManagementTarget::Addressed {
                destination_mmsi_1: 244000001,
                destination_mmsi_2: 244000002,
            }
        );
    }

    #[test]
    fn test_type23_group_assignment() {
        let msg = decode_group_assignment(&frame("G02:Kn01R`sn@291nj600000900", 2)).unwrap();
        assert_eq!(msg.header.mmsi, 2268120);
        assert!(approx(msg.ne_longitude, 2.63));
        assert!(approx(msg.ne_latitude, 51.07));
        assert!(approx(msg.sw_longitude, 1.8266666666666667));
        assert!(approx(msg.sw_latitude, 50.68));
        assert_eq!(msg.station_type, 6);
        assert_eq!(msg.ship_type, 0);
        assert_eq!(msg.report_interval, 9);
        assert_eq!(msg.quiet_time, 0);
    }
}
