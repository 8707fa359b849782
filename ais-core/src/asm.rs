//! Application-specific messages carried by binary messages 6, 8, 25 and 26.
//!
//! The binary payload starts with a 10-bit designated area code (DAC) and a
//! 6-bit function identifier (FI). The pair selects a layout for the rest of
//! the payload; pairs without a known layout keep their raw bits.
//!
//! Supported (DAC, FI) pairs:
//! - (1, 14), (1, 32): tidal window
//! - (1, 16), (1, 40): number of persons on board
//! - (1, 18):          clearance time to enter port
//! - (1, 20):          berthing data
//! - (1, 27), (1, 28): route information (broadcast / addressed)
//! - (1, 29), (1, 30): text description (broadcast / addressed)
//! - (1, 31):          meteorological and hydrological data
//! - (200, 10):        inland ship static and voyage data

use serde::Serialize;
use tracing::debug;

use crate::bits::BitView;
use crate::fields::Eta;
use crate::position::HIGH_RES;

/// Lat/lon scale for 1/1000 minute resolution (25/24-bit positions).
const IMO_RES: f64 = 60_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "asm", rename_all = "snake_case")]
pub enum ApplicationSpecificMessage {
    TidalWindow(TidalWindow),
    PersonsOnBoard(PersonsOnBoard),
    ClearanceTime(ClearanceTime),
    BerthingData(BerthingData),
    RouteInformation(RouteInformation),
    TextDescription(TextDescription),
    MetHydro(MetHydroData),
    InlandShipData(InlandShipData),
    Unknown { dac: u16, fi: u8, data: BitView },
}

/// Decode the payload following a DAC/FI header.
pub fn decode_asm(dac: u16, fi: u8, data: &BitView) -> ApplicationSpecificMessage {
    use ApplicationSpecificMessage as Asm;

    let (msg, min_bits) = match (dac, fi) {
        (1, 14) => (Asm::TidalWindow(decode_tidal_window(data, true)), 9),
        (1, 32) => (Asm::TidalWindow(decode_tidal_window(data, false)), 9),
        (1, 16) | (1, 40) => (
            Asm::PersonsOnBoard(PersonsOnBoard {
                persons: data.unsigned(0..13) as u16,
            }),
            13,
        ),
        (1, 18) => (Asm::ClearanceTime(decode_clearance_time(data)), 229),
        (1, 20) => (Asm::BerthingData(decode_berthing_data(data)), 272),
        (1, 27) | (1, 28) => (Asm::RouteInformation(decode_route(data)), 61),
        (1, 29) | (1, 30) => (
            Asm::TextDescription(TextDescription {
                linkage_id: data.unsigned(0..10) as u16,
                text: data.text_to_end(10),
            }),
            10,
        ),
        (1, 31) => (Asm::MetHydro(decode_met_hydro(data)), 304),
        (200, 10) => (Asm::InlandShipData(decode_inland(data)), 104),
        _ => {
            return Asm::Unknown {
                dac,
                fi,
                data: data.clone(),
            }
        }
    };

    if data.len() < min_bits {
        debug!(
            dac,
            fi,
            len = data.len(),
            min_bits,
            "short application-specific payload, missing fields read as zero"
        );
    }
    msg
}

// ---------------------------------------------------------------------------
// Tidal window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidalWindow {
    pub month: u8,
    pub day: u8,
    pub windows: Vec<TidalWindowEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TidalWindowEntry {
    pub longitude: f64,
    pub latitude: f64,
    pub from_hour: u8,
    pub from_minute: u8,
    pub to_hour: u8,
    pub to_minute: u8,
    /// Degrees; 360 = not available.
    pub current_direction: u16,
    /// Knots, 0.1 kn resolution.
    pub current_speed: f64,
}

/// Up to three windows. The older (1, 14) layout sends latitude first at
/// 1/10000 minute resolution; (1, 32) sends longitude first at 1/1000.
fn decode_tidal_window(data: &BitView, legacy: bool) -> TidalWindow {
    let width = if legacy { 93 } else { 87 };
    let mut windows = Vec::with_capacity(3);

    for i in 0..3 {
        let s = 9 + i * width;
        if data.len() < s + width {
            break;
        }
        let (longitude, latitude, p) = if legacy {
            (
                data.scaled(s + 27..s + 55, HIGH_RES),
                data.scaled(s..s + 27, HIGH_RES),
                s + 55,
            )
        } else {
            (
                data.scaled(s..s + 25, IMO_RES),
                data.scaled(s + 25..s + 49, IMO_RES),
                s + 49,
            )
        };
        windows.push(TidalWindowEntry {
            longitude,
            latitude,
            from_hour: data.unsigned(p..p + 5) as u8,
            from_minute: data.unsigned(p + 5..p + 11) as u8,
            to_hour: data.unsigned(p + 11..p + 16) as u8,
            to_minute: data.unsigned(p + 16..p + 22) as u8,
            current_direction: data.unsigned(p + 22..p + 31) as u16,
            current_speed: data.scaled_unsigned(p + 31..p + 38, 10.0),
        });
    }

    TidalWindow {
        month: data.unsigned(0..4) as u8,
        day: data.unsigned(4..9) as u8,
        windows,
    }
}

// ---------------------------------------------------------------------------
// Port and berth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonsOnBoard {
    /// 8191 = 8191 or more; 0 = not available.
    pub persons: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearanceTime {
    pub linkage_id: u16,
    pub time: Eta,
    pub port_name: String,
    /// UN/LOCODE of the destination.
    pub destination: String,
    pub longitude: f64,
    pub latitude: f64,
}

fn decode_clearance_time(data: &BitView) -> ClearanceTime {
    ClearanceTime {
        linkage_id: data.unsigned(0..10) as u16,
        time: Eta::decode(data, 10),
        port_name: data.text(30..150),
        destination: data.text(150..180),
        longitude: data.scaled(180..205, IMO_RES),
        latitude: data.scaled(205..229, IMO_RES),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BerthingData {
    pub linkage_id: u16,
    /// Metres.
    pub berth_length: u16,
    /// Metres, 0.1 m resolution.
    pub berth_depth: f64,
    pub mooring_position: u8,
    pub time: Eta,
    pub services_available: bool,
    /// 26 two-bit service status codes (agent, fuel, chandler, ...).
    pub services: Vec<u8>,
    pub berth_name: String,
    pub longitude: f64,
    pub latitude: f64,
}

fn decode_berthing_data(data: &BitView) -> BerthingData {
    let services = (0..26)
        .map(|i| data.unsigned(51 + i * 2..53 + i * 2) as u8)
        .collect();

    BerthingData {
        linkage_id: data.unsigned(0..10) as u16,
        berth_length: data.unsigned(10..19) as u16,
        berth_depth: data.scaled_unsigned(19..27, 10.0),
        mooring_position: data.unsigned(27..30) as u8,
        time: Eta::decode(data, 30),
        services_available: data.flag(50),
        services,
        berth_name: data.text(103..223),
        longitude: data.scaled(223..248, IMO_RES),
        latitude: data.scaled(248..272, IMO_RES),
    }
}

// ---------------------------------------------------------------------------
// Route information
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInformation {
    pub linkage_id: u16,
    pub sender_class: u8,
    pub route_type: u8,
    pub start: Eta,
    /// Minutes until end of validity; 0 = cancel route.
    pub duration: u32,
    pub waypoints: Vec<Waypoint>,
}

const WAYPOINT_BITS: usize = 55;

fn decode_route(data: &BitView) -> RouteInformation {
    let declared = data.unsigned(56..61) as usize;
    let available = data.len().saturating_sub(61) / WAYPOINT_BITS;
    if declared > available {
        debug!(declared, available, "route waypoint count exceeds payload");
    }

    let waypoints = (0..declared.min(available))
        .map(|i| {
            let s = 61 + i * WAYPOINT_BITS;
            Waypoint {
                longitude: data.scaled(s..s + 28, HIGH_RES),
                latitude: data.scaled(s + 28..s + 55, HIGH_RES),
            }
        })
        .collect();

    RouteInformation {
        linkage_id: data.unsigned(0..10) as u16,
        sender_class: data.unsigned(10..13) as u8,
        route_type: data.unsigned(13..18) as u8,
        start: Eta::decode(data, 18),
        duration: data.unsigned(38..56) as u32,
        waypoints,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextDescription {
    pub linkage_id: u16,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Meteorological and hydrological data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentMeasurement {
    /// Knots, 0.1 kn resolution; 25.5 = not available.
    pub speed: f64,
    /// Degrees; 360 = not available.
    pub direction: u16,
    /// Metres; 31 = not available.
    pub depth: u8,
}

/// Readings keep their transmitted "not available" codes, scaled like
/// the valid values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetHydroData {
    pub longitude: f64,
    pub latitude: f64,
    pub position_accuracy: bool,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub wind_speed: u8,
    pub wind_gust: u8,
    pub wind_direction: u16,
    pub wind_gust_direction: u16,
    /// Celsius, 0.1 degree resolution.
    pub air_temperature: f64,
    pub relative_humidity: u8,
    pub dew_point: f64,
    /// hPa; `None` when not available.
    pub air_pressure: Option<u16>,
    pub air_pressure_tendency: u8,
    pub visibility_greater_than: bool,
    /// Nautical miles, 0.1 nm resolution.
    pub horizontal_visibility: f64,
    /// Metres relative to chart datum, 0.01 m resolution.
    pub water_level: f64,
    pub water_level_trend: u8,
    /// Knots, 0.1 kn resolution.
    pub surface_current_speed: f64,
    pub surface_current_direction: u16,
    pub current_2: CurrentMeasurement,
    pub current_3: CurrentMeasurement,
    /// Metres, 0.1 m resolution.
    pub wave_height: f64,
    pub wave_period: u8,
    pub wave_direction: u16,
    pub swell_height: f64,
    pub swell_period: u8,
    pub swell_direction: u16,
    /// Beaufort scale.
    pub sea_state: u8,
    pub water_temperature: f64,
    pub precipitation_type: u8,
    /// Parts per thousand, 0.1 resolution.
    pub salinity: f64,
    pub ice: u8,
}

fn decode_met_hydro(d: &BitView) -> MetHydroData {
    let pressure = d.unsigned(126..135) as u16;

    MetHydroData {
        longitude: d.scaled(0..25, IMO_RES),
        latitude: d.scaled(25..49, IMO_RES),
        position_accuracy: d.flag(49),
        day: d.unsigned(50..55) as u8,
        hour: d.unsigned(55..60) as u8,
        minute: d.unsigned(60..66) as u8,
        wind_speed: d.unsigned(66..73) as u8,
        wind_gust: d.unsigned(73..80) as u8,
        wind_direction: d.unsigned(80..89) as u16,
        wind_gust_direction: d.unsigned(89..98) as u16,
        air_temperature: d.scaled(98..109, 10.0),
        relative_humidity: d.unsigned(109..116) as u8,
        dew_point: d.scaled(116..126, 10.0),
        air_pressure: (pressure != 511).then_some(pressure + 799),
        air_pressure_tendency: d.unsigned(135..137) as u8,
        visibility_greater_than: d.flag(137),
        horizontal_visibility: d.scaled_unsigned(138..145, 10.0),
        water_level: (d.unsigned(145..157) as f64 - 1000.0) / 100.0,
        water_level_trend: d.unsigned(157..159) as u8,
        surface_current_speed: d.scaled_unsigned(159..167, 10.0),
        surface_current_direction: d.unsigned(167..176) as u16,
        current_2: CurrentMeasurement {
            speed: d.scaled_unsigned(176..184, 10.0),
            direction: d.unsigned(184..193) as u16,
            depth: d.unsigned(193..198) as u8,
        },
        current_3: CurrentMeasurement {
            speed: d.scaled_unsigned(198..206, 10.0),
            direction: d.unsigned(206..215) as u16,
            depth: d.unsigned(215..220) as u8,
        },
        wave_height: d.scaled_unsigned(220..228, 10.0),
        wave_period: d.unsigned(228..234) as u8,
        wave_direction: d.unsigned(234..243) as u16,
        swell_height: d.scaled_unsigned(243..251, 10.0),
        swell_period: d.unsigned(251..257) as u8,
        swell_direction: d.unsigned(257..266) as u16,
        sea_state: d.unsigned(266..270) as u8,
        water_temperature: d.scaled(270..280, 10.0),
        precipitation_type: d.unsigned(280..283) as u8,
        salinity: d.scaled_unsigned(283..292, 10.0),
        ice: d.unsigned(292..294) as u8,
    }
}

// ---------------------------------------------------------------------------
// Inland AIS
// ---------------------------------------------------------------------------

/// Inland ship static and voyage related data (ENI, hull, cargo).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlandShipData {
    /// European vessel identification number (ENI).
    pub vessel_id: String,
    /// Metres, 0.1 m resolution.
    pub length: f64,
    /// Metres, 0.1 m resolution.
    pub beam: f64,
    /// ERI ship or combination type.
    pub ship_type: u16,
    /// Number of blue cones/lights; 5 = B-flag, 6 = unknown.
    pub hazardous_cargo: u8,
    /// Metres, 0.01 m resolution.
    pub draught: f64,
    /// 1 = loaded, 2 = unloaded.
    pub loaded: u8,
    pub speed_quality: bool,
    pub course_quality: bool,
    pub heading_quality: bool,
}

fn decode_inland(data: &BitView) -> InlandShipData {
    InlandShipData {
        vessel_id: data.text(0..48),
        length: data.scaled_unsigned(48..61, 10.0),
        beam: data.scaled_unsigned(61..71, 10.0),
        ship_type: data.unsigned(71..85) as u16,
        hazardous_cargo: data.unsigned(85..88) as u8,
        draught: data.scaled_unsigned(88..99, 100.0),
        loaded: data.unsigned(99..101) as u8,
        speed_quality: data.flag(101),
        course_quality: data.flag(102),
        heading_quality: data.flag(103),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::TEXT_CHARSET;

    fn val(v: i64, width: usize) -> String {
        let masked = (v as u64) & ((1u64 << width) - 1);
        format!("{masked:0width$b}")
    }

    fn txt(s: &str, width: usize) -> String {
        let mut out = String::new();
        for c in s.bytes().chain(std::iter::repeat(b'@')).take(width / 6) {
            let idx = TEXT_CHARSET.iter().position(|&x| x == c).unwrap();
            out.push_str(&val(idx as i64, 6));
        }
        out
    }

    fn view(s: &str) -> BitView {
        BitView::from_bit_str(s).unwrap()
    }

    #[test]
    fn test_unknown_pair_keeps_raw_bits() {
        let data = view(&val(0xABCD, 16));
        match decode_asm(235, 63, &data) {
            ApplicationSpecificMessage::Unknown { dac, fi, data: raw } => {
                assert_eq!((dac, fi), (235, 63));
                assert_eq!(raw, data);
            }
            other => panic!("unexpected {other:?}"),
        }
        // Same FI under another DAC is not the IMO layout.
        assert!(matches!(
            decode_asm(366, 31, &data),
            ApplicationSpecificMessage::Unknown { dac: 366, .. }
        ));
    }

    #[test]
    fn test_persons_on_board() {
        let data = view(&(val(42, 13) + "000"));
        for fi in [16, 40] {
            assert_eq!(
                decode_asm(1, fi, &data),
                ApplicationSpecificMessage::PersonsOnBoard(PersonsOnBoard { persons: 42 })
            );
        }
    }

    #[test]
    fn test_tidal_window_current_layout() {
        let mut s = val(6, 4) + &val(12, 5);
        for (lon, lat) in [(-4.5, 48.25), (-4.75, 48.5)] {
            s += &val((lon * IMO_RES) as i64, 25);
            s += &val((lat * IMO_RES) as i64, 24);
            s += &(val(6, 5) + &val(30, 6) + &val(9, 5) + &val(0, 6));
            s += &(val(270, 9) + &val(25, 7));
        }
        let ApplicationSpecificMessage::TidalWindow(tw) = decode_asm(1, 32, &view(&s)) else {
            panic!("expected tidal window")
        };
        assert_eq!((tw.month, tw.day), (6, 12));
        // Only two complete windows fit.
        assert_eq!(tw.windows.len(), 2);
        let w = tw.windows[1];
        assert!((w.longitude + 4.75).abs() < 1e-9);
        assert!((w.latitude - 48.5).abs() < 1e-9);
        assert_eq!((w.from_hour, w.from_minute, w.to_hour, w.to_minute), (6, 30, 9, 0));
        assert_eq!(w.current_direction, 270);
        assert!((w.current_speed - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_tidal_window_legacy_layout() {
        let mut s = val(6, 4) + &val(12, 5);
        for _ in 0..3 {
            s += &val((48.25 * HIGH_RES) as i64, 27);
            s += &val((-4.5 * HIGH_RES) as i64, 28);
            s += &(val(6, 5) + &val(30, 6) + &val(9, 5) + &val(0, 6));
            s += &(val(90, 9) + &val(12, 7));
        }
        let ApplicationSpecificMessage::TidalWindow(tw) = decode_asm(1, 14, &view(&s)) else {
            panic!("expected tidal window")
        };
        assert_eq!(tw.windows.len(), 3);
        assert!((tw.windows[2].latitude - 48.25).abs() < 1e-9);
        assert!((tw.windows[2].longitude + 4.5).abs() < 1e-9);
        assert_eq!(tw.windows[0].current_direction, 90);
    }

    #[test]
    fn test_clearance_time() {
        let s = val(77, 10)
            + &val(4, 4)
            + &val(1, 5)
            + &val(23, 5)
            + &val(15, 6)
            + &txt("ROTTERDAM", 120)
            + &txt("NLRTM", 30)
            + &val((4.5 * IMO_RES) as i64, 25)
            + &val((51.9 * IMO_RES) as i64, 24)
            + &val(0, 43);
        let ApplicationSpecificMessage::ClearanceTime(c) = decode_asm(1, 18, &view(&s)) else {
            panic!("expected clearance time")
        };
        assert_eq!(c.linkage_id, 77);
        assert_eq!(
            c.time,
            Eta {
                month: 4,
                day: 1,
                hour: 23,
                minute: 15
            }
        );
        assert_eq!(c.port_name, "ROTTERDAM");
        assert_eq!(c.destination, "NLRTM");
        assert!((c.longitude - 4.5).abs() < 1e-4);
        assert!((c.latitude - 51.9).abs() < 1e-4);
    }

    #[test]
    fn test_text_description() {
        let s = val(3, 10) + &txt("NO WAKE ZONE", 72);
        let msg = decode_asm(1, 30, &view(&s));
        assert_eq!(
            msg,
            ApplicationSpecificMessage::TextDescription(TextDescription {
                linkage_id: 3,
                text: "NO WAKE ZONE".into(),
            })
        );
    }

    #[test]
    fn test_route_clamps_waypoints_to_payload() {
        let mut s = val(5, 10) + &val(2, 3) + &val(8, 5) + &val(3, 4) + &val(15, 5);
        s += &(val(6, 5) + &val(45, 6) + &val(1440, 18) + &val(4, 5));
        s += &val((10.5 * HIGH_RES) as i64, 28);
        s += &val((53.5 * HIGH_RES) as i64, 27);
        let ApplicationSpecificMessage::RouteInformation(r) = decode_asm(1, 28, &view(&s)) else {
            panic!("expected route information")
        };
        assert_eq!(r.duration, 1440);
        assert_eq!(r.waypoints.len(), 1);
        assert!((r.waypoints[0].longitude - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_payload_still_decodes() {
        let ApplicationSpecificMessage::BerthingData(b) = decode_asm(1, 20, &view("0000000001"))
        else {
            panic!("expected berthing data")
        };
        assert_eq!(b.linkage_id, 1);
        assert_eq!(b.services.len(), 26);
        assert_eq!(b.berth_name, "");
    }
}
