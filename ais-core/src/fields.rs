//! Sub-structures shared by several layouts, and range-anomaly logging.
//!
//! Real transponders routinely send values outside the documented ranges.
//! Those are logged at debug level and kept as-is; decoding never fails
//! because of them.

use serde::Serialize;
use tracing::debug;

use crate::bits::BitView;

/// Longitude "not available".
pub const LON_NOT_AVAILABLE: f64 = 181.0;
/// Latitude "not available".
pub const LAT_NOT_AVAILABLE: f64 = 91.0;

/// Reference point for reported position, in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u8,
    pub to_starboard: u8,
}

impl Dimensions {
    /// Decode the 30-bit bow(9)/stern(9)/port(6)/starboard(6) block.
    pub fn decode(bits: &BitView, start: usize) -> Self {
        Dimensions {
            to_bow: bits.unsigned(start..start + 9) as u16,
            to_stern: bits.unsigned(start + 9..start + 18) as u16,
            to_port: bits.unsigned(start + 18..start + 24) as u8,
            to_starboard: bits.unsigned(start + 24..start + 30) as u8,
        }
    }

    pub fn length(&self) -> u16 {
        self.to_bow + self.to_stern
    }

    pub fn beam(&self) -> u16 {
        self.to_port as u16 + self.to_starboard as u16
    }
}

/// Month/day/hour/minute without a year. Zero month/day and hour 24 /
/// minute 60 mean "not available".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Eta {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Eta {
    /// Decode the 20-bit month(4)/day(5)/hour(5)/minute(6) block.
    pub fn decode(bits: &BitView, start: usize) -> Self {
        Eta {
            month: bits.unsigned(start..start + 4) as u8,
            day: bits.unsigned(start + 4..start + 9) as u8,
            hour: bits.unsigned(start + 9..start + 14) as u8,
            minute: bits.unsigned(start + 14..start + 20) as u8,
        }
    }

    pub fn is_available(&self) -> bool {
        self.month != 0 && self.day != 0 && self.hour < 24 && self.minute < 60
    }
}

// ---------------------------------------------------------------------------
// Anomaly logging
// ---------------------------------------------------------------------------

/// Log `value` if it is outside `min..=max`. Returns whether it was inside.
pub(crate) fn check_range<T>(mmsi: u32, field: &'static str, value: T, min: T, max: T) -> bool
where
    T: PartialOrd + Copy + std::fmt::Debug,
{
    let inside = value >= min && value <= max;
    if !inside {
        debug!(mmsi, field, value = ?value, "field outside documented range");
    }
    inside
}

/// Log positions outside the legal range (the not-available sentinels pass).
pub(crate) fn check_position(mmsi: u32, lon: f64, lat: f64) {
    check_range(mmsi, "longitude", lon, -180.0, LON_NOT_AVAILABLE);
    check_range(mmsi, "latitude", lat, -90.0, LAT_NOT_AVAILABLE);
}

/// Speed over ground in knots: 102.3 is "not available".
pub(crate) fn check_speed(mmsi: u32, sog: f64) {
    check_range(mmsi, "speed_over_ground", sog, 0.0, 102.3);
}

/// Course over ground: 360.0 is "not available".
pub(crate) fn check_course(mmsi: u32, cog: f64) {
    check_range(mmsi, "course_over_ground", cog, 0.0, 360.0);
}

/// True heading: 0-359, 511 = not available.
pub(crate) fn check_heading(mmsi: u32, heading: u16) {
    if heading > 359 && heading != 511 {
        debug!(mmsi, heading, "true heading outside documented range");
    }
}

/// UTC second: 0-59, 60-63 carry status codes.
pub(crate) fn check_second(mmsi: u32, second: u8) -> bool {
    check_range(mmsi, "timestamp", second, 0, 63)
}

/// Is this MMSI an auxiliary craft (98MIDxxxx)?
pub fn is_auxiliary_craft(mmsi: u32) -> bool {
    mmsi / 10_000_000 == 98
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
