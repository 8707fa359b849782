//! Per-MMSI summary of a decoded feed, printed as a table.

use std::collections::HashMap;

use comfy_table::{Cell, Table};

use ais_core::voyage::StaticDataPart;
use ais_core::{Message, StreamStats};

/// Last known state of one station, built from every message it sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VesselSummary {
    pub mmsi: u32,
    pub name: Option<String>,
    pub last_type: u8,
    /// (longitude, latitude)
    pub position: Option<(f64, f64)>,
    pub speed_knots: Option<f64>,
    pub messages: u64,
}

impl VesselSummary {
    pub fn new(mmsi: u32) -> Self {
        VesselSummary {
            mmsi,
            ..Default::default()
        }
    }

    pub fn update(&mut self, msg: &Message) {
        self.messages += 1;
        self.last_type = msg.message_type();
        if let Some(pos) = msg.position() {
            self.position = Some(pos);
        }

        // 102.3 kn (63 kn long-range) means not available
        let sog = match msg {
            Message::PositionReport(m) => Some(m.speed_over_ground).filter(|&s| s < 102.3),
            Message::ClassBPosition(m) => Some(m.speed_over_ground).filter(|&s| s < 102.3),
            Message::ExtendedClassBPosition(m) => {
                Some(m.speed_over_ground).filter(|&s| s < 102.3)
            }
            Message::LongRangeBroadcast(m) => {
                (m.speed_over_ground < 63).then(|| f64::from(m.speed_over_ground))
            }
            _ => None,
        };
        if sog.is_some() {
            self.speed_knots = sog;
        }

        let name = match msg {
            Message::ShipStaticData(m) => Some(m.ship_name.as_str()),
            Message::ExtendedClassBPosition(m) => Some(m.ship_name.as_str()),
            Message::StaticDataReport(m) => match &m.part {
                StaticDataPart::A { ship_name } => Some(ship_name.as_str()),
                StaticDataPart::B { .. } => None,
            },
            Message::AidToNavigation(m) => Some(m.name.as_str()),
            _ => None,
        };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = Some(name.to_string());
        }
    }
}

/// Collects a `VesselSummary` per MMSI.
#[derive(Debug, Default)]
pub struct FeedSummary {
    pub vessels: HashMap<u32, VesselSummary>,
}

impl FeedSummary {
    pub fn update(&mut self, msg: &Message) {
        self.vessels
            .entry(msg.mmsi())
            .or_insert_with(|| VesselSummary::new(msg.mmsi()))
            .update(msg);
    }

    /// Vessels ordered by message count, busiest first.
    pub fn sorted(&self) -> Vec<&VesselSummary> {
        let mut sorted: Vec<_> = self.vessels.values().collect();
        sorted.sort_by_key(|v| (std::cmp::Reverse(v.messages), v.mmsi));
        sorted
    }

    pub fn print(&self, stats: &StreamStats) {
        println!();
        println!(
            "Lines: {} read, {} rejected; frames: {} assembled, {} decoded; {} stations",
            stats.lines,
            stats.rejected,
            stats.frames,
            stats.decoded,
            self.vessels.len()
        );
        println!();

        if self.vessels.is_empty() {
            return;
        }

        let mut table = Table::new();
        table.set_header(vec![
            "MMSI", "Name", "Last type", "Lat", "Lon", "SOG (kn)", "Msgs",
        ]);

        for v in self.sorted() {
            table.add_row(vec![
                Cell::new(format!("{:09}", v.mmsi)),
                Cell::new(v.name.as_deref().unwrap_or("-")),
                Cell::new(v.last_type),
                Cell::new(
                    v.position
                        .map(|(_, lat)| format!("{lat:.4}"))
                        .unwrap_or("-".into()),
                ),
                Cell::new(
                    v.position
                        .map(|(lon, _)| format!("{lon:.4}"))
                        .unwrap_or("-".into()),
                ),
                Cell::new(
                    v.speed_knots
                        .map(|s| format!("{s:.1}"))
                        .unwrap_or("-".into()),
                ),
                Cell::new(v.messages),
            ]);
        }

        println!("{table}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
