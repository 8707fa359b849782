//! Aid-to-navigation report (21).

use serde::Serialize;

use crate::fields::{check_position, Dimensions};
use crate::frame::Frame;
use crate::position::HIGH_RES;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidToNavigationReport {
    #[serde(flatten)]
    pub header: Header,
    /// 0 = unspecified, 1-15 fixed structures, 16-31 floating marks.
    pub aid_type: u8,
    pub name: String,
    pub position_accuracy: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub dimensions: Dimensions,
    pub position_fixing_device: PositionFixingDevice,
    pub timestamp: u8,
    /// Only meaningful for floating aids.
    pub off_position: bool,
    pub regional_reserved: u8,
    pub raim: bool,
    /// Virtual aid: no physical mark at the reported position.
    pub virtual_aid: bool,
    pub assigned: bool,
    /// Characters beyond the first 20 of the name, when sent.
    pub name_extension: Option<String>,
}

impl AidToNavigationReport {
    /// Name with its extension appended.
    pub fn full_name(&self) -> String {
        match &self.name_extension {
            Some(ext) => format!("{}{}", self.name, ext),
            None => self.name.clone(),
        }
    }
}

pub fn decode_aid_to_navigation(frame: &Frame) -> Result<AidToNavigationReport> {
    frame.ensure(MessageType::AidToNavigationReport)?;
    let b = &frame.bits;
    let header = frame.header();

    let name_extension = Some(b.text_to_end(272)).filter(|ext| !ext.is_empty());

    let msg = AidToNavigationReport {
        header,
        aid_type: b.unsigned(38..43) as u8,
        name: b.text(43..163),
        position_accuracy: b.flag(163),
        longitude: b.scaled(164..192, HIGH_RES),
        latitude: b.scaled(192..219, HIGH_RES),
        dimensions: Dimensions::decode(b, 219),
        position_fixing_device: PositionFixingDevice::from_code(b.unsigned(249..253) as u8),
        timestamp: b.unsigned(253..259) as u8,
        off_position: b.flag(259),
        regional_reserved: b.unsigned(260..268) as u8,
        raim: b.flag(268),
        virtual_aid: b.flag(269),
        assigned: b.flag(270),
        name_extension,
    };

    check_position(header.mmsi, msg.longitude, msg.latitude);
    Ok(msg)
}
