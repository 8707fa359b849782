//! 19-bit communication state carried by position and base station reports.
//!
//! SOTDMA: sync state (2), slot timeout (3), sub-message (14). The slot
//! timeout selects what the sub-message means.
//! ITDMA:  sync state (2), slot increment (13), number of slots (3), keep flag (1).
//!
//! Which of the two applies is decided by the enclosing message (type 3 is
//! always ITDMA, types 9/18/26 carry a selector bit), never by the 19 bits.

use serde::Serialize;
use tracing::debug;

use crate::bits::BitView;

/// Width of a communication state field.
pub const COMM_STATE_BITS: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    UtcDirect,
    UtcIndirect,
    BaseStation,
    NumberOfReceivedStations,
}

impl SyncState {
    pub fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => SyncState::UtcDirect,
            1 => SyncState::UtcIndirect,
            2 => SyncState::BaseStation,
            _ => SyncState::NumberOfReceivedStations,
        }
    }
}

/// SOTDMA sub-message, chosen by the slot timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SotdmaSubMessage {
    /// Timeout 0: offset to the next slot used.
    SlotOffset(u16),
    /// Timeout 1: UTC hour and minute.
    UtcTime { hour: u8, minute: u8 },
    /// Timeout 2, 4, 6: slot number used for this transmission.
    SlotNumber(u16),
    /// Timeout 3, 5, 7: number of stations received.
    ReceivedStations(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sotdma {
    pub sync_state: SyncState,
    pub slot_timeout: u8,
    pub sub_message: SotdmaSubMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Itdma {
    pub sync_state: SyncState,
    pub slot_increment: u16,
    pub number_of_slots: u8,
    pub keep_flag: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme")]
pub enum CommunicationState {
    Sotdma(Sotdma),
    Itdma(Itdma),
}

impl CommunicationState {
    /// Decode the 19 bits starting at `start`.
    pub fn decode(bits: &BitView, start: usize, itdma: bool) -> CommunicationState {
        if itdma {
            CommunicationState::Itdma(decode_itdma(bits, start))
        } else {
            CommunicationState::Sotdma(decode_sotdma(bits, start))
        }
    }

    pub fn sync_state(&self) -> SyncState {
        match self {
            CommunicationState::Sotdma(s) => s.sync_state,
            CommunicationState::Itdma(i) => i.sync_state,
        }
    }
}

fn decode_sotdma(bits: &BitView, start: usize) -> Sotdma {
    let sync_state = SyncState::from_code(bits.unsigned(start..start + 2) as u8);
    let slot_timeout = bits.unsigned(start + 2..start + 5) as u8;
    let sub = start + 5;

    let sub_message = match slot_timeout {
        0 => SotdmaSubMessage::SlotOffset(bits.unsigned(sub..sub + 14) as u16),
        1 => {
            let hour = bits.unsigned(sub..sub + 5) as u8;
            let minute = bits.unsigned(sub + 5..sub + 12) as u8;
            // 24 / 60 mean "not available".
            if hour > 24 || minute > 60 {
                debug!(hour, minute, "SOTDMA UTC time out of range");
            }
            SotdmaSubMessage::UtcTime { hour, minute }
        }
        2 | 4 | 6 => {
            let slot = bits.unsigned(sub..sub + 14) as u16;
            if slot > 2249 {
                debug!(slot, "SOTDMA slot number out of range");
            }
            SotdmaSubMessage::SlotNumber(slot)
        }
        _ => SotdmaSubMessage::ReceivedStations(bits.unsigned(sub..sub + 14) as u16),
    };

    Sotdma {
        sync_state,
        slot_timeout,
        sub_message,
    }
}

fn decode_itdma(bits: &BitView, start: usize) -> Itdma {
    Itdma {
        sync_state: SyncState::from_code(bits.unsigned(start..start + 2) as u8),
        slot_increment: bits.unsigned(start + 2..start + 15) as u16,
        number_of_slots: bits.unsigned(start + 15..start + 18) as u8,
        keep_flag: bits.flag(start + 18),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// sync(2) timeout(3) sub(14) as a bit string.
    fn sotdma_bits(sync: u8, timeout: u8, sub: u16) -> BitView {
        BitView::from_bit_str(&format!("{sync:02b}{timeout:03b}{sub:014b}")).unwrap()
    }

    #[test]
    fn test_sotdma_slot_offset() {
        let cs = CommunicationState::decode(&sotdma_bits(0, 0, 1234), 0, false);
        assert_eq!(
            cs,
            CommunicationState::Sotdma(Sotdma {
                sync_state: SyncState::UtcDirect,
                slot_timeout: 0,
                sub_message: SotdmaSubMessage::SlotOffset(1234),
            })
        );
    }

    #[test]
    fn test_sotdma_utc_time() {
        // hour 13, minute 45, 2 spare bits
        let sub = (13u16 << 9) | (45 << 2);
        let cs = CommunicationState::decode(&sotdma_bits(1, 1, sub), 0, false);
        match cs {
            CommunicationState::Sotdma(s) => {
                assert_eq!(s.sync_state, SyncState::UtcIndirect);
                assert_eq!(
                    s.sub_message,
                    SotdmaSubMessage::UtcTime {
                        hour: 13,
                        minute: 45
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sotdma_timeout_selects_sub_message() {
        for timeout in [2u8, 4, 6] {
            let cs = CommunicationState::decode(&sotdma_bits(2, timeout, 2000), 0, false);
            let CommunicationState::Sotdma(s) = cs else {
                panic!("expected SOTDMA")
            };
            assert_eq!(s.sub_message, SotdmaSubMessage::SlotNumber(2000));
        }
        for timeout in [3u8, 5, 7] {
            let cs = CommunicationState::decode(&sotdma_bits(3, timeout, 17), 0, false);
            let CommunicationState::Sotdma(s) = cs else {
                panic!("expected SOTDMA")
            };
            assert_eq!(s.sub_message, SotdmaSubMessage::ReceivedStations(17));
            assert_eq!(s.sync_state, SyncState::NumberOfReceivedStations);
        }
    }

    #[test]
    fn test_out_of_range_slot_retained() {
        let cs = CommunicationState::decode(&sotdma_bits(0, 2, 16383), 0, false);
        let CommunicationState::Sotdma(s) = cs else {
            panic!("expected SOTDMA")
        };
        assert_eq!(s.sub_message, SotdmaSubMessage::SlotNumber(16383));
    }

    #[test]
    fn test_itdma() {
        let bits =
            BitView::from_bit_str(&format!("{:02b}{:013b}{:03b}{}", 1, 4095, 5, 1)).unwrap();
        let cs = CommunicationState::decode(&bits, 0, true);
        assert_eq!(
            cs,
            CommunicationState::Itdma(Itdma {
                sync_state: SyncState::UtcIndirect,
                slot_increment: 4095,
                number_of_slots: 5,
                keep_flag: true,
            })
        );
        assert_eq!(cs.sync_state(), SyncState::UtcIndirect);
    }

    #[test]
    fn test_decode_at_offset_with_truncation() {
        // Only the sync state bits exist; the rest reads as zeros.
        let bits = BitView::from_bit_str("000011").unwrap();
        let cs = CommunicationState::decode(&bits, 4, false);
        assert_eq!(cs.sync_state(), SyncState::NumberOfReceivedStations);
    }
}
