//! ais-core: Pure decode library for AIS (ITU-R M.1371) over NMEA 0183.
//!
//! No async, no I/O. Lines go in through `AisStream::accept` (or the
//! lower-level `parse_sentence` / `Reassembler` / `decode` chain) and typed
//! messages come out. The `ais-feeder` binary does the reading.

pub mod armor;
pub mod asm;
pub mod aton;
pub mod binary;
pub mod bits;
pub mod commstate;
pub mod config;
pub mod decode;
pub mod fields;
pub mod frame;
pub mod link;
pub mod position;
pub mod reassembly;
pub mod safety;
pub mod sentence;
pub mod station;
pub mod stream;
pub mod tagblock;
pub mod types;
pub mod voyage;

// Re-export commonly used types at crate root
pub use bits::BitView;
pub use decode::{decode, Message};
pub use frame::Frame;
pub use reassembly::Reassembler;
pub use sentence::{parse_sentence, ChecksumMode, Sentence};
pub use stream::{AisStream, Metadata, StreamStats};
pub use types::*;
