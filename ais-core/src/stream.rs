//! Line-oriented AIS stream: sentences in, decoded messages out.
//!
//! One `AisStream` per physical input (serial port, UDP socket, file). It
//! owns that input's reassembly state, so lines from different inputs must
//! go to different streams.
//!
//! Every decoded message is handed to each registered receiver together
//! with a `Metadata` record. A bad line never stops the stream: its error is
//! returned to the caller, counted, and the next line is processed normally.

use std::time::{Duration, Instant, SystemTime};

use serde::Serialize;
use tracing::debug;

use crate::decode::{decode, Message};
use crate::reassembly::Reassembler;
use crate::sentence::{parse_sentence, ChecksumMode, Sentence};
use crate::tagblock::TagBlock;
use crate::types::*;

/// Context attached to each decoded message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    /// Identifier of the input the message arrived on.
    pub source: String,
    /// When the completing sentence was accepted.
    pub received: SystemTime,
    /// Time spent parsing, reassembling, and decoding the completing line.
    pub decode_duration: Duration,
    pub tag_block: Option<TagBlock>,
    pub channel: Option<char>,
}

/// Running counters for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub lines: u64,
    /// Lines rejected by the sentence parser (grammar, checksum, carrier).
    pub rejected: u64,
    /// Frames completed by the reassembler.
    pub frames: u64,
    pub decoded: u64,
    /// Frames that failed to decode, plus bad payloads on completion.
    pub failures: u64,
    /// Fragment sequences abandoned by the reassembler.
    pub reassembly_resets: u64,
}

/// Receiver callback for decoded messages.
pub type Receiver = Box<dyn FnMut(&Metadata, &Message)>;

pub struct AisStream {
    source: String,
    mode: ChecksumMode,
    reassembler: Reassembler,
    receivers: Vec<Receiver>,
    stats: StreamStats,
}

impl AisStream {
    pub fn new(source: impl Into<String>, mode: ChecksumMode) -> Self {
        AisStream {
            source: source.into(),
            mode,
            reassembler: Reassembler::new(),
            receivers: Vec::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> ChecksumMode {
        self.mode
    }

    /// Register a receiver. Receivers run in registration order.
    pub fn add_receiver<F>(&mut self, receiver: F)
    where
        F: FnMut(&Metadata, &Message) + 'static,
    {
        self.receivers.push(Box::new(receiver));
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            reassembly_resets: self.reassembler.violations(),
            ..self.stats
        }
    }

    /// Process one line. Returns the decoded message when this line
    /// completed one, `Ok(None)` while a multi-fragment message is still
    /// being collected or after a reassembly reset.
    pub fn accept(&mut self, line: &str) -> Result<Option<Message>> {
        let started = Instant::now();
        let received = SystemTime::now();
        self.stats.lines += 1;

        let sentence = match parse_sentence(line, self.mode) {
            Ok(s) => s,
            Err(e) => {
                self.stats.rejected += 1;
                debug!(source = %self.source, error = %e, "sentence rejected");
                return Err(e);
            }
        };

        let frame = match self.reassembler.push(sentence) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.stats.failures += 1;
                debug!(source = %self.source, error = %e, "bad payload");
                return Err(e);
            }
        };
        self.stats.frames += 1;

        let msg = match decode(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                self.stats.failures += 1;
                match &e {
                    AisError::UnsupportedMessageType(code) => {
                        debug!(source = %self.source, message_type = code, "unsupported message type")
                    }
                    _ => debug!(source = %self.source, error = %e, "decode failed"),
                }
                return Err(e);
            }
        };
        self.stats.decoded += 1;

        let meta = Metadata {
            source: self.source.clone(),
            received,
            decode_duration: started.elapsed(),
            tag_block: frame.tag_block,
            channel: frame.channel,
        };
        for receiver in &mut self.receivers {
            receiver(&meta, &msg);
        }

        Ok(Some(msg))
    }

    /// Drop any partially collected message. Returns the abandoned
    /// fragments.
    pub fn flush(&mut self) -> Vec<Sentence> {
        let pending = self.reassembler.flush();
        if !pending.is_empty() {
            debug!(
                source = %self.source,
                fragments = pending.len(),
                "flushed incomplete message"
            );
        }
        pending
    }
}

impl std::fmt::Debug for AisStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AisStream")
            .field("source", &self.source)
            .field("mode", &self.mode)
            .field("reassembler", &self.reassembler)
            .field("receivers", &self.receivers.len())
            .field("stats", &self.stats)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
