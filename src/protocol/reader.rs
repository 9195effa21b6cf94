//! Packet framing
//! ===========================================================
//!
//! `IDLE → HEADER → (SET_PAYLOAD | GET_READY) → packet`
//!
//! Every byte is read with the short byte timeout. A quiet link while idle
//! ends the polling cycle; a quiet link inside a packet throws the partial
//! packet away.

use heapless::Vec;

use super::codec;
use super::error::{FrameError, LinkError};
use super::{Command, CommandPacket, COMMAND_FLAG};

/// Byte-at-a-time inbound transport.
#[allow(async_fn_in_trait)]
pub trait ByteSource {
    /// Next byte, or `Ok(None)` if nothing arrived within the byte timeout.
    async fn read_byte(&mut self) -> Result<Option<u8>, LinkError>;
}

/// Result of one pass through the framing state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Packet(CommandPacket),
    Dropped(FrameError),
    /// Link stayed quiet for a whole byte timeout while idle.
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReaderStats {
    /// Data bytes seen while hunting for a command byte.
    pub stray_bytes: u32,
    pub dropped_frames: u32,
}

#[derive(Debug, Default)]
pub struct PacketReader {
    /// Command byte that cut the previous packet short.
    pending: Option<u8>,
    stats: ReaderStats,
}

impl PacketReader {
    pub const fn new() -> Self {
        Self {
            pending: None,
            stats: ReaderStats {
                stray_bytes: 0,
                dropped_frames: 0,
            },
        }
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Scan for the next command byte and frame the packet that follows it.
    pub async fn next_event<S: ByteSource>(&mut self, src: &mut S) -> Result<ReadEvent, LinkError> {
        let event = self.frame(src).await?;
        if let ReadEvent::Dropped(_) = event {
            self.stats.dropped_frames = self.stats.dropped_frames.wrapping_add(1);
        }
        Ok(event)
    }

    async fn frame<S: ByteSource>(&mut self, src: &mut S) -> Result<ReadEvent, LinkError> {
        /* ---- IDLE ---- */
        let command = loop {
            let byte = match self.pending.take() {
                Some(b) => b,
                None => match src.read_byte().await? {
                    Some(b) => b,
                    None => return Ok(ReadEvent::Idle),
                },
            };
            if byte & COMMAND_FLAG == 0 {
                self.stats.stray_bytes = self.stats.stray_bytes.wrapping_add(1);
                continue;
            }
            match Command::from_byte(byte) {
                Some(cmd) => break cmd,
                None => return Ok(ReadEvent::Dropped(FrameError::UnknownCommand(byte))),
            }
        };

        /* ---- HEADER ---- */
        let start = match self.data_byte(src, FrameError::HeaderTimeout).await? {
            Ok(b) => b,
            Err(e) => return Ok(ReadEvent::Dropped(e)),
        };
        let count = match self.data_byte(src, FrameError::HeaderTimeout).await? {
            Ok(b) => b,
            Err(e) => return Ok(ReadEvent::Dropped(e)),
        };

        /* ---- SET_PAYLOAD ---- */
        let mut payload = Vec::new();
        if command == Command::Set {
            for received in 0..count {
                let timeout = FrameError::PayloadTimeout {
                    received,
                    expected: count,
                };
                let lo = match self.data_byte(src, timeout).await? {
                    Ok(b) => b,
                    Err(e) => return Ok(ReadEvent::Dropped(e)),
                };
                let hi = match self.data_byte(src, timeout).await? {
                    Ok(b) => b,
                    Err(e) => return Ok(ReadEvent::Dropped(e)),
                };
                // count < 128 always fits
                let _ = payload.push(codec::decode(lo, hi));
            }
        }

        Ok(ReadEvent::Packet(CommandPacket {
            command,
            start,
            count,
            payload,
        }))
    }

    /// One 7-bit-clean byte inside a packet. A command byte here aborts the
    /// packet and is kept for the next scan.
    async fn data_byte<S: ByteSource>(
        &mut self,
        src: &mut S,
        on_timeout: FrameError,
    ) -> Result<Result<u8, FrameError>, LinkError> {
        match src.read_byte().await? {
            None => Ok(Err(on_timeout)),
            Some(b) if b & COMMAND_FLAG != 0 => {
                self.pending = Some(b);
                Ok(Err(FrameError::Interrupted(b)))
            }
            Some(b) => Ok(Ok(b)),
        }
    }
}
