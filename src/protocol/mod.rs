//! Host command protocol
//! ===========================================================
//!
//! Byte stream layout (no end-of-packet marker beyond `count`):
//!
//! ```text
//! SET  : [0xD3][start][count]  lo0 hi0  lo1 hi1 ...   (count pairs)
//! GET  : [0xC7][start][count]
//! reply: [0xC7][start][count]  lo0 hi0  lo1 hi1 ...   (count pairs)
//! ```
//!
//! Command bytes are the only bytes on the wire with the top bit set; every
//! header and payload byte is 7-bit clean.

pub mod channel;
pub mod codec;
pub mod engine;
pub mod error;
pub mod gate;
pub mod reader;
pub mod writer;

use heapless::Vec;

pub use channel::{ChannelKind, GpioRole, Resource, SensorKind, CHANNEL_COUNT};
pub use engine::{CommandEngine, EngineStats};
pub use error::{DispatchError, FrameError, LinkError};
pub use gate::ActuationGate;
pub use reader::{ByteSource, PacketReader, ReadEvent};
pub use writer::ResponseWriter;

/* ───── Wire constants ──────────────────────────────────────────────── */
pub const SET_CMD: u8 = 0xD3; // 'S' | 0x80
pub const GET_CMD: u8 = 0xC7; // 'G' | 0x80
pub const COMMAND_FLAG: u8 = 0x80;

/// Largest `count` the single header byte can carry.
pub const MAX_COUNT: usize = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Set,
    Get,
}

impl Command {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SET_CMD => Some(Self::Set),
            GET_CMD => Some(Self::Get),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Self::Set => SET_CMD,
            Self::Get => GET_CMD,
        }
    }
}

/// One framed command. Only SET carries a payload, one decoded value per
/// addressed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPacket {
    pub command: Command,
    pub start: u8,
    pub count: u8,
    pub payload: Vec<u16, MAX_COUNT>,
}

impl CommandPacket {
    pub fn get(start: u8, count: u8) -> Self {
        Self {
            command: Command::Get,
            start,
            count,
            payload: Vec::new(),
        }
    }

    /// Build a SET packet; values past `MAX_COUNT` are dropped.
    pub fn set(start: u8, values: &[u16]) -> Self {
        let mut payload = Vec::new();
        for &v in values.iter().take(MAX_COUNT) {
            let _ = payload.push(v & codec::VALUE_MASK);
        }
        Self {
            command: Command::Set,
            start,
            count: payload.len() as u8,
            payload,
        }
    }
}
