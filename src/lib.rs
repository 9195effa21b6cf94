#![cfg_attr(not(test), no_std)]

mod logging;

pub mod config;
pub mod drivers;
pub mod protocol;

#[cfg(feature = "servo2040")]
pub mod board;
#[cfg(feature = "servo2040")]
pub mod ipc;
#[cfg(feature = "servo2040")]
pub mod tasks;

#[cfg(feature = "servo2040")]
pub use board::Board;
pub use protocol::{CommandEngine, EngineStats};
