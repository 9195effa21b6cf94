pub mod cluster;
pub mod frame;

#[cfg(feature = "servo2040")]
pub mod pio;

pub use cluster::{clamp_pulse, FrameSink, ServoCluster};
pub use frame::{ServoFrame, TIMELINE_WORDS};

#[cfg(feature = "servo2040")]
pub use pio::ServoPio;
