pub mod analog;
pub mod gpio;
pub mod led;
pub mod servo;

#[cfg(feature = "servo2040")]
pub mod usb_link;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use gpio::GpioOutputs;
pub use servo::{FrameSink, ServoCluster, ServoFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    AdcConversion,
    UnknownPin(u8),
    Pin,
}

/// Pulse generator for the servo channels.
///
/// Stored pulses survive `disable_all`; `assert` tells the driver whether the
/// new pulse may reach the pin right away.
pub trait PulseOutputs {
    fn set_pulse(&mut self, servo: u8, pulse_us: u16, assert: bool);
    fn pulse(&self, servo: u8) -> u16;
    fn enable_all(&mut self);
    fn disable_all(&mut self);
}

/// Shared ADC behind an address-select multiplexer. `select` changes what the
/// next read returns, so the owner must not interleave readers.
#[allow(async_fn_in_trait)]
pub trait AnalogInputs {
    fn select(&mut self, address: u8);
    /// Volts at the selected input, with that input's front-end gain removed.
    async fn read_voltage(&mut self) -> Result<f32, DriverError>;
    /// Amps through the shunt on the selected input.
    async fn read_current(&mut self) -> Result<f32, DriverError>;
}

/// Plain digital outputs addressed by GPIO number.
pub trait DigitalOutputs {
    fn write(&mut self, pin: u8, high: bool) -> Result<(), DriverError>;
    fn is_high(&mut self, pin: u8) -> Result<bool, DriverError>;
}
