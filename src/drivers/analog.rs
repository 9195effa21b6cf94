//! Shared ADC behind the 3-bit address mux.
//!
//! Every analog input shares GPIO 29; the mux address decides which one the
//! next conversion sees. Each address has its own front end, so raw counts
//! are converted with the gain and offset of whatever is currently selected.

use crate::config::{
    ADC_FULL_SCALE, ADC_REFERENCE_V, CURRENT_GAIN, CURRENT_OFFSET_V, SHUNT_RESISTOR_OHM,
    VOLTAGE_GAIN,
};
use crate::protocol::channel::{CURRENT_SENSE_ADDR, VOLTAGE_SENSE_ADDR};

/// Amplifier gain and input offset in front of the ADC pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontEnd {
    pub gain: f32,
    pub offset_v: f32,
}

pub const TOUCH_SENSOR: FrontEnd = FrontEnd {
    gain: 1.0,
    offset_v: 0.0,
};
pub const BUS_VOLTAGE: FrontEnd = FrontEnd {
    gain: VOLTAGE_GAIN,
    offset_v: 0.0,
};
pub const SHUNT_CURRENT: FrontEnd = FrontEnd {
    gain: CURRENT_GAIN,
    offset_v: CURRENT_OFFSET_V,
};

impl FrontEnd {
    /// Volts at the input side of the front end.
    pub fn volts(&self, raw: u16) -> f32 {
        let pin_v = raw as f32 * ADC_REFERENCE_V / ADC_FULL_SCALE;
        (pin_v + self.offset_v).max(0.0) / self.gain
    }
}

pub fn front_end(address: u8) -> FrontEnd {
    match address {
        VOLTAGE_SENSE_ADDR => BUS_VOLTAGE,
        CURRENT_SENSE_ADDR => SHUNT_CURRENT,
        _ => TOUCH_SENSOR,
    }
}

/// Touch inputs float when unplugged; pull them down so they read 0.
pub fn pulled_down(address: u8) -> bool {
    !matches!(address, VOLTAGE_SENSE_ADDR | CURRENT_SENSE_ADDR)
}

pub fn shunt_amps(raw: u16) -> f32 {
    SHUNT_CURRENT.volts(raw) / SHUNT_RESISTOR_OHM
}

#[cfg(feature = "servo2040")]
pub use self::hw::MuxedAdc;

#[cfg(feature = "servo2040")]
mod hw {
    use embassy_rp::adc::{Adc, Async, Channel};
    use embassy_rp::gpio::{Level, Output, Pull};
    use embassy_rp::peripherals::PIN_29;
    use embassy_rp::{into_ref, Peripheral, PeripheralRef};

    use super::{front_end, pulled_down, shunt_amps};
    use crate::drivers::{AnalogInputs, DriverError};

    pub struct MuxedAdc<'d> {
        adc: Adc<'d, Async>,
        pin: PeripheralRef<'d, PIN_29>,
        /// Address bits 0..=2
        addr: [Output<'d>; 3],
        selected: u8,
    }

    impl<'d> MuxedAdc<'d> {
        pub fn new(
            adc: Adc<'d, Async>,
            pin: impl Peripheral<P = PIN_29> + 'd,
            addr: [Output<'d>; 3],
        ) -> Self {
            into_ref!(pin);
            let mut this = Self {
                adc,
                pin,
                addr,
                selected: 0,
            };
            this.select(0);
            this
        }

        async fn sample(&mut self) -> Result<u16, DriverError> {
            let pull = if pulled_down(self.selected) {
                Pull::Down
            } else {
                Pull::None
            };
            let mut ch = Channel::new_pin(self.pin.reborrow(), pull);
            self.adc
                .read(&mut ch)
                .await
                .map_err(|_| DriverError::AdcConversion)
        }
    }

    impl AnalogInputs for MuxedAdc<'_> {
        fn select(&mut self, address: u8) {
            for (bit, pin) in self.addr.iter_mut().enumerate() {
                pin.set_level(Level::from(address & (1 << bit) != 0));
            }
            self.selected = address;
        }

        async fn read_voltage(&mut self) -> Result<f32, DriverError> {
            let raw = self.sample().await?;
            Ok(front_end(self.selected).volts(raw))
        }

        async fn read_current(&mut self) -> Result<f32, DriverError> {
            let raw = self.sample().await?;
            Ok(shunt_amps(raw))
        }
    }
}
