use embedded_hal::digital::StatefulOutputPin;

use super::{DigitalOutputs, DriverError};
use crate::protocol::channel::{A1_GPIO, A2_GPIO, RELAY_GPIO};

/// Relay plus the two auxiliary outputs, in that order.
pub struct GpioOutputs<P> {
    pins: [P; 3],
}

impl<P: StatefulOutputPin> GpioOutputs<P> {
    pub fn new(pins: [P; 3]) -> Self {
        Self { pins }
    }

    fn pin(&mut self, gpio: u8) -> Result<&mut P, DriverError> {
        let slot = match gpio {
            RELAY_GPIO => 0,
            A1_GPIO => 1,
            A2_GPIO => 2,
            other => return Err(DriverError::UnknownPin(other)),
        };
        Ok(&mut self.pins[slot])
    }
}

impl<P: StatefulOutputPin> DigitalOutputs for GpioOutputs<P> {
    fn write(&mut self, pin: u8, high: bool) -> Result<(), DriverError> {
        let p = self.pin(pin)?;
        let res = if high { p.set_high() } else { p.set_low() };
        res.map_err(|_| DriverError::Pin)
    }

    fn is_high(&mut self, pin: u8) -> Result<bool, DriverError> {
        self.pin(pin)?.is_set_high().map_err(|_| DriverError::Pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::MockPin;

    fn outputs() -> GpioOutputs<MockPin> {
        GpioOutputs::new([MockPin::default(), MockPin::default(), MockPin::default()])
    }

    #[test]
    fn writes_reach_the_right_pin() {
        let mut gpio = outputs();
        gpio.write(A1_GPIO, true).unwrap();
        assert_eq!(gpio.is_high(A1_GPIO), Ok(true));
        assert_eq!(gpio.is_high(RELAY_GPIO), Ok(false));
        assert_eq!(gpio.is_high(A2_GPIO), Ok(false));

        gpio.write(A1_GPIO, false).unwrap();
        assert_eq!(gpio.is_high(A1_GPIO), Ok(false));
    }

    #[test]
    fn unknown_pin_is_an_error() {
        let mut gpio = outputs();
        assert_eq!(gpio.write(3, true), Err(DriverError::UnknownPin(3)));
        assert_eq!(gpio.is_high(29), Err(DriverError::UnknownPin(29)));
    }

    #[test]
    fn pin_errors_are_mapped() {
        let mut gpio = GpioOutputs::new([MockPin::broken(), MockPin::default(), MockPin::default()]);
        assert_eq!(gpio.write(RELAY_GPIO, true), Err(DriverError::Pin));
        assert_eq!(gpio.is_high(RELAY_GPIO), Err(DriverError::Pin));
    }
}
