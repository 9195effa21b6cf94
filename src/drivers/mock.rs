//! Host-side stand-ins for the board peripherals.

use embedded_hal::digital::{Error, ErrorKind, ErrorType, OutputPin, StatefulOutputPin};
use heapless::{Deque, Vec};

use super::servo::{FrameSink, ServoFrame};
use super::{AnalogInputs, DriverError};
use crate::protocol::{ByteSource, LinkError, ResponseWriter};

const LINK_BUFFER: usize = 1024;

/* ------------------------------------------------------------------------- */
/*  Scripted serial link                                                     */
/* ------------------------------------------------------------------------- */

/// Feeds a fixed byte script, then reports a quiet link. Captures everything
/// written back.
#[derive(Debug, Default)]
pub struct MockLink {
    rx: Deque<u8, LINK_BUFFER>,
    tx: Vec<u8, LINK_BUFFER>,
    disconnect_when_drained: bool,
    write_limit: Option<usize>,
    flushes: usize,
}

impl MockLink {
    pub fn new(input: &[u8]) -> Self {
        let mut link = Self::default();
        for &b in input {
            let _ = link.rx.push_back(b);
        }
        link
    }

    /// Once the script runs out, fail reads as if the host hung up.
    pub fn disconnect_after_input(&mut self) {
        self.disconnect_when_drained = true;
    }

    /// Fail any write that would take the output past `bytes`.
    pub fn fail_writes_after(&mut self, bytes: usize) {
        self.write_limit = Some(bytes);
    }

    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl ByteSource for MockLink {
    async fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        match self.rx.pop_front() {
            Some(b) => Ok(Some(b)),
            None if self.disconnect_when_drained => Err(LinkError::Disconnected),
            None => Ok(None),
        }
    }
}

impl ResponseWriter for MockLink {
    async fn emit(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if let Some(limit) = self.write_limit {
            if self.tx.len() + bytes.len() > limit {
                return Err(LinkError::Disconnected);
            }
        }
        self.tx
            .extend_from_slice(bytes)
            .map_err(|_| LinkError::Overflow)
    }

    async fn flush(&mut self) -> Result<(), LinkError> {
        self.flushes += 1;
        Ok(())
    }
}

/* ------------------------------------------------------------------------- */
/*  Analog front end                                                         */
/* ------------------------------------------------------------------------- */

/// Fixed readings per mux address. Remembers every `select` in order.
#[derive(Debug, Default)]
pub struct MockSensors {
    pub voltages: [f32; 8],
    pub current: f32,
    /// Conversions at this address fail.
    pub fail_address: Option<u8>,
    address: u8,
    selected: Vec<u8, 64>,
}

impl MockSensors {
    pub fn selected(&self) -> &[u8] {
        &self.selected
    }

    fn check(&self) -> Result<(), DriverError> {
        if self.fail_address == Some(self.address) {
            Err(DriverError::AdcConversion)
        } else {
            Ok(())
        }
    }
}

impl AnalogInputs for MockSensors {
    fn select(&mut self, address: u8) {
        self.address = address;
        let _ = self.selected.push(address);
    }

    async fn read_voltage(&mut self) -> Result<f32, DriverError> {
        self.check()?;
        Ok(self.voltages[self.address as usize % 8])
    }

    async fn read_current(&mut self) -> Result<f32, DriverError> {
        self.check()?;
        Ok(self.current)
    }
}

/* ------------------------------------------------------------------------- */
/*  GPIO pin                                                                 */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPinError;

impl Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
    broken: bool,
}

impl MockPin {
    /// A pin whose every operation fails.
    pub fn broken() -> Self {
        Self {
            high: false,
            broken: true,
        }
    }

    fn ok(&self) -> Result<(), MockPinError> {
        if self.broken {
            Err(MockPinError)
        } else {
            Ok(())
        }
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.ok()?;
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.ok()?;
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.ok()?;
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.ok()?;
        Ok(!self.high)
    }
}

/* ------------------------------------------------------------------------- */
/*  Servo frame sink                                                         */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Default)]
pub struct RecordingSink {
    last: Option<ServoFrame>,
    published: usize,
}

impl RecordingSink {
    pub fn last(&self) -> Option<&ServoFrame> {
        self.last.as_ref()
    }

    pub fn published(&self) -> usize {
        self.published
    }
}

impl FrameSink for RecordingSink {
    fn publish(&mut self, frame: ServoFrame) {
        self.last = Some(frame);
        self.published += 1;
    }
}
