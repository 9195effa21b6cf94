use super::frame::ServoFrame;
use crate::config::{SERVO_COUNT, SERVO_DEFAULT_PULSE_US, SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US};
use crate::drivers::PulseOutputs;

/// Receives every frame the cluster wants on the pins.
pub trait FrameSink {
    fn publish(&mut self, frame: ServoFrame);
}

/// Clamp to the servo's mechanical range; 0 stays 0 (no pulse).
#[inline]
pub fn clamp_pulse(pulse_us: u16) -> u16 {
    if pulse_us == 0 {
        0
    } else {
        pulse_us.clamp(SERVO_MIN_PULSE_US, SERVO_MAX_PULSE_US)
    }
}

/// The 18 servo outputs driven as one unit. Pulse widths are stored here and
/// pushed to the sink as whole frames.
pub struct ServoCluster<S> {
    sink: S,
    /// `None` until the host writes the channel.
    pulses: [Option<u16>; SERVO_COUNT],
    enabled: bool,
}

impl<S: FrameSink> ServoCluster<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pulses: [None; SERVO_COUNT],
            enabled: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn frame(&self) -> ServoFrame {
        let mut frame = ServoFrame::idle();
        if self.enabled {
            for (out, p) in frame.pulses.iter_mut().zip(self.pulses.iter()) {
                *out = p.unwrap_or(0);
            }
        }
        frame
    }

    fn publish(&mut self) {
        let frame = self.frame();
        self.sink.publish(frame);
    }
}

impl<S: FrameSink> PulseOutputs for ServoCluster<S> {
    fn set_pulse(&mut self, servo: u8, pulse_us: u16, assert: bool) {
        let Some(slot) = self.pulses.get_mut(servo as usize) else {
            crate::log_warn!("servo {} out of range", servo);
            return;
        };
        *slot = Some(clamp_pulse(pulse_us));
        if assert && self.enabled {
            self.publish();
        }
    }

    fn pulse(&self, servo: u8) -> u16 {
        self.pulses
            .get(servo as usize)
            .copied()
            .flatten()
            .unwrap_or(0)
    }

    fn enable_all(&mut self) {
        for p in self.pulses.iter_mut().filter(|p| p.is_none()) {
            *p = Some(SERVO_DEFAULT_PULSE_US);
        }
        self.enabled = true;
        self.publish();
    }

    fn disable_all(&mut self) {
        self.enabled = false;
        self.publish();
    }
}
