//! One 20 ms servo period, flattened into the word stream the PIO pulse
//! program consumes.
//!
//! The program pulls `(pin mask, delay)` pairs: it drives the mask onto the
//! servo pins, then spins for `delay + 3` cycles. A frame starts with every
//! active pin high and clears pins in pulse-width order.

use crate::config::{SERVO_COUNT, SERVO_FRAME_US};

/// Worst case: one pair per distinct edge plus the opening pair.
pub const TIMELINE_WORDS: usize = 2 * (SERVO_COUNT + 1);

/// Cycles spent per pair outside the delay loop (two `out`s and the final
/// `jmp`).
const PAIR_OVERHEAD_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoFrame {
    /// Pulse width per servo in µs; 0 keeps the pin low.
    pub pulses: [u16; SERVO_COUNT],
}

impl Default for ServoFrame {
    fn default() -> Self {
        Self::idle()
    }
}

impl ServoFrame {
    pub const fn idle() -> Self {
        Self {
            pulses: [0; SERVO_COUNT],
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pulses.iter().all(|&p| p == 0)
    }

    /// Write the frame's timeline into `out` and return the number of words
    /// used. Servo `n` drives bit `n` of the mask.
    pub fn timeline(&self, cycles_per_us: u32, out: &mut [u32; TIMELINE_WORDS]) -> usize {
        let delay = |us: u32| (us * cycles_per_us).saturating_sub(PAIR_OVERHEAD_CYCLES);

        let mut edges = [(0u16, 0u8); SERVO_COUNT];
        let mut active = 0;
        let mut mask = 0u32;
        for (servo, &pulse) in self.pulses.iter().enumerate() {
            if pulse > 0 {
                edges[active] = (pulse, servo as u8);
                active += 1;
                mask |= 1 << servo;
            }
        }
        let edges = &mut edges[..active];
        edges.sort_unstable_by_key(|&(pulse, _)| pulse);

        let mut n = 0;
        let mut now = 0u32;
        let mut i = 0;
        while i < edges.len() {
            let edge = edges[i].0 as u32;
            out[n] = mask;
            out[n + 1] = delay(edge - now);
            n += 2;
            // Clear every pin that falls on this edge together.
            while i < edges.len() && edges[i].0 as u32 == edge {
                mask &= !(1 << edges[i].1);
                i += 1;
            }
            now = edge;
        }

        out[n] = mask;
        out[n + 1] = delay(SERVO_FRAME_US - now);
        n + 2
    }
}
