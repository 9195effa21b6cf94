//! PIO pulse generator
//! ===========================================================
//!
//! One state machine drives all 18 servo pins at once from a DMA-fed
//! `(mask, delay)` stream, so every pulse in a frame shares the same rising
//! edge and no PWM slice pairing constrains which pins can hold which width.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::dma::Channel;
use embassy_rp::pio::{
    Common, Config, Direction, FifoJoin, Instance, Pin, ShiftConfig, ShiftDirection,
    StateMachine,
};
use embassy_rp::{into_ref, Peripheral, PeripheralRef};

use super::frame::{ServoFrame, TIMELINE_WORDS};
use crate::config::SERVO_COUNT;

pub struct ServoPio<'d, P: Instance, const SM: usize, D: Channel> {
    sm: StateMachine<'d, P, SM>,
    dma: PeripheralRef<'d, D>,
    cycles_per_us: u32,
    words: [u32; TIMELINE_WORDS],
    len: usize,
}

impl<'d, P: Instance, const SM: usize, D: Channel> ServoPio<'d, P, SM, D> {
    pub fn new(
        common: &mut Common<'d, P>,
        mut sm: StateMachine<'d, P, SM>,
        dma: impl Peripheral<P = D> + 'd,
        pins: &[Pin<'d, P>; SERVO_COUNT],
    ) -> Self {
        into_ref!(dma);

        let prg = pio_proc::pio_asm!(
            ".wrap_target",
            "    out pins, 32",
            "    out x, 32",
            "delay:",
            "    jmp x-- delay",
            ".wrap",
        );

        let pin_refs: [&Pin<'d, P>; SERVO_COUNT] = core::array::from_fn(|i| &pins[i]);

        let mut cfg = Config::default();
        cfg.use_program(&common.load_program(&prg.program), &[]);
        cfg.set_out_pins(&pin_refs);
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 32,
            direction: ShiftDirection::Right,
        };
        cfg.fifo_join = FifoJoin::TxOnly;

        sm.set_config(&cfg);
        sm.set_pin_dirs(Direction::Out, &pin_refs);
        sm.set_enable(true);

        let cycles_per_us = clk_sys_freq() / 1_000_000;
        let mut words = [0; TIMELINE_WORDS];
        let len = ServoFrame::idle().timeline(cycles_per_us, &mut words);

        Self {
            sm,
            dma,
            cycles_per_us,
            words,
            len,
        }
    }

    /// Replace the frame repeated by `run_frame`.
    pub fn load(&mut self, frame: &ServoFrame) {
        self.len = frame.timeline(self.cycles_per_us, &mut self.words);
    }

    /// Stream one period of the loaded frame. Resolves once the last word is
    /// in the FIFO, roughly one period later.
    pub async fn run_frame(&mut self) {
        self.sm
            .tx()
            .dma_push(self.dma.reborrow(), &self.words[..self.len])
            .await;
    }
}
