use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex as RawMutex, signal::Signal};

use crate::drivers::servo::{FrameSink, ServoFrame};

/// Latest servo frame for the pulse task. Only the newest frame matters, so a
/// signal (overwrite on send) rather than a queue.
pub static SERVO_FRAME: Signal<RawMutex, ServoFrame> = Signal::new();

/// Frame sink that hands frames to the pulse task.
pub struct FrameSignal;

impl FrameSink for FrameSignal {
    fn publish(&mut self, frame: ServoFrame) {
        SERVO_FRAME.signal(frame);
    }
}
