use embassy_executor::task;
use embassy_rp::peripherals::{DMA_CH0, PIO0};

use crate::drivers::servo::ServoPio;
use crate::ipc::SERVO_FRAME;

/// Streams servo frames back to back. A new frame from the engine takes
/// effect at the next 20 ms boundary; otherwise the last one repeats.
#[task]
pub async fn servo_frame_task(mut pio: ServoPio<'static, PIO0, 0, DMA_CH0>) {
    crate::log_info!("starting servo frame task");
    loop {
        if let Some(frame) = SERVO_FRAME.try_take() {
            crate::log_debug!("servo frame {:?}", frame.pulses);
            pio.load(&frame);
        }
        pio.run_frame().await;
    }
}
