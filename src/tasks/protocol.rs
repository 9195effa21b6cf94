use embassy_executor::task;
use embassy_futures::select::select;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::PIO1;

use crate::drivers::analog::MuxedAdc;
use crate::drivers::led::LedBar;
use crate::drivers::usb_link::UsbLink;
use crate::drivers::{GpioOutputs, ServoCluster};
use crate::ipc::FrameSignal;
use crate::protocol::CommandEngine;

pub type FirmwareEngine =
    CommandEngine<ServoCluster<FrameSignal>, MuxedAdc<'static>, GpioOutputs<Output<'static>>>;

/// Host session loop.
///
/// Plays the LED animation until the host opens the port, then drains
/// packets until the link drops. Actuator state survives a reconnect.
#[task]
pub async fn protocol_task(
    mut link: UsbLink,
    mut leds: LedBar<'static, PIO1, 0>,
    mut engine: FirmwareEngine,
) {
    loop {
        crate::log_info!("waiting for host");
        select(link.wait_ready(), leds.idle_animation()).await;
        leds.clear().await;
        crate::log_info!("host connected");

        loop {
            match engine.poll(&mut link).await {
                Ok(_) => yield_now().await,
                Err(e) => {
                    crate::log_warn!("link lost: {:?}", e);
                    break;
                }
            }
        }

        crate::log_info!("session stats: {:?}", engine.stats());
    }
}
