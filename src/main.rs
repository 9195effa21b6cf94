#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use servo_io::{
    drivers::{usb_link, ServoCluster},
    ipc::FrameSignal,
    protocol::CommandEngine,
    tasks::{protocol_task, servo_frame_task, usb_device_task},
    Board,
};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting servo2040-io");
    let board = Board::init();
    let (usb, link) = usb_link::init(board.usb);

    // Starts disabled with relay/aux low
    let engine = CommandEngine::new(ServoCluster::new(FrameSignal), board.sensors, board.outputs);

    spawner.spawn(usb_device_task(usb)).unwrap();
    spawner.spawn(servo_frame_task(board.servos)).unwrap();
    spawner.spawn(protocol_task(link, board.leds, engine)).unwrap();
    info!("tasks spawned");

    let _pio = (board.pio0, board.pio1);
    core::future::pending::<()>().await;
}
