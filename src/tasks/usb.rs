use embassy_executor::task;
use embassy_usb::UsbDevice;

use crate::drivers::usb_link::UsbDriver;

#[task]
pub async fn usb_device_task(mut usb: UsbDevice<'static, UsbDriver>) {
    usb.run().await;
}
