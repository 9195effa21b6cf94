pub mod protocol;
pub mod servo;
pub mod usb;

pub use protocol::{protocol_task, FirmwareEngine};
pub use servo::servo_frame_task;
pub use usb::usb_device_task;
