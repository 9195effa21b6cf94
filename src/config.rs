// Centralize all configuration constants

// Serial link
pub const BYTE_TIMEOUT_US: u64 = 100; // 10 bits / 115200 bps = 86.8 us
pub const USB_VID: u16 = 0x2e8a;
pub const USB_PID: u16 = 0x000a;
pub const USB_PACKET_SIZE: usize = 64;
pub const LINK_READY_POLL_MS: u64 = 10;

// Servo outputs (GPIO 0..=17)
pub const SERVO_COUNT: usize = 18;
pub const SERVO_FRAME_US: u32 = 20_000;
pub const SERVO_MIN_PULSE_US: u16 = 500;
pub const SERVO_MAX_PULSE_US: u16 = 2_500;
pub const SERVO_DEFAULT_PULSE_US: u16 = 1_500;

// Analog front end (shared ADC behind a 3-bit mux)
pub const ADC_REFERENCE_V: f32 = 3.3;
pub const ADC_FULL_SCALE: f32 = 4096.0;
pub const VOLTAGE_GAIN: f32 = 3.9 / 13.9;
pub const CURRENT_GAIN: f32 = 69.0;
pub const SHUNT_RESISTOR_OHM: f32 = 0.003;
pub const CURRENT_OFFSET_V: f32 = -0.02;

// Status LEDs
pub const LED_COUNT: usize = 6;
pub const LED_BRIGHTNESS: f32 = 0.3;
pub const LED_UPDATE_HZ: u64 = 50;
pub const LED_HUE_STEP: f32 = 0.005;
