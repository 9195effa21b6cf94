use smart_leds::hsv::{hsv2rgb, Hsv};
use smart_leds::RGB8;

use crate::config::{LED_BRIGHTNESS, LED_COUNT, LED_HUE_STEP};

pub const OFF: [RGB8; LED_COUNT] = [RGB8 { r: 0, g: 0, b: 0 }; LED_COUNT];

/// Rainbow spread evenly over the bar, rotated by `offset` turns.
pub fn rainbow(offset: f32) -> [RGB8; LED_COUNT] {
    let val = (LED_BRIGHTNESS * 255.0) as u8;
    core::array::from_fn(|i| {
        let mut hue = i as f32 / LED_COUNT as f32 + offset;
        if hue >= 1.0 {
            hue -= 1.0;
        }
        hsv2rgb(Hsv {
            hue: (hue * 256.0) as u8,
            sat: 255,
            val,
        })
    })
}

/// Next animation offset, kept in `[0, 1)`.
pub fn advance(offset: f32) -> f32 {
    let next = offset + LED_HUE_STEP;
    if next >= 1.0 {
        next - 1.0
    } else {
        next
    }
}

#[cfg(feature = "servo2040")]
pub use self::hw::LedBar;

#[cfg(feature = "servo2040")]
mod hw {
    use embassy_rp::pio::Instance;
    use embassy_rp::pio_programs::ws2812::PioWs2812;
    use embassy_time::Timer;

    use super::{advance, rainbow, OFF};
    use crate::config::{LED_COUNT, LED_UPDATE_HZ};

    pub struct LedBar<'d, P: Instance, const SM: usize> {
        ws: PioWs2812<'d, P, SM, LED_COUNT>,
        offset: f32,
    }

    impl<'d, P: Instance, const SM: usize> LedBar<'d, P, SM> {
        pub fn new(ws: PioWs2812<'d, P, SM, LED_COUNT>) -> Self {
            Self { ws, offset: 0.0 }
        }

        /// "Waiting for host" animation. Never returns; race it against
        /// whatever ends the wait.
        pub async fn idle_animation(&mut self) {
            loop {
                self.ws.write(&rainbow(self.offset)).await;
                self.offset = advance(self.offset);
                Timer::after_millis(1000 / LED_UPDATE_HZ).await;
            }
        }

        pub async fn clear(&mut self) {
            self.ws.write(&OFF).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rainbow_is_dimmed_and_spread() {
        let frame = rainbow(0.0);
        let max = (LED_BRIGHTNESS * 255.0) as u8;
        for led in frame.iter() {
            assert!(led.r <= max && led.g <= max && led.b <= max);
            assert!(*led != RGB8::default());
        }
        // first LED sits on pure red
        assert_eq!(frame[0].g, 0);
        assert_eq!(frame[0].b, 0);
        assert_ne!(frame[0], frame[3]);
    }

    #[test]
    fn offset_rotates_and_wraps() {
        assert_eq!(rainbow(1.0 / LED_COUNT as f32)[0], rainbow(0.0)[1]);
        let mut offset = 0.0;
        for _ in 0..1000 {
            offset = advance(offset);
            assert!((0.0..1.0).contains(&offset));
        }
    }
}
