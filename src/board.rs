use embassy_rp::adc::{self, Adc};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0, PIO1, USB};
use embassy_rp::pio::{self, Common, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::{bind_interrupts, usb};

use crate::drivers::analog::MuxedAdc;
use crate::drivers::led::LedBar;
use crate::drivers::servo::ServoPio;
use crate::drivers::usb_link::UsbDriver;
use crate::drivers::GpioOutputs;

// ── IRQ table ─────────────────────────────────────────────
bind_interrupts!(pub struct Irqs {
    USBCTRL_IRQ  => usb::InterruptHandler<USB>;
    PIO0_IRQ_0   => pio::InterruptHandler<PIO0>;
    PIO1_IRQ_0   => pio::InterruptHandler<PIO1>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    pub servos: ServoPio<'static, PIO0, 0, DMA_CH0>,
    pub leds: LedBar<'static, PIO1, 0>,
    pub sensors: MuxedAdc<'static>,
    /// Relay, A1, A2
    pub outputs: GpioOutputs<Output<'static>>,
    pub usb: UsbDriver,
    /// Keep the PIO blocks alive for as long as their state machines run.
    pub pio0: Common<'static, PIO0>,
    pub pio1: Common<'static, PIO1>,
}

impl Board {
    pub fn init() -> Self {
        let p = embassy_rp::init(Default::default());

        // Servo pulses: PIO0 SM0 on GPIO 0..=17
        let Pio {
            common: mut pio0,
            sm0: servo_sm,
            ..
        } = Pio::new(p.PIO0, Irqs);
        let servo_pins = [
            pio0.make_pio_pin(p.PIN_0),
            pio0.make_pio_pin(p.PIN_1),
            pio0.make_pio_pin(p.PIN_2),
            pio0.make_pio_pin(p.PIN_3),
            pio0.make_pio_pin(p.PIN_4),
            pio0.make_pio_pin(p.PIN_5),
            pio0.make_pio_pin(p.PIN_6),
            pio0.make_pio_pin(p.PIN_7),
            pio0.make_pio_pin(p.PIN_8),
            pio0.make_pio_pin(p.PIN_9),
            pio0.make_pio_pin(p.PIN_10),
            pio0.make_pio_pin(p.PIN_11),
            pio0.make_pio_pin(p.PIN_12),
            pio0.make_pio_pin(p.PIN_13),
            pio0.make_pio_pin(p.PIN_14),
            pio0.make_pio_pin(p.PIN_15),
            pio0.make_pio_pin(p.PIN_16),
            pio0.make_pio_pin(p.PIN_17),
        ];
        let servos = ServoPio::new(&mut pio0, servo_sm, p.DMA_CH0, &servo_pins);

        // LED bar: PIO1 SM0 on GPIO 18
        let Pio {
            common: mut pio1,
            sm0: led_sm,
            ..
        } = Pio::new(p.PIO1, Irqs);
        let ws_program = PioWs2812Program::new(&mut pio1);
        let leds = LedBar::new(PioWs2812::new(
            &mut pio1,
            led_sm,
            p.DMA_CH1,
            p.PIN_18,
            &ws_program,
        ));

        // Analog mux: address on GPIO 22/24/25, shared ADC on GPIO 29
        let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
        let mux_addr = [
            Output::new(p.PIN_22, Level::Low),
            Output::new(p.PIN_24, Level::Low),
            Output::new(p.PIN_25, Level::Low),
        ];
        let sensors = MuxedAdc::new(adc, p.PIN_29, mux_addr);

        let outputs = GpioOutputs::new([
            Output::new(p.PIN_26, Level::Low),
            Output::new(p.PIN_27, Level::Low),
            Output::new(p.PIN_28, Level::Low),
        ]);

        let usb = usb::Driver::new(p.USB, Irqs);

        Self {
            servos,
            leds,
            sensors,
            outputs,
            usb,
            pio0,
            pio1,
        }
    }
}
