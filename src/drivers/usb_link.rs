//! USB CDC-ACM transport
//! ===========================================================
//!
//! The host sees a plain serial port. Inbound USB packets are unpacked into a
//! byte stream for the packet reader; replies are packed into full-size USB
//! packets and pushed out on `flush`.

use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::{with_timeout, Duration, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use heapless::Vec;
use static_cell::StaticCell;

use crate::config::{BYTE_TIMEOUT_US, LINK_READY_POLL_MS, USB_PACKET_SIZE, USB_PID, USB_VID};
use crate::protocol::{ByteSource, LinkError, ResponseWriter};

pub type UsbDriver = Driver<'static, USB>;

impl From<EndpointError> for LinkError {
    fn from(e: EndpointError) -> Self {
        match e {
            EndpointError::BufferOverflow => Self::Overflow,
            EndpointError::Disabled => Self::Disconnected,
        }
    }
}

/* ------------------------------------------------------------------------- */
/*  Device bring-up                                                          */
/* ------------------------------------------------------------------------- */

/// Build the USB device and its single CDC-ACM interface. Call once.
pub fn init(driver: UsbDriver) -> (UsbDevice<'static, UsbDriver>, UsbLink) {
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static STATE: StaticCell<State> = StaticCell::new();

    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some("Pimoroni");
    config.product = Some("Servo 2040 I/O");
    config.serial_number = Some("SERVO2040");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, STATE.init(State::new()), USB_PACKET_SIZE as u16);

    (builder.build(), UsbLink::new(class))
}

/* ------------------------------------------------------------------------- */
/*  Byte link                                                                */
/* ------------------------------------------------------------------------- */

pub struct UsbLink {
    class: CdcAcmClass<'static, UsbDriver>,
    rx: [u8; USB_PACKET_SIZE],
    rx_len: usize,
    rx_pos: usize,
    tx: Vec<u8, USB_PACKET_SIZE>,
    /// Last packet sent was full-size; the host needs a ZLP to see the end.
    needs_zlp: bool,
}

impl UsbLink {
    pub fn new(class: CdcAcmClass<'static, UsbDriver>) -> Self {
        Self {
            class,
            rx: [0; USB_PACKET_SIZE],
            rx_len: 0,
            rx_pos: 0,
            tx: Vec::new(),
            needs_zlp: false,
        }
    }

    /// Wait until the host has the port open (DTR asserted).
    pub async fn wait_ready(&mut self) {
        loop {
            self.class.wait_connection().await;
            if self.class.dtr() {
                break;
            }
            Timer::after_millis(LINK_READY_POLL_MS).await;
        }
        self.rx_len = 0;
        self.rx_pos = 0;
        self.tx.clear();
        self.needs_zlp = false;
    }

    async fn send_tx(&mut self) -> Result<(), LinkError> {
        self.class.write_packet(&self.tx).await?;
        self.needs_zlp = self.tx.len() == USB_PACKET_SIZE;
        self.tx.clear();
        Ok(())
    }
}

impl ByteSource for UsbLink {
    async fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        if self.rx_pos < self.rx_len {
            let b = self.rx[self.rx_pos];
            self.rx_pos += 1;
            return Ok(Some(b));
        }
        if !self.class.dtr() {
            return Err(LinkError::Disconnected);
        }

        let timeout = Duration::from_micros(BYTE_TIMEOUT_US);
        match with_timeout(timeout, self.class.read_packet(&mut self.rx)).await {
            Err(_) => Ok(None),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(n)) => {
                self.rx_len = n;
                self.rx_pos = 1;
                Ok(Some(self.rx[0]))
            }
        }
    }
}

impl ResponseWriter for UsbLink {
    async fn emit(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        for &b in bytes {
            if self.tx.is_full() {
                self.send_tx().await?;
            }
            // room was just made
            let _ = self.tx.push(b);
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), LinkError> {
        if !self.tx.is_empty() {
            self.send_tx().await?;
        }
        if self.needs_zlp {
            self.class.write_packet(&[]).await?;
            self.needs_zlp = false;
        }
        Ok(())
    }
}
