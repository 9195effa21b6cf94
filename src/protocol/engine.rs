//! Command dispatch
//! ===========================================================
//!
//! Owns every physical resource the host can address, so a packet is framed
//! and executed to completion before the next byte is read and the analog
//! mux is never reselected behind a reader's back.

use super::channel::{self, GpioRole, Resource, SensorKind, A1_GPIO, A2_GPIO, RELAY_GPIO};
use super::codec;
use super::error::{DispatchError, LinkError};
use super::gate::ActuationGate;
use super::reader::{ByteSource, PacketReader, ReadEvent};
use super::writer::ResponseWriter;
use super::{Command, CommandPacket, GET_CMD};
use crate::drivers::{AnalogInputs, DigitalOutputs, DriverError, PulseOutputs};

/// Value sent in a reply slot whose physical read failed.
pub const FAULT_SLOT_VALUE: u16 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    pub packets: u32,
    pub rejected_packets: u32,
    pub ignored_writes: u32,
    pub sensor_faults: u32,
    pub dropped_frames: u32,
    pub stray_bytes: u32,
}

pub struct CommandEngine<P, A, G> {
    servos: P,
    sensors: A,
    outputs: G,
    gate: ActuationGate,
    reader: PacketReader,
    stats: EngineStats,
}

impl<P, A, G> CommandEngine<P, A, G>
where
    P: PulseOutputs,
    A: AnalogInputs,
    G: DigitalOutputs,
{
    /// Takes ownership of the drivers and puts them in the power-on state:
    /// actuators disabled, relay and auxiliary outputs low.
    pub fn new(mut servos: P, sensors: A, mut outputs: G) -> Self {
        let mut gate = ActuationGate::new();
        gate.set_enabled(false, &mut servos);
        for pin in [RELAY_GPIO, A1_GPIO, A2_GPIO] {
            if let Err(e) = outputs.write(pin, false) {
                crate::log_error!("GPIO {} init failed: {:?}", pin, e);
            }
        }
        Self {
            servos,
            sensors,
            outputs,
            gate,
            reader: PacketReader::new(),
            stats: EngineStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    pub fn stats(&self) -> EngineStats {
        let rs = self.reader.stats();
        EngineStats {
            dropped_frames: rs.dropped_frames,
            stray_bytes: rs.stray_bytes,
            ..self.stats
        }
    }

    pub fn servos(&self) -> &P {
        &self.servos
    }

    pub fn sensors_mut(&mut self) -> &mut A {
        &mut self.sensors
    }

    pub fn outputs_mut(&mut self) -> &mut G {
        &mut self.outputs
    }

    /* ================= polling cycle ============================ */

    /// Drain every packet queued on the link. Returns once the link stays
    /// quiet for one byte timeout, with the number of packets executed.
    pub async fn poll<L>(&mut self, link: &mut L) -> Result<usize, LinkError>
    where
        L: ByteSource + ResponseWriter,
    {
        let mut executed = 0;
        loop {
            match self.reader.next_event(link).await? {
                ReadEvent::Idle => return Ok(executed),
                ReadEvent::Dropped(e) => {
                    crate::log_debug!("frame dropped: {:?}", e);
                }
                ReadEvent::Packet(packet) => match self.execute(&packet, link).await {
                    Ok(()) => executed += 1,
                    Err(DispatchError::Link(e)) => return Err(e),
                    Err(e) => {
                        self.stats.rejected_packets = self.stats.rejected_packets.wrapping_add(1);
                        crate::log_warn!("packet rejected: {:?}", e);
                    }
                },
            }
        }
    }

    /* ================= dispatch ============================ */

    /// Run one framed packet. The whole span is bounds-checked first, so a
    /// rejected packet has no side effects and produces no reply bytes.
    pub async fn execute<W: ResponseWriter>(
        &mut self,
        packet: &CommandPacket,
        out: &mut W,
    ) -> Result<(), DispatchError> {
        let span = channel::span(packet.start, packet.count)?;
        crate::log_debug!(
            "{:?} start={} count={}",
            packet.command,
            packet.start,
            packet.count
        );

        match packet.command {
            Command::Set => {
                for (idx, &value) in span.zip(packet.payload.iter()) {
                    self.write_channel(idx, value);
                }
            }
            Command::Get => {
                out.emit(&[GET_CMD, packet.start, packet.count]).await?;
                for idx in span {
                    let value = self.read_channel(idx).await;
                    out.emit(&codec::encode(value)).await?;
                }
                out.flush().await?;
            }
        }

        self.stats.packets = self.stats.packets.wrapping_add(1);
        Ok(())
    }

    fn write_channel(&mut self, idx: u8, value: u16) {
        let Some(resource) = channel::resource(idx) else {
            return;
        };
        match resource {
            Resource::Actuator(servo) => {
                self.servos
                    .set_pulse(servo, value, self.gate.is_enabled());
            }
            Resource::Gpio { pin, role } => {
                let on = value != 0;
                if let Err(e) = self.outputs.write(pin, on) {
                    crate::log_warn!("GPIO {} write failed: {:?}", pin, e);
                }
                if role == GpioRole::Relay {
                    self.gate.set_enabled(on, &mut self.servos);
                }
            }
            Resource::MuxSensor { .. } => {
                self.stats.ignored_writes = self.stats.ignored_writes.wrapping_add(1);
                crate::log_warn!("SET on read-only channel {} ignored", idx);
            }
        }
    }

    async fn read_channel(&mut self, idx: u8) -> u16 {
        let Some(resource) = channel::resource(idx) else {
            return FAULT_SLOT_VALUE;
        };
        let reading = match resource {
            Resource::Actuator(servo) => Ok(self.servos.pulse(servo)),
            Resource::Gpio { pin, .. } => self.outputs.is_high(pin).map(u16::from),
            Resource::MuxSensor { address, kind } => self.sense(address, kind).await,
        };
        reading.unwrap_or_else(|e| {
            self.stats.sensor_faults = self.stats.sensor_faults.wrapping_add(1);
            crate::log_warn!("channel {} read failed: {:?}", idx, e);
            FAULT_SLOT_VALUE
        })
    }

    async fn sense(&mut self, address: u8, kind: SensorKind) -> Result<u16, DriverError> {
        self.sensors.select(address);
        match kind {
            SensorKind::Touch | SensorKind::Voltage => {
                let volts = self.sensors.read_voltage().await?;
                Ok(codec::quantize_voltage(volts))
            }
            SensorKind::Current => {
                let amps = self.sensors.read_current().await?;
                Ok(codec::quantize_current(amps))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::{MockLink, MockPin, MockSensors, RecordingSink};
    use crate::drivers::{GpioOutputs, ServoCluster};
    use crate::protocol::channel::{CURR, RELAY, TS1, VOLT};
    use crate::protocol::SET_CMD;
    use embassy_futures::block_on;

    type TestEngine = CommandEngine<ServoCluster<RecordingSink>, MockSensors, GpioOutputs<MockPin>>;

    fn engine() -> TestEngine {
        CommandEngine::new(
            ServoCluster::new(RecordingSink::default()),
            MockSensors::default(),
            GpioOutputs::new([MockPin::default(), MockPin::default(), MockPin::default()]),
        )
    }

    fn run(engine: &mut TestEngine, bytes: &[u8]) -> std::vec::Vec<u8> {
        let mut link = MockLink::new(bytes);
        block_on(engine.poll(&mut link)).unwrap();
        link.written().to_vec()
    }

    fn set(start: u8, values: &[u16]) -> std::vec::Vec<u8> {
        let mut bytes = std::vec![SET_CMD, start, values.len() as u8];
        for &v in values {
            bytes.extend_from_slice(&codec::encode(v));
        }
        bytes
    }

    fn servo_output(engine: &TestEngine, servo: usize) -> u16 {
        engine.servos().sink().last().unwrap().pulses[servo]
    }

    #[test]
    fn powers_up_disabled_with_outputs_low() {
        let mut e = engine();
        assert!(!e.is_enabled());
        assert!(e.servos().sink().last().unwrap().is_idle());
        for pin in [RELAY_GPIO, A1_GPIO, A2_GPIO] {
            assert_eq!(e.outputs_mut().is_high(pin), Ok(false));
        }
    }

    #[test]
    fn scenario_a_set_then_get_pulse() {
        let mut e = engine();
        assert!(run(&mut e, &set(0, &[1500])).is_empty());
        assert_eq!(e.servos().pulse(0), 1500);

        let reply = run(&mut e, &[GET_CMD, 0, 1]);
        assert_eq!(reply, [GET_CMD, 0, 1, 92, 11]);
    }

    #[test]
    fn scenario_b_relay_off_deasserts_but_keeps_pulses() {
        let mut e = engine();
        run(&mut e, &set(RELAY, &[1]));
        run(&mut e, &set(0, &[1100, 1900]));
        assert!(e.is_enabled());
        assert_eq!(servo_output(&e, 1), 1900);

        run(&mut e, &set(RELAY, &[0]));
        assert!(!e.is_enabled());
        assert!(e.servos().sink().last().unwrap().is_idle());
        assert_eq!(e.outputs_mut().is_high(RELAY_GPIO), Ok(false));
        assert_eq!(e.servos().pulse(0), 1100);
        assert_eq!(e.servos().pulse(1), 1900);
    }

    #[test]
    fn scenario_c_current_reply() {
        let mut e = engine();
        e.sensors_mut().current = 1.0; // 12.29 counts -> 12 + 512
        let reply = run(&mut e, &[GET_CMD, CURR, 1]);
        assert_eq!(reply, [GET_CMD, CURR, 1, 12, 4]);
        assert_eq!(e.sensors_mut().selected(), &[channel::CURRENT_SENSE_ADDR]);
    }

    #[test]
    fn scenario_d_unknown_command_gets_no_reply() {
        let mut e = engine();
        let reply = run(&mut e, &[0x81, 0, 1]);
        assert!(reply.is_empty());
        assert_eq!(e.stats().dropped_frames, 1);
        assert_eq!(e.stats().packets, 0);
    }

    #[test]
    fn get_repeats_last_set_while_enabled() {
        let mut e = engine();
        run(&mut e, &set(RELAY, &[1]));
        run(&mut e, &set(5, &[2100]));
        let first = run(&mut e, &[GET_CMD, 5, 1]);
        let second = run(&mut e, &[GET_CMD, 5, 1]);
        assert_eq!(first, second);
        assert_eq!(&first[3..], &codec::encode(2100));
    }

    #[test]
    fn disabled_set_is_stored_but_not_asserted() {
        let mut e = engine();
        run(&mut e, &set(RELAY, &[0]));
        run(&mut e, &set(7, &[1234]));

        assert_eq!(servo_output(&e, 7), 0);
        let reply = run(&mut e, &[GET_CMD, 7, 1]);
        assert_eq!(&reply[3..], &codec::encode(1234));

        run(&mut e, &set(RELAY, &[1]));
        assert_eq!(servo_output(&e, 7), 1234);
    }

    #[test]
    fn count_18_touches_exactly_the_servos() {
        let mut e = engine();
        let values: std::vec::Vec<u16> = (0..18).map(|i| 1000 + i * 10).collect();
        run(&mut e, &set(0, &values));
        for (servo, &v) in values.iter().enumerate() {
            assert_eq!(e.servos().pulse(servo as u8), v);
        }
        assert_eq!(e.stats().ignored_writes, 0);
        assert_eq!(e.outputs_mut().is_high(RELAY_GPIO), Ok(false));

        let reply = run(&mut e, &[GET_CMD, 0, 18]);
        assert_eq!(reply.len(), 3 + 18 * 2);
        for (servo, &v) in values.iter().enumerate() {
            let at = 3 + servo * 2;
            assert_eq!(codec::decode(reply[at], reply[at + 1]), v);
        }
        assert!(e.sensors_mut().selected().is_empty());
    }

    #[test]
    fn full_table_get_reads_every_kind_in_order() {
        let mut e = engine();
        e.sensors_mut().voltages[0] = 2.0;
        e.sensors_mut().voltages[channel::VOLTAGE_SENSE_ADDR as usize] = 2.0;
        run(&mut e, &set(RELAY, &[1]));
        run(&mut e, &set(channel::A2, &[1]));

        let reply = run(&mut e, &[GET_CMD, 0, 29]);
        assert_eq!(reply.len(), 3 + 29 * 2);
        let slot = |idx: usize| codec::decode(reply[3 + idx * 2], reply[4 + idx * 2]);

        assert_eq!(slot(0), 1500); // centred on enable
        assert_eq!(slot(TS1 as usize), 621);
        assert_eq!(slot(TS1 as usize + 1), 0);
        assert_eq!(slot(CURR as usize), 512);
        assert_eq!(slot(VOLT as usize), 621);
        assert_eq!(slot(RELAY as usize), 1);
        assert_eq!(slot(channel::A1 as usize), 0);
        assert_eq!(slot(channel::A2 as usize), 1);
        assert_eq!(
            e.sensors_mut().selected(),
            &[0, 1, 2, 3, 4, 5, channel::CURRENT_SENSE_ADDR, channel::VOLTAGE_SENSE_ADDR]
        );
    }

    #[test]
    fn out_of_range_span_is_rejected_without_side_effects() {
        let mut e = engine();
        // 27..=29 runs off the end of the table
        run(&mut e, &set(channel::A1, &[1, 1, 1]));
        assert_eq!(e.outputs_mut().is_high(A1_GPIO), Ok(false));
        assert_eq!(e.stats().rejected_packets, 1);

        let reply = run(&mut e, &[GET_CMD, 20, 10]);
        assert!(reply.is_empty());
        let reply = run(&mut e, &[GET_CMD, 29, 0]);
        assert!(reply.is_empty());
        assert_eq!(e.stats().rejected_packets, 3);
    }

    #[test]
    fn set_on_sensor_is_ignored_and_rest_of_span_applies() {
        let mut e = engine();
        run(&mut e, &set(VOLT, &[100, 1, 1]));
        assert_eq!(e.stats().ignored_writes, 1);
        assert!(e.is_enabled());
        assert_eq!(e.outputs_mut().is_high(A1_GPIO), Ok(true));
        assert!(e.sensors_mut().selected().is_empty());
    }

    #[test]
    fn sensor_fault_zeroes_only_that_slot() {
        let mut e = engine();
        e.sensors_mut().voltages[1] = 1.0;
        e.sensors_mut().fail_address = Some(0);
        let reply = run(&mut e, &[GET_CMD, TS1, 2]);
        assert_eq!(reply, [GET_CMD, TS1, 2, 0, 0, 54, 2]);
        assert_eq!(e.stats().sensor_faults, 1);
    }

    #[test]
    fn zero_count_get_echoes_header_only() {
        let mut e = engine();
        let reply = run(&mut e, &[GET_CMD, 3, 0]);
        assert_eq!(reply, [GET_CMD, 3, 0]);
    }

    #[test]
    fn drains_back_to_back_packets_in_one_poll() {
        let mut e = engine();
        let mut bytes = set(RELAY, &[1]);
        bytes.extend(set(2, &[1700]));
        bytes.extend([GET_CMD, 2, 1]);
        let mut link = MockLink::new(&bytes);
        assert_eq!(block_on(e.poll(&mut link)), Ok(3));
        assert_eq!(link.written(), &[GET_CMD, 2, 1, 36, 13]);
        assert_eq!(link.flushes(), 1);
    }

    #[test]
    fn truncated_packet_then_good_packet() {
        let mut e = engine();
        let mut bytes = std::vec![SET_CMD, 0, 2, 92];
        bytes.extend([GET_CMD, 0, 1]);
        let reply = run(&mut e, &bytes);
        assert_eq!(reply, [GET_CMD, 0, 1, 0, 0]);
        assert_eq!(e.servos().pulse(0), 0);
    }

    #[test]
    fn link_loss_mid_reply_is_reported() {
        let mut e = engine();
        let mut link = MockLink::new(&[GET_CMD, 0, 4]);
        link.fail_writes_after(3);
        assert_eq!(block_on(e.poll(&mut link)), Err(LinkError::Disconnected));
    }
}
