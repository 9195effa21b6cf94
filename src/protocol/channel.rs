// Logical channel index → physical resource table.

use core::ops::Range;

use super::error::DispatchError;

/* ────────────────── Channel indices ───────────── */
pub const SERVO1: u8 = 0;
pub const SERVO18: u8 = 17;
pub const TS1: u8 = 18;
pub const TS6: u8 = 23;
pub const CURR: u8 = 24;
pub const VOLT: u8 = 25;
pub const RELAY: u8 = 26;
pub const A1: u8 = 27;
pub const A2: u8 = 28;

pub const CHANNEL_COUNT: usize = 29;

/* ────────────────── Mux addresses ─────────────── */
pub const SENSOR_1_ADDR: u8 = 0b000;
pub const SENSOR_2_ADDR: u8 = 0b001;
pub const SENSOR_3_ADDR: u8 = 0b010;
pub const SENSOR_4_ADDR: u8 = 0b011;
pub const SENSOR_5_ADDR: u8 = 0b100;
pub const SENSOR_6_ADDR: u8 = 0b101;
pub const VOLTAGE_SENSE_ADDR: u8 = 0b110;
pub const CURRENT_SENSE_ADDR: u8 = 0b111;

/* ────────────────── GPIO numbers ──────────────── */
pub const RELAY_GPIO: u8 = 26;
pub const A1_GPIO: u8 = 27;
pub const A2_GPIO: u8 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    Touch,
    Current,
    Voltage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioRole {
    /// Drives the servo power relay and doubles as the global enable.
    Relay,
    Aux,
}

/// Physical resource behind a channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    Actuator(u8),
    MuxSensor { address: u8, kind: SensorKind },
    Gpio { pin: u8, role: GpioRole },
}

/// Coarse classification used for the partition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelKind {
    Actuator,
    Sensor,
    Relay,
    Auxiliary,
}

impl Resource {
    pub fn kind(self) -> ChannelKind {
        match self {
            Resource::Actuator(_) => ChannelKind::Actuator,
            Resource::MuxSensor { .. } => ChannelKind::Sensor,
            Resource::Gpio {
                role: GpioRole::Relay,
                ..
            } => ChannelKind::Relay,
            Resource::Gpio {
                role: GpioRole::Aux,
                ..
            } => ChannelKind::Auxiliary,
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, Resource::MuxSensor { .. })
    }
}

const fn touch(address: u8) -> Resource {
    Resource::MuxSensor {
        address,
        kind: SensorKind::Touch,
    }
}

/// Compile-time table, indexed by channel.
pub const CHANNEL_MAP: [Resource; CHANNEL_COUNT] = [
    Resource::Actuator(0),
    Resource::Actuator(1),
    Resource::Actuator(2),
    Resource::Actuator(3),
    Resource::Actuator(4),
    Resource::Actuator(5),
    Resource::Actuator(6),
    Resource::Actuator(7),
    Resource::Actuator(8),
    Resource::Actuator(9),
    Resource::Actuator(10),
    Resource::Actuator(11),
    Resource::Actuator(12),
    Resource::Actuator(13),
    Resource::Actuator(14),
    Resource::Actuator(15),
    Resource::Actuator(16),
    Resource::Actuator(17),
    touch(SENSOR_1_ADDR), // TS_L1
    touch(SENSOR_2_ADDR), // TS_L2
    touch(SENSOR_3_ADDR), // TS_L3
    touch(SENSOR_4_ADDR), // TS_R1
    touch(SENSOR_5_ADDR), // TS_R2
    touch(SENSOR_6_ADDR), // TS_R3
    Resource::MuxSensor {
        address: CURRENT_SENSE_ADDR,
        kind: SensorKind::Current,
    },
    Resource::MuxSensor {
        address: VOLTAGE_SENSE_ADDR,
        kind: SensorKind::Voltage,
    },
    Resource::Gpio {
        pin: RELAY_GPIO,
        role: GpioRole::Relay,
    },
    Resource::Gpio {
        pin: A1_GPIO,
        role: GpioRole::Aux,
    },
    Resource::Gpio {
        pin: A2_GPIO,
        role: GpioRole::Aux,
    },
];

#[inline]
pub fn resource(index: u8) -> Option<Resource> {
    CHANNEL_MAP.get(index as usize).copied()
}

/// Validate a `[start, start + count)` span against the table before any
/// physical access happens.
pub fn span(start: u8, count: u8) -> Result<Range<u8>, DispatchError> {
    let end = start as usize + count as usize;
    if start as usize >= CHANNEL_COUNT || end > CHANNEL_COUNT {
        return Err(DispatchError::OutOfRange { start, count });
    }
    Ok(start..end as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_has_exactly_one_kind() {
        for idx in 0..CHANNEL_COUNT as u8 {
            let kind = resource(idx).unwrap().kind();
            let expected = match idx {
                SERVO1..=SERVO18 => ChannelKind::Actuator,
                TS1..=VOLT => ChannelKind::Sensor,
                RELAY => ChannelKind::Relay,
                A1..=A2 => ChannelKind::Auxiliary,
                _ => unreachable!(),
            };
            assert_eq!(kind, expected, "channel {}", idx);
        }
        assert_eq!(resource(29), None);
        assert_eq!(resource(u8::MAX), None);
    }

    #[test]
    fn mapping_is_injective_per_resource_type() {
        for a in 0..CHANNEL_COUNT {
            for b in (a + 1)..CHANNEL_COUNT {
                let (ra, rb) = (CHANNEL_MAP[a], CHANNEL_MAP[b]);
                match (ra, rb) {
                    (Resource::Actuator(x), Resource::Actuator(y)) => assert_ne!(x, y),
                    (
                        Resource::MuxSensor { address: x, .. },
                        Resource::MuxSensor { address: y, .. },
                    ) => assert_ne!(x, y),
                    (Resource::Gpio { pin: x, .. }, Resource::Gpio { pin: y, .. }) => {
                        assert_ne!(x, y)
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn servo_channels_map_one_to_one() {
        for idx in SERVO1..=SERVO18 {
            assert_eq!(resource(idx), Some(Resource::Actuator(idx)));
        }
    }

    #[test]
    fn sense_channels_use_dedicated_mux_addresses() {
        assert_eq!(
            resource(CURR),
            Some(Resource::MuxSensor {
                address: CURRENT_SENSE_ADDR,
                kind: SensorKind::Current
            })
        );
        assert_eq!(
            resource(VOLT),
            Some(Resource::MuxSensor {
                address: VOLTAGE_SENSE_ADDR,
                kind: SensorKind::Voltage
            })
        );
        assert!(!resource(TS1).unwrap().is_writable());
        assert!(resource(RELAY).unwrap().is_writable());
    }

    #[test]
    fn span_bounds() {
        assert_eq!(span(0, 18), Ok(0..18));
        assert_eq!(span(28, 1), Ok(28..29));
        assert_eq!(span(0, 29), Ok(0..29));
        assert_eq!(span(5, 0), Ok(5..5));
        assert_eq!(
            span(28, 2),
            Err(DispatchError::OutOfRange { start: 28, count: 2 })
        );
        assert_eq!(
            span(29, 0),
            Err(DispatchError::OutOfRange { start: 29, count: 0 })
        );
        assert_eq!(
            span(100, 127),
            Err(DispatchError::OutOfRange {
                start: 100,
                count: 127
            })
        );
    }
}
