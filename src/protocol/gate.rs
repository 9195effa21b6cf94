use crate::drivers::PulseOutputs;

/// Global actuator enable.
///
/// Servos never move while the gate is closed, but their pulses are still
/// stored so the host can stage all 18 positions and then open the gate for a
/// synchronised first motion.
#[derive(Debug, Default)]
pub struct ActuationGate {
    enabled: bool,
}

impl ActuationGate {
    pub const fn new() -> Self {
        Self { enabled: false }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drive the pulse generator to match `enabled`. Re-asserts on every
    /// call so a repeated enable reloads the stored pulses.
    pub fn set_enabled<P: PulseOutputs>(&mut self, enabled: bool, servos: &mut P) {
        if enabled != self.enabled {
            crate::log_info!("actuators {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        if enabled {
            servos.enable_all();
        } else {
            servos.disable_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::RecordingSink;
    use crate::drivers::ServoCluster;

    #[test]
    fn starts_closed() {
        assert!(!ActuationGate::new().is_enabled());
    }

    #[test]
    fn disable_keeps_pulses_and_enable_restores_them() {
        let mut servos = ServoCluster::new(RecordingSink::default());
        let mut gate = ActuationGate::new();

        gate.set_enabled(true, &mut servos);
        servos.set_pulse(3, 1200, gate.is_enabled());
        assert_eq!(servos.sink().last().unwrap().pulses[3], 1200);

        gate.set_enabled(false, &mut servos);
        assert!(servos.sink().last().unwrap().is_idle());
        assert_eq!(servos.pulse(3), 1200);

        gate.set_enabled(true, &mut servos);
        assert_eq!(servos.sink().last().unwrap().pulses[3], 1200);
    }
}
