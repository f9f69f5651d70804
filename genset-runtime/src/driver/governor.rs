use crate::math::lerp;

/// Speed governor and automatic voltage regulator.
///
/// Both controllers follow a proportional droop characteristic: the setpoint
/// falls linearly from the rated value at no load to the rated value minus the
/// droop at full load.
#[derive(Clone, Copy, Debug)]
pub struct Governor {
    /// Speed droop at full load.
    rpm_droop: f64,
    /// Voltage droop at full load.
    voltage_droop: f64,
}

impl Governor {
    /// Construct a new governor.
    ///
    /// # Arguments
    ///
    /// * `rpm_droop` - Engine speed reduction at full load.
    /// * `voltage_droop` - Output voltage reduction at full load.
    pub fn new(rpm_droop: f64, voltage_droop: f64) -> Self {
        Self {
            rpm_droop,
            voltage_droop,
        }
    }

    /// Engine speed setpoint for the given load fraction.
    #[inline]
    pub fn rpm_setpoint(&self, rpm_max: f64, load_fraction: f64) -> f64 {
        lerp(rpm_max, rpm_max - self.rpm_droop, load_fraction)
    }

    /// Output voltage setpoint for the given load fraction.
    #[inline]
    pub fn voltage_setpoint(&self, voltage_max: f64, load_fraction: f64) -> f64 {
        lerp(voltage_max, voltage_max - self.voltage_droop, load_fraction)
    }

    /// Output frequency of a synchronous machine at the given speed.
    ///
    /// The frequency is proportional to the engine speed, the rated frequency
    /// is reached at rated speed.
    #[inline]
    pub fn frequency(&self, rpm: f64, rpm_max: f64, frequency_max: f64) -> f64 {
        (rpm / rpm_max) * frequency_max
    }
}

impl Default for Governor {
    fn default() -> Self {
        Self::new(50.0, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_load() {
        let governor = Governor::default();

        assert_eq!(governor.rpm_setpoint(1800.0, 0.0), 1800.0);
        assert_eq!(governor.voltage_setpoint(440.0, 0.0), 440.0);
    }

    #[test]
    fn test_full_load_droop() {
        let governor = Governor::default();

        assert_eq!(governor.rpm_setpoint(1800.0, 1.0), 1750.0);
        assert_eq!(governor.voltage_setpoint(440.0, 1.0), 430.0);
    }

    #[test]
    fn test_partial_load_droop() {
        let governor = Governor::default();

        assert!((governor.rpm_setpoint(1800.0, 0.2) - 1790.0).abs() < 1e-9);
        assert!((governor.voltage_setpoint(440.0, 0.2) - 438.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_follows_speed() {
        let governor = Governor::default();

        assert_eq!(governor.frequency(1800.0, 1800.0, 60.0), 60.0);
        assert_eq!(governor.frequency(900.0, 1800.0, 60.0), 30.0);
        assert_eq!(governor.frequency(0.0, 1800.0, 60.0), 0.0);
    }
}
