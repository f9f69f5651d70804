use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{config::SensorConfig, core::SensorReading, math::ramp};

/// Fuel consumption while running, in percent per second.
///
/// The consumption is independent of load.
const FUEL_CONSUMPTION_RATE: f64 = 0.001;
/// Oil pressure at idle, in bar.
const OIL_PRESSURE_BASE: f64 = 3.0;
/// Oil pressure increase per percent load, in bar.
const OIL_PRESSURE_LOAD_FACTOR: f64 = 0.02;
/// Oil pressure rate of change, in bar per second.
const OIL_PRESSURE_RATE: f64 = 2.0;
/// Cooling temperature at normal operation, in degrees Celsius.
const COOLING_TEMP_BASE: f64 = 85.0;
/// Cooling temperature increase per percent load.
const COOLING_TEMP_LOAD_FACTOR: f64 = 0.3;
/// Cooling temperature rate of change while running, per second.
const COOLING_TEMP_RATE_RUNNING: f64 = 5.0;
/// Cooling temperature rate of change while stopped, per second.
const COOLING_TEMP_RATE_STOPPED: f64 = 2.0;
/// Exhaust temperature above the cooling temperature target.
const EXHAUST_TEMP_OFFSET: f64 = 200.0;
/// Exhaust temperature rate of change while running, per second.
const EXHAUST_TEMP_RATE_RUNNING: f64 = 10.0;
/// Exhaust temperature rate of change while stopped, per second.
const EXHAUST_TEMP_RATE_STOPPED: f64 = 5.0;
/// Vibration at idle, in mm/s.
const VIBRATION_BASE: f64 = 2.0;
/// Vibration increase per percent load, in mm/s.
const VIBRATION_LOAD_FACTOR: f64 = 0.05;
/// Vibration rate of change, in mm/s per second.
const VIBRATION_RATE: f64 = 1.0;

const FUEL_LEVEL_RANGE: (f64, f64) = (0.0, 100.0);
const OIL_PRESSURE_RANGE: (f64, f64) = (0.0, 10.0);
const COOLING_TEMP_RANGE: (f64, f64) = (-20.0, 150.0);
const EXHAUST_TEMP_RANGE: (f64, f64) = (-20.0, 600.0);
const VIBRATION_RANGE: (f64, f64) = (0.0, 50.0);

/// Failed instrument output as mean and standard deviation.
const FUEL_FAILED_BAND: (f64, f64) = (50.0, 20.0);
const OIL_FAILED_BAND: (f64, f64) = (2.0, 1.0);
const COOLING_FAILED_BAND: (f64, f64) = (80.0, 20.0);

#[inline]
fn clamp(value: f64, range: (f64, f64)) -> f64 {
    value.clamp(range.0, range.1)
}

/// Sensor failure flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorFailure {
    pub fuel: bool,
    pub oil: bool,
    pub temperature: bool,
}

/// Calibration drift rates, in sensor units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibrationDrift {
    pub fuel: f64,
    pub oil: f64,
    pub temperature: f64,
}

/// Engine sensor bank.
///
/// Simulates the engine instrumentation. The readings follow the physical
/// state of the engine with multiplicative noise, optional calibration drift
/// and optional instrument failure. The random source is owned by the bank so
/// a seeded generator yields reproducible readings.
pub struct SensorBank<R = StdRng> {
    readings: SensorReading,
    failure: SensorFailure,
    drift: CalibrationDrift,
    noise_level: f64,
    rng: R,
}

impl SensorBank<StdRng> {
    /// Construct the sensor bank from configuration.
    ///
    /// Without a configured seed the generator is seeded from the operating
    /// system.
    pub fn from_config(config: &SensorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self::new(config.noise_level, rng)
    }
}

impl<R: Rng> SensorBank<R> {
    /// Construct a new sensor bank with the given noise level and random source.
    pub fn new(noise_level: f64, rng: R) -> Self {
        Self {
            readings: SensorReading::default(),
            failure: SensorFailure::default(),
            drift: CalibrationDrift::default(),
            noise_level,
            rng,
        }
    }

    /// Current sensor readings.
    #[inline]
    pub fn readings(&self) -> SensorReading {
        self.readings
    }

    /// Current sensor failure flags.
    #[inline]
    pub fn failure(&self) -> SensorFailure {
        self.failure
    }

    /// Current calibration drift rates.
    #[inline]
    pub fn drift(&self) -> CalibrationDrift {
        self.drift
    }

    /// Mark sensors as failed. Takes effect on the next update.
    pub fn set_sensor_failure(&mut self, fuel: bool, oil: bool, temperature: bool) {
        self.failure = SensorFailure {
            fuel,
            oil,
            temperature,
        };

        log::debug!("Sensor failure: {:?}", self.failure);
    }

    /// Set calibration drift rates. Takes effect on the next update.
    ///
    /// Non-finite rates are ignored and leave the current drift in place.
    /// Returns whether the rates were applied.
    pub fn set_calibration_drift(&mut self, fuel: f64, oil: f64, temperature: f64) -> bool {
        if ![fuel, oil, temperature].iter().all(|rate| rate.is_finite()) {
            log::warn!("Calibration drift ignored, rates must be finite");
            return false;
        }

        self.drift = CalibrationDrift {
            fuel,
            oil,
            temperature,
        };

        log::debug!("Calibration drift: {:?}", self.drift);

        true
    }

    /// Restore all sensors to nominal operation.
    pub fn reset_sensors(&mut self) {
        self.failure = SensorFailure::default();
        self.drift = CalibrationDrift::default();

        log::debug!("Sensors reset to nominal");
    }

    /// Advance the sensors by `delta` seconds.
    pub fn update(&mut self, delta: f64, running: bool, load: f64) {
        self.update_fuel_sensor(delta, running);
        self.update_oil_pressure_sensor(delta, running, load);
        self.update_temperature_sensors(delta, running, load);
        self.update_vibration_sensor(delta, running, load);

        log::trace!("Sensors: {}", self.readings);
    }

    #[inline]
    fn gaussian(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Random instrument output, uncorrelated with the physical quantity.
    fn failed_value(&mut self, band: (f64, f64), range: (f64, f64)) -> f64 {
        clamp(band.0 + self.gaussian() * band.1, range)
    }

    /// Apply multiplicative noise. The noise scales with the value itself.
    fn add_noise(&mut self, value: f64) -> f64 {
        if self.noise_level == 0.0 {
            return value;
        }

        value + self.gaussian() * value * self.noise_level
    }

    fn update_fuel_sensor(&mut self, delta: f64, running: bool) {
        if self.failure.fuel {
            self.readings.fuel_level = self.failed_value(FUEL_FAILED_BAND, FUEL_LEVEL_RANGE);
            return;
        }

        if !running {
            return;
        }

        let mut fuel_level = (self.readings.fuel_level - FUEL_CONSUMPTION_RATE * delta).max(0.0);
        fuel_level += self.drift.fuel * delta;
        fuel_level = self.add_noise(fuel_level);

        self.readings.fuel_level = clamp(fuel_level, FUEL_LEVEL_RANGE);
    }

    fn update_oil_pressure_sensor(&mut self, delta: f64, running: bool, load: f64) {
        if self.failure.oil {
            self.readings.oil_pressure = self.failed_value(OIL_FAILED_BAND, OIL_PRESSURE_RANGE);
            return;
        }

        let mut oil_pressure = if running {
            let target = OIL_PRESSURE_BASE + load * OIL_PRESSURE_LOAD_FACTOR;
            ramp(self.readings.oil_pressure, target, OIL_PRESSURE_RATE, delta)
        } else {
            0.0
        };

        oil_pressure += self.drift.oil * delta;
        oil_pressure = self.add_noise(oil_pressure);

        self.readings.oil_pressure = clamp(oil_pressure, OIL_PRESSURE_RANGE);
    }

    fn update_temperature_sensors(&mut self, delta: f64, running: bool, load: f64) {
        let ambient = self.readings.ambient_temp;

        let (cooling_temp, exhaust_temp) = if running {
            let target = COOLING_TEMP_BASE + load * COOLING_TEMP_LOAD_FACTOR;
            (
                ramp(
                    self.readings.cooling_temp,
                    target,
                    COOLING_TEMP_RATE_RUNNING,
                    delta,
                ),
                ramp(
                    self.readings.exhaust_temp,
                    target + EXHAUST_TEMP_OFFSET,
                    EXHAUST_TEMP_RATE_RUNNING,
                    delta,
                ),
            )
        } else {
            (
                ramp(
                    self.readings.cooling_temp,
                    ambient,
                    COOLING_TEMP_RATE_STOPPED,
                    delta,
                ),
                ramp(
                    self.readings.exhaust_temp,
                    ambient,
                    EXHAUST_TEMP_RATE_STOPPED,
                    delta,
                ),
            )
        };

        let exhaust_temp = exhaust_temp + self.drift.temperature * delta;
        let exhaust_temp = self.add_noise(exhaust_temp);
        self.readings.exhaust_temp = clamp(exhaust_temp, EXHAUST_TEMP_RANGE);

        if self.failure.temperature {
            self.readings.cooling_temp = self.failed_value(COOLING_FAILED_BAND, COOLING_TEMP_RANGE);
            return;
        }

        let cooling_temp = cooling_temp + self.drift.temperature * delta;
        let cooling_temp = self.add_noise(cooling_temp);
        self.readings.cooling_temp = clamp(cooling_temp, COOLING_TEMP_RANGE);
    }

    fn update_vibration_sensor(&mut self, delta: f64, running: bool, load: f64) {
        let vibration = if running {
            let target = VIBRATION_BASE + load * VIBRATION_LOAD_FACTOR;
            ramp(self.readings.vibration, target, VIBRATION_RATE, delta)
        } else {
            0.0
        };

        let vibration = self.add_noise(vibration);
        self.readings.vibration = clamp(vibration, VIBRATION_RANGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noiseless() -> SensorBank {
        SensorBank::from_config(&SensorConfig::noiseless())
    }

    fn seeded(seed: u64) -> SensorBank {
        SensorBank::new(0.02, StdRng::seed_from_u64(seed))
    }

    fn assert_in_range(readings: &SensorReading) {
        assert!((0.0..=100.0).contains(&readings.fuel_level));
        assert!((0.0..=10.0).contains(&readings.oil_pressure));
        assert!((-20.0..=150.0).contains(&readings.cooling_temp));
        assert!((-20.0..=600.0).contains(&readings.exhaust_temp));
        assert!((0.0..=50.0).contains(&readings.vibration));
    }

    #[test]
    fn test_initial_readings() {
        let bank = noiseless();
        let readings = bank.readings();

        assert_eq!(readings.fuel_level, 100.0);
        assert_eq!(readings.oil_pressure, 3.0);
        assert_eq!(readings.cooling_temp, 25.0);
        assert_eq!(readings.vibration, 0.0);
        assert_eq!(readings.exhaust_temp, 25.0);
        assert_eq!(readings.ambient_temp, 25.0);
        assert_eq!(readings.humidity, 60.0);
    }

    #[test]
    fn test_stopped_rest_values() {
        let mut bank = noiseless();

        bank.update(1.0, false, 0.0);
        let readings = bank.readings();

        assert_eq!(readings.oil_pressure, 0.0);
        assert_eq!(readings.vibration, 0.0);
        assert_eq!(readings.cooling_temp, 25.0);
        assert_eq!(readings.exhaust_temp, 25.0);
        assert_eq!(readings.fuel_level, 100.0);
    }

    #[test]
    fn test_running_converges_to_load_targets() {
        let mut bank = noiseless();

        for _ in 0..120 {
            bank.update(1.0, true, 50.0);
        }
        let readings = bank.readings();

        assert!((readings.oil_pressure - 4.0).abs() < 1e-9);
        assert!((readings.cooling_temp - 100.0).abs() < 1e-9);
        assert!((readings.exhaust_temp - 300.0).abs() < 1e-9);
        assert!((readings.vibration - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_ramp_rates() {
        let mut bank = noiseless();

        bank.update(1.0, true, 0.0);
        assert_eq!(bank.readings().cooling_temp, 30.0);
        assert_eq!(bank.readings().exhaust_temp, 35.0);

        bank.update(1.0, false, 0.0);
        assert_eq!(bank.readings().cooling_temp, 28.0);
        assert_eq!(bank.readings().exhaust_temp, 30.0);
    }

    #[test]
    fn test_fuel_untouched_while_stopped() {
        let mut bank = noiseless();

        bank.update(100.0, true, 0.0);
        let level = bank.readings().fuel_level;
        assert!((level - 99.9).abs() < 1e-9);

        for _ in 0..10 {
            bank.update(10.0, false, 0.0);
        }
        assert_eq!(bank.readings().fuel_level, level);
    }

    #[test]
    fn test_fuel_monotonic_regardless_of_load() {
        for load in [0.0, 20.0, 100.0] {
            let mut bank = noiseless();
            let mut previous = bank.readings().fuel_level;

            for _ in 0..50 {
                bank.update(1.0, true, load);
                let level = bank.readings().fuel_level;
                assert!(level <= previous);
                previous = level;
            }

            assert!((previous - 99.95).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fuel_floor() {
        let mut bank = noiseless();

        for _ in 0..20 {
            bank.update(10_000.0, true, 100.0);
        }
        assert_eq!(bank.readings().fuel_level, 0.0);

        bank.update(1.0, true, 100.0);
        assert_eq!(bank.readings().fuel_level, 0.0);
    }

    #[test]
    fn test_calibration_drift() {
        let mut bank = noiseless();

        bank.set_calibration_drift(0.0, 0.0, 1.0);
        bank.update(1.0, false, 0.0);
        assert_eq!(bank.readings().cooling_temp, 26.0);
        assert_eq!(bank.readings().exhaust_temp, 26.0);

        bank.set_calibration_drift(-1.0, 0.5, 0.0);
        bank.update(1.0, true, 0.0);
        assert!((bank.readings().fuel_level - 98.999).abs() < 1e-9);
        assert!((bank.readings().oil_pressure - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_drift_ignored() {
        let mut bank = noiseless();

        assert!(bank.set_calibration_drift(0.5, 0.0, 0.0));
        assert!(!bank.set_calibration_drift(f64::NAN, 0.0, 0.0));
        assert!(!bank.set_calibration_drift(0.0, 0.0, f64::INFINITY));
        assert_eq!(
            bank.drift(),
            CalibrationDrift {
                fuel: 0.5,
                oil: 0.0,
                temperature: 0.0
            }
        );

        for _ in 0..50 {
            bank.update(0.2, true, 50.0);
            assert_in_range(&bank.readings());
        }
    }

    #[test]
    fn test_failed_oil_sensor_band() {
        let mut bank = seeded(7);
        bank.set_sensor_failure(false, true, false);

        let mut sum = 0.0;
        for i in 0..500 {
            bank.update(0.2, true, (i % 100) as f64);
            let oil_pressure = bank.readings().oil_pressure;
            assert!((0.0..=7.0).contains(&oil_pressure));
            sum += oil_pressure;
        }

        let mean = sum / 500.0;
        assert!((mean - 2.0).abs() < 0.3);
    }

    #[test]
    fn test_failed_sensors_stay_in_range() {
        let mut bank = seeded(11);
        bank.set_sensor_failure(true, true, true);

        for _ in 0..500 {
            bank.update(0.2, true, 100.0);
            assert_in_range(&bank.readings());
        }
    }

    #[test]
    fn test_reset_sensors() {
        let mut bank = noiseless();

        bank.set_sensor_failure(true, true, true);
        bank.set_calibration_drift(1.0, 1.0, 1.0);
        bank.reset_sensors();

        assert_eq!(bank.failure(), SensorFailure::default());
        assert_eq!(bank.drift(), CalibrationDrift::default());

        bank.update(1.0, false, 0.0);
        assert_eq!(bank.readings().cooling_temp, 25.0);
    }

    #[test]
    fn test_noisy_readings_stay_in_range() {
        let mut bank = seeded(3);

        for i in 0..2_000 {
            bank.update(0.5, i % 400 < 300, 100.0);
            assert_in_range(&bank.readings());
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut a = seeded(42);
        let mut b = seeded(42);

        for _ in 0..100 {
            a.update(0.2, true, 60.0);
            b.update(0.2, true, 60.0);
            assert_eq!(a.readings(), b.readings());
        }
    }
}
