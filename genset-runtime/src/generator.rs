use rand::{rngs::StdRng, Rng};

use crate::{
    config::{Configurable, GeneratorConfig, SensorConfig},
    core::{Alarm, AlarmInputs, AlarmKind, AlarmLog, GeneratorStatus, OperatingState, SensorReading},
    driver::{Governor, SensorBank},
    math::{ramp, within},
    runtime::{Error, Result},
};

/// Engine speed rate of change, in RPM per second.
const RPM_RATE: f64 = 100.0;
/// Output voltage rate of change, in volts per second.
const VOLTAGE_RATE: f64 = 50.0;
/// Output frequency rate of change, in hertz per second.
const FREQUENCY_RATE: f64 = 2.0;
/// Load rate of change, in percent per second.
const LOAD_RATE: f64 = 10.0;

/// Minimum duration of the startup sequence, in seconds.
const STARTUP_TIME: f64 = 30.0;
/// Maximum duration of the shutdown sequence, in seconds.
const SHUTDOWN_TIME: f64 = 15.0;

/// Startup completion tolerances.
const STARTUP_RPM_TOLERANCE: f64 = 10.0;
const STARTUP_VOLTAGE_TOLERANCE: f64 = 5.0;
const STARTUP_FREQUENCY_TOLERANCE: f64 = 0.5;

/// Shutdown completes early once speed and voltage fall below these values.
const SHUTDOWN_RPM_THRESHOLD: f64 = 50.0;
const SHUTDOWN_VOLTAGE_THRESHOLD: f64 = 10.0;

/// Minimum load the governor accepts while running, in percent.
const MINIMUM_RUNNING_LOAD: f64 = 20.0;

/// Current and target value of a controlled quantity.
#[derive(Clone, Copy, Debug, Default)]
struct Setpoint {
    current: f64,
    target: f64,
}

impl Setpoint {
    #[inline]
    fn ramp(&mut self, rate: f64, delta: f64) {
        self.current = ramp(self.current, self.target, rate, delta);
    }

    #[inline]
    fn is_settled(&self, tolerance: f64) -> bool {
        within(self.current, self.target, tolerance)
    }
}

/// Marine generator simulation engine.
///
/// Owns the operating state machine, the controlled quantities and the sensor
/// bank. The engine is advanced by calling [`GeneratorEngine::tick`] with the
/// elapsed time. All other operations take effect on the next tick.
pub struct GeneratorEngine<R = StdRng> {
    state: OperatingState,
    rpm: Setpoint,
    voltage: Setpoint,
    frequency: Setpoint,
    load: Setpoint,
    rating: GeneratorConfig,
    governor: Governor,
    sensors: SensorBank<R>,
    alarms: AlarmLog,
    startup_time: f64,
    shutdown_time: f64,
}

impl GeneratorEngine<StdRng> {
    /// Construct the generator from configuration.
    ///
    /// Fails if the rating or the sensor noise level is out of range.
    pub fn from_config<C: Configurable>(config: &C) -> Result<Self> {
        config.sensor().validate()?;

        Self::new(*config.generator(), SensorBank::from_config(config.sensor()))
    }
}

impl Default for GeneratorEngine<StdRng> {
    fn default() -> Self {
        Self::with_rating(
            GeneratorConfig::default(),
            SensorBank::from_config(&SensorConfig::default()),
        )
    }
}

impl<R: Rng> GeneratorEngine<R> {
    /// Construct a stopped generator with the given rating and sensor bank.
    pub fn new(rating: GeneratorConfig, sensors: SensorBank<R>) -> Result<Self> {
        rating.validate()?;

        Ok(Self::with_rating(rating, sensors))
    }

    fn with_rating(rating: GeneratorConfig, sensors: SensorBank<R>) -> Self {
        Self {
            state: OperatingState::Stopped,
            rpm: Setpoint::default(),
            voltage: Setpoint::default(),
            frequency: Setpoint::default(),
            load: Setpoint::default(),
            rating,
            governor: Governor::default(),
            sensors,
            alarms: AlarmLog::default(),
            startup_time: 0.0,
            shutdown_time: 0.0,
        }
    }

    /// Current operating state.
    #[inline]
    pub fn state(&self) -> OperatingState {
        self.state
    }

    /// Generator rating.
    #[inline]
    pub fn rating(&self) -> &GeneratorConfig {
        &self.rating
    }

    /// Target load in percent.
    #[inline]
    pub fn target_load(&self) -> f64 {
        self.load.target
    }

    /// Current sensor readings.
    #[inline]
    pub fn sensors(&self) -> SensorReading {
        self.sensors.readings()
    }

    /// Sensor bank.
    #[inline]
    pub fn sensor_bank(&self) -> &SensorBank<R> {
        &self.sensors
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        log::warn!("Cannot {} generator in state {}", operation, self.state);

        Error::InvalidState {
            operation,
            state: self.state,
        }
    }

    /// Start the generator.
    ///
    /// The generator can only be started when stopped or in fault.
    pub fn start(&mut self) -> Result {
        match self.state {
            OperatingState::Stopped | OperatingState::Fault => {
                self.state = OperatingState::Starting;
                self.startup_time = 0.0;
                self.rpm.target = self.rating.max_rpm;
                self.voltage.target = self.rating.max_voltage;
                self.frequency.target = self.rating.max_frequency;

                log::info!("Generator starting");

                Ok(())
            }
            _ => Err(self.invalid_state("start")),
        }
    }

    /// Stop the generator.
    ///
    /// Initiates the shutdown sequence from running or starting.
    pub fn stop(&mut self) -> Result {
        match self.state {
            OperatingState::Running | OperatingState::Starting => {
                self.state = OperatingState::Stopping;
                self.shutdown_time = 0.0;
                self.rpm.target = 0.0;
                self.voltage.target = 0.0;
                self.frequency.target = 0.0;
                self.load.target = 0.0;

                log::info!("Generator stopping");

                Ok(())
            }
            _ => Err(self.invalid_state("stop")),
        }
    }

    /// Stop the generator immediately.
    ///
    /// All quantities drop to zero without ramping and the state is forced to
    /// stopped.
    pub fn emergency_stop(&mut self) -> Result {
        match self.state {
            OperatingState::Stopped | OperatingState::Fault => {
                Err(self.invalid_state("emergency stop"))
            }
            _ => {
                self.force_stop();

                log::warn!("Emergency stop activated");

                Ok(())
            }
        }
    }

    fn force_stop(&mut self) {
        self.state = OperatingState::Stopped;
        self.rpm.current = 0.0;
        self.voltage.current = 0.0;
        self.frequency.current = 0.0;
        self.load.current = 0.0;
        self.load.target = 0.0;
    }

    /// Request a load in percent.
    ///
    /// Only the target is set, the actual load follows with a ramp. While
    /// running the load is never below the governor minimum. Returns the
    /// effective target load.
    pub fn set_load(&mut self, percentage: f64) -> Result<f64> {
        if !self.state.accepts_load() {
            return Err(self.invalid_state("set load on"));
        }
        if !percentage.is_finite() {
            return Err(Error::InvalidParameter("load must be finite".to_owned()));
        }

        let mut percentage = percentage;
        if self.state == OperatingState::Running && percentage < MINIMUM_RUNNING_LOAD {
            log::info!("Load adjusted to minimum {}%", MINIMUM_RUNNING_LOAD);
            percentage = MINIMUM_RUNNING_LOAD;
        }

        let percentage = percentage.clamp(0.0, self.rating.max_load);
        self.load.target = percentage;

        log::info!("Load set to {:.1}%", percentage);

        Ok(percentage)
    }

    /// Replace the rated maxima.
    ///
    /// Takes effect on the next tick.
    pub fn set_parameters(&mut self, max_rpm: f64, max_voltage: f64, max_frequency: f64) -> Result {
        let rating = GeneratorConfig {
            max_rpm,
            max_voltage,
            max_frequency,
            ..self.rating
        };
        rating.validate()?;

        self.rating = rating;

        log::info!(
            "Rating set to {} RPM, {} V, {} Hz",
            max_rpm,
            max_voltage,
            max_frequency
        );

        Ok(())
    }

    /// Mark sensors as failed.
    pub fn set_sensor_failure(&mut self, fuel: bool, oil: bool, temperature: bool) {
        self.sensors.set_sensor_failure(fuel, oil, temperature);
    }

    /// Set sensor calibration drift rates.
    pub fn set_calibration_drift(&mut self, fuel: f64, oil: f64, temperature: f64) -> Result {
        if !self.sensors.set_calibration_drift(fuel, oil, temperature) {
            return Err(Error::InvalidParameter("drift must be finite".to_owned()));
        }

        Ok(())
    }

    /// Restore all sensors to nominal operation.
    pub fn reset_sensors(&mut self) {
        self.sensors.reset_sensors();
    }

    /// Acknowledge all active alarms of this kind.
    pub fn acknowledge_alarm(&mut self, kind: AlarmKind) -> usize {
        let count = self.alarms.acknowledge(kind);
        if count > 0 {
            log::info!("Alarm acknowledged: {}", kind);
        }
        count
    }

    /// Deactivate all alarms.
    pub fn reset_alarms(&mut self) {
        self.alarms.reset();

        log::info!("All alarms reset");
    }

    /// Full alarm history.
    #[inline]
    pub fn alarms(&self) -> &[Alarm] {
        self.alarms.history()
    }

    /// Snapshot of the generator status.
    pub fn status(&self) -> GeneratorStatus {
        let readings = self.sensors.readings();

        GeneratorStatus {
            state: self.state,
            rpm: self.rpm.current,
            voltage: self.voltage.current,
            frequency: self.frequency.current,
            load: self.load.current,
            fuel_level: readings.fuel_level,
            oil_pressure: readings.oil_pressure,
            cooling_temp: readings.cooling_temp,
            active_alarms: self.alarms.active().cloned().collect(),
        }
    }

    /// Advance the simulation by `delta` seconds.
    ///
    /// The state machine advances first, then the sensors follow the resulting
    /// engine state. Finally the alarm conditions are evaluated, which may trip
    /// the generator.
    pub fn tick(&mut self, delta: f64) {
        match self.state {
            OperatingState::Starting => self.update_startup_sequence(delta),
            OperatingState::Running => self.update_running_state(delta),
            OperatingState::Stopping => self.update_shutdown_sequence(delta),
            OperatingState::Stopped | OperatingState::Fault => {}
        }

        self.sensors.update(
            delta,
            self.state == OperatingState::Running,
            self.load.current,
        );

        let inputs = AlarmInputs {
            readings: self.sensors.readings(),
            rpm: self.rpm.current,
            rpm_max: self.rating.max_rpm,
            load: self.load.current,
            load_max: self.rating.max_load,
        };

        // Overspeed is a protective trip, the engine stops within this tick.
        if self.alarms.evaluate(&inputs) && self.state != OperatingState::Stopped {
            log::error!("Overspeed trip at {:.0} RPM", self.rpm.current);

            self.force_stop();
        }
    }

    fn update_startup_sequence(&mut self, delta: f64) {
        self.startup_time += delta;

        self.rpm.ramp(RPM_RATE, delta);
        self.voltage.ramp(VOLTAGE_RATE, delta);
        self.frequency.ramp(FREQUENCY_RATE, delta);

        if self.startup_time >= STARTUP_TIME
            && self.rpm.is_settled(STARTUP_RPM_TOLERANCE)
            && self.voltage.is_settled(STARTUP_VOLTAGE_TOLERANCE)
            && self.frequency.is_settled(STARTUP_FREQUENCY_TOLERANCE)
        {
            self.state = OperatingState::Running;

            log::info!("Generator startup complete, now running");
        }
    }

    fn update_running_state(&mut self, delta: f64) {
        self.load.ramp(LOAD_RATE, delta);

        let load_fraction = self.load.current / self.rating.max_load;

        self.rpm.target = self
            .governor
            .rpm_setpoint(self.rating.max_rpm, load_fraction);
        self.rpm.ramp(RPM_RATE, delta);

        self.voltage.target = self
            .governor
            .voltage_setpoint(self.rating.max_voltage, load_fraction);
        self.voltage.ramp(VOLTAGE_RATE, delta);

        self.frequency.current = self.governor.frequency(
            self.rpm.current,
            self.rating.max_rpm,
            self.rating.max_frequency,
        );
        self.frequency.target = self.frequency.current;
    }

    fn update_shutdown_sequence(&mut self, delta: f64) {
        self.shutdown_time += delta;

        self.rpm.ramp(RPM_RATE, delta);
        self.voltage.ramp(VOLTAGE_RATE, delta);
        self.frequency.ramp(FREQUENCY_RATE, delta);
        self.load.ramp(LOAD_RATE, delta);

        if self.shutdown_time >= SHUTDOWN_TIME
            || (self.rpm.current < SHUTDOWN_RPM_THRESHOLD
                && self.voltage.current < SHUTDOWN_VOLTAGE_THRESHOLD)
        {
            self.state = OperatingState::Stopped;
            self.rpm.current = 0.0;
            self.voltage.current = 0.0;
            self.frequency.current = 0.0;
            self.load.current = 0.0;

            log::info!("Generator shutdown complete");
        }
    }
}
