use serde_derive::Serialize;

use super::{Alarm, OperatingState};

/// Generator status.
///
/// Read-only snapshot of the generator taken under a single lock. The sensor
/// fields are copied from the sensor bank at the time of the snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratorStatus {
    /// Operating state.
    pub state: OperatingState,
    /// Engine speed.
    pub rpm: f64,
    /// Output voltage.
    pub voltage: f64,
    /// Output frequency.
    pub frequency: f64,
    /// Actual load in percent.
    pub load: f64,
    /// Fuel level in percent.
    pub fuel_level: f64,
    /// Oil pressure in bar.
    pub oil_pressure: f64,
    /// Cooling water temperature in degrees Celsius.
    pub cooling_temp: f64,
    /// Currently active alarms.
    pub active_alarms: Vec<Alarm>,
}

impl std::fmt::Display for GeneratorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "State: {} RPM: {:.0} Voltage: {:.1} V Frequency: {:.2} Hz Load: {:.1}% Alarms: {}",
            self.state,
            self.rpm,
            self.voltage,
            self.frequency,
            self.load,
            self.active_alarms.len()
        )
    }
}
