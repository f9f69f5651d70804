use serde_derive::{Deserialize, Serialize};

/// Sensor reading snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Fuel level in percent.
    pub fuel_level: f64,
    /// Oil pressure in bar.
    pub oil_pressure: f64,
    /// Cooling water temperature in degrees Celsius.
    pub cooling_temp: f64,
    /// Vibration in mm/s RMS.
    pub vibration: f64,
    /// Exhaust gas temperature in degrees Celsius.
    pub exhaust_temp: f64,
    /// Ambient temperature in degrees Celsius.
    pub ambient_temp: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            fuel_level: 100.0,
            oil_pressure: 3.0,
            cooling_temp: 25.0,
            vibration: 0.0,
            exhaust_temp: 25.0,
            ambient_temp: 25.0,
            humidity: 60.0,
        }
    }
}

impl std::fmt::Display for SensorReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fuel: {:.2}% Oil: {:.2} bar Cooling: {:.1}°C Exhaust: {:.1}°C Vibration: {:.2} mm/s",
            self.fuel_level, self.oil_pressure, self.cooling_temp, self.exhaust_temp, self.vibration
        )
    }
}
