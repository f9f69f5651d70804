use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use super::SensorReading;

/// Fuel level below which the low fuel alarm is raised, in percent.
pub const FUEL_LEVEL_LOW: f64 = 10.0;
/// Oil pressure below which the low oil pressure alarm is raised, in bar.
pub const OIL_PRESSURE_LOW: f64 = 1.5;
/// Cooling temperature above which the high temperature alarm is raised.
pub const COOLING_TEMP_HIGH: f64 = 110.0;
/// Fraction of rated load above which the overload alarm is raised.
pub const OVERLOAD_FACTOR: f64 = 0.95;
/// Fraction of rated speed above which the overspeed trip fires.
pub const OVERSPEED_FACTOR: f64 = 1.1;
/// Vibration above which the high vibration alarm is raised, in mm/s.
pub const VIBRATION_HIGH: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKind {
    Overload,
    HighTemperature,
    LowOilPressure,
    LowFuelLevel,
    HighVibration,
    Overspeed,
}

impl AlarmKind {
    /// Whether the alarm stays active after its condition clears.
    ///
    /// Latching alarms are only deactivated by an operator acknowledgement or
    /// a full reset. The evaluator never clears them.
    #[inline]
    pub fn is_latching(&self) -> bool {
        matches!(self, AlarmKind::Overspeed | AlarmKind::HighVibration)
    }

    /// Protocol name of the alarm kind.
    pub fn name(&self) -> &'static str {
        match self {
            AlarmKind::Overload => "overload",
            AlarmKind::HighTemperature => "high_temperature",
            AlarmKind::LowOilPressure => "low_oil_pressure",
            AlarmKind::LowFuelLevel => "low_fuel_level",
            AlarmKind::HighVibration => "high_vibration",
            AlarmKind::Overspeed => "overspeed",
        }
    }
}

impl std::fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Alarm name that does not match any alarm kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownAlarm(pub String);

impl std::fmt::Display for UnknownAlarm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown alarm: {}", self.0)
    }
}

impl std::error::Error for UnknownAlarm {}

impl std::str::FromStr for AlarmKind {
    type Err = UnknownAlarm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overload" => Ok(AlarmKind::Overload),
            "high_temperature" => Ok(AlarmKind::HighTemperature),
            "low_oil_pressure" => Ok(AlarmKind::LowOilPressure),
            "low_fuel_level" => Ok(AlarmKind::LowFuelLevel),
            "high_vibration" => Ok(AlarmKind::HighVibration),
            "overspeed" => Ok(AlarmKind::Overspeed),
            _ => Err(UnknownAlarm(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alarm {
    /// Alarm kind.
    pub kind: AlarmKind,
    /// Human readable message.
    pub message: String,
    /// Moment the alarm was raised.
    pub timestamp: DateTime<Utc>,
    /// Whether the alarm is active.
    pub active: bool,
}

impl std::fmt::Display for Alarm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message,
            if self.active { "active" } else { "inactive" }
        )
    }
}

/// Quantities the alarm evaluator checks on each tick.
#[derive(Clone, Copy, Debug)]
pub struct AlarmInputs {
    pub readings: SensorReading,
    pub rpm: f64,
    pub rpm_max: f64,
    pub load: f64,
    pub load_max: f64,
}

/// Alarm history.
///
/// Entries are only ever appended. There is at most one active entry per
/// alarm kind.
#[derive(Clone, Debug, Default)]
pub struct AlarmLog {
    entries: Vec<Alarm>,
}

impl AlarmLog {
    /// Raise an alarm.
    ///
    /// Returns `false` if an alarm of this kind is already active, in which
    /// case nothing is recorded.
    pub fn raise(&mut self, kind: AlarmKind, message: impl Into<String>) -> bool {
        if self.is_active(kind) {
            return false;
        }

        let alarm = Alarm {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
            active: true,
        };

        log::warn!("Alarm: {}", alarm.message);

        self.entries.push(alarm);
        true
    }

    /// Deactivate all active alarms of this kind.
    ///
    /// Returns the number of alarms deactivated.
    pub fn acknowledge(&mut self, kind: AlarmKind) -> usize {
        let mut count = 0;
        for alarm in self
            .entries
            .iter_mut()
            .filter(|alarm| alarm.kind == kind && alarm.active)
        {
            alarm.active = false;
            count += 1;
        }
        count
    }

    /// Deactivate every alarm in the history.
    pub fn reset(&mut self) {
        for alarm in self.entries.iter_mut() {
            alarm.active = false;
        }
    }

    /// Check if an alarm of this kind is active.
    pub fn is_active(&self, kind: AlarmKind) -> bool {
        self.entries
            .iter()
            .any(|alarm| alarm.kind == kind && alarm.active)
    }

    /// Iterate over the active alarms.
    pub fn active(&self) -> impl Iterator<Item = &Alarm> {
        self.entries.iter().filter(|alarm| alarm.active)
    }

    /// Full alarm history, active and inactive.
    #[inline]
    pub fn history(&self) -> &[Alarm] {
        &self.entries
    }

    /// Raise the alarm if the condition holds, otherwise clear it unless the
    /// alarm is latching.
    fn check(&mut self, kind: AlarmKind, condition: bool, message: impl FnOnce() -> String) {
        if condition {
            self.raise(kind, message());
        } else if !kind.is_latching() {
            self.acknowledge(kind);
        }
    }

    /// Evaluate all alarm conditions.
    ///
    /// Returns `true` when the overspeed protection requires an immediate
    /// emergency stop.
    pub fn evaluate(&mut self, inputs: &AlarmInputs) -> bool {
        let readings = &inputs.readings;

        self.check(
            AlarmKind::LowFuelLevel,
            readings.fuel_level < FUEL_LEVEL_LOW,
            || format!("Low fuel level: {:.2}%", readings.fuel_level),
        );
        self.check(
            AlarmKind::LowOilPressure,
            readings.oil_pressure < OIL_PRESSURE_LOW,
            || format!("Low oil pressure: {:.2} bar", readings.oil_pressure),
        );
        self.check(
            AlarmKind::HighTemperature,
            readings.cooling_temp > COOLING_TEMP_HIGH,
            || format!("High temperature: {:.2}°C", readings.cooling_temp),
        );
        self.check(
            AlarmKind::Overload,
            inputs.load > inputs.load_max * OVERLOAD_FACTOR,
            || format!("Generator overload: {:.2}%", inputs.load),
        );

        let overspeed = inputs.rpm > inputs.rpm_max * OVERSPEED_FACTOR;
        self.check(AlarmKind::Overspeed, overspeed, || {
            format!("Generator overspeed: {:.2} RPM", inputs.rpm)
        });
        self.check(
            AlarmKind::HighVibration,
            readings.vibration > VIBRATION_HIGH,
            || format!("High vibration: {:.2} mm/s", readings.vibration),
        );

        overspeed
    }
}
