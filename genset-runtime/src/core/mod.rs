pub use self::alarm::{Alarm, AlarmInputs, AlarmKind, AlarmLog, UnknownAlarm};
pub use self::engine::OperatingState;
pub use self::sensor::SensorReading;
pub use self::status::GeneratorStatus;

mod alarm;
mod engine;
mod sensor;
mod status;
