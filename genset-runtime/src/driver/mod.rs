pub use self::governor::Governor;
pub use self::sensor::{CalibrationDrift, SensorBank, SensorFailure};

mod governor;
mod sensor;
