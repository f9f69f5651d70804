pub use self::command::{Command, ParseError};
pub use self::response::{Response, Status};

mod command;
mod response;

use crate::runtime::SharedGenerator;

/// Execute a command against the shared generator.
///
/// Queries take the read lock, every other command takes the write lock for
/// the duration of the call only.
pub async fn dispatch(command: Command, generator: &SharedGenerator) -> Response {
    match command {
        Command::Start => match generator.write().await.start() {
            Ok(()) => Response::success("Generator started"),
            Err(e) => Response::error(e),
        },
        Command::Stop => match generator.write().await.stop() {
            Ok(()) => Response::success("Generator stopped"),
            Err(e) => Response::error(e),
        },
        Command::EmergencyStop => match generator.write().await.emergency_stop() {
            Ok(()) => Response::success("Emergency stop activated"),
            Err(e) => Response::error(e),
        },
        Command::SetLoad(load) => match generator.write().await.set_load(load) {
            Ok(load) => Response::success(format!("Load set to {}%", load.trunc())),
            Err(e) => Response::error(e),
        },
        Command::Status => Response::data(&generator.read().await.status()),
        Command::Alarms => Response::data(&generator.read().await.alarms()),
        Command::Sensors => Response::data(&generator.read().await.sensors()),
        Command::Acknowledge(kind) => match generator.write().await.acknowledge_alarm(kind) {
            0 => Response::success(format!("No active {} alarm", kind)),
            _ => Response::success(format!("Alarm {} acknowledged", kind)),
        },
        Command::ResetAlarms => {
            generator.write().await.reset_alarms();
            Response::success("All alarms reset")
        }
        Command::SetParameters {
            max_rpm,
            max_voltage,
            max_frequency,
        } => match generator
            .write()
            .await
            .set_parameters(max_rpm, max_voltage, max_frequency)
        {
            Ok(()) => Response::success("Parameters updated"),
            Err(e) => Response::error(e),
        },
        Command::SensorFailure {
            fuel,
            oil,
            temperature,
        } => {
            generator
                .write()
                .await
                .set_sensor_failure(fuel, oil, temperature);
            Response::success("Sensor failure updated")
        }
        Command::CalibrationDrift {
            fuel,
            oil,
            temperature,
        } => match generator
            .write()
            .await
            .set_calibration_drift(fuel, oil, temperature)
        {
            Ok(()) => Response::success("Calibration drift updated"),
            Err(e) => Response::error(e),
        },
        Command::ResetSensors => {
            generator.write().await.reset_sensors();
            Response::success("Sensors reset")
        }
    }
}

/// Parse and execute a single command line.
pub async fn handle_line(line: &str, generator: &SharedGenerator) -> Response {
    match line.parse::<Command>() {
        Ok(command) => {
            log::debug!("Command: {}", command);

            dispatch(command, generator).await
        }
        Err(e) => {
            log::debug!("Rejected command line: {}", e);

            Response::error(e)
        }
    }
}
