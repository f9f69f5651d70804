use crate::core::{AlarmKind, UnknownAlarm};

/// Client command.
///
/// Commands are sent as a single line of whitespace separated tokens. The
/// command word is case insensitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Start the generator.
    Start,
    /// Stop the generator.
    Stop,
    /// Stop the generator immediately.
    EmergencyStop,
    /// Request a load in percent.
    SetLoad(f64),
    /// Request the generator status.
    Status,
    /// Request the alarm history.
    Alarms,
    /// Request all sensor readings.
    Sensors,
    /// Acknowledge an alarm kind.
    Acknowledge(AlarmKind),
    /// Deactivate all alarms.
    ResetAlarms,
    /// Replace the generator rating.
    SetParameters {
        max_rpm: f64,
        max_voltage: f64,
        max_frequency: f64,
    },
    /// Set sensor failure flags.
    SensorFailure { fuel: bool, oil: bool, temperature: bool },
    /// Set sensor calibration drift rates.
    CalibrationDrift { fuel: f64, oil: f64, temperature: f64 },
    /// Restore all sensors to nominal operation.
    ResetSensors,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// Empty command line.
    Empty,
    /// Command word not recognized.
    UnknownCommand(String),
    /// Required argument is missing.
    MissingArgument(&'static str),
    /// Argument could not be parsed.
    InvalidArgument { argument: &'static str, value: String },
    /// Requested load outside of the 0 to 100 percent range.
    LoadOutOfRange(f64),
    /// Alarm kind not recognized.
    UnknownAlarm(String),
    /// More arguments than the command accepts.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Empty command"),
            ParseError::UnknownCommand(command) => write!(f, "Unknown command: {}", command),
            ParseError::MissingArgument(argument) => write!(f, "Missing {} value", argument),
            ParseError::InvalidArgument { argument, value } => {
                write!(f, "Invalid {} value: {}", argument, value)
            }
            ParseError::LoadOutOfRange(_) => write!(f, "Load must be between 0 and 100"),
            ParseError::UnknownAlarm(kind) => write!(f, "Unknown alarm: {}", kind),
            ParseError::UnexpectedArgument(argument) => {
                write!(f, "Unexpected argument: {}", argument)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<UnknownAlarm> for ParseError {
    fn from(value: UnknownAlarm) -> Self {
        ParseError::UnknownAlarm(value.0)
    }
}

/// Argument cursor over the remaining tokens of a command line.
struct Arguments<'a, I: Iterator<Item = &'a str>>(I);

impl<'a, I: Iterator<Item = &'a str>> Arguments<'a, I> {
    fn next(&mut self, argument: &'static str) -> Result<&'a str, ParseError> {
        self.0.next().ok_or(ParseError::MissingArgument(argument))
    }

    /// Next token as a finite number.
    fn number(&mut self, argument: &'static str) -> Result<f64, ParseError> {
        let value = self.next(argument)?;
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(ParseError::InvalidArgument {
                argument,
                value: value.to_owned(),
            }),
        }
    }

    fn flag(&mut self, argument: &'static str) -> Result<bool, ParseError> {
        let value = self.next(argument)?;
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" => Ok(false),
            _ => Err(ParseError::InvalidArgument {
                argument,
                value: value.to_owned(),
            }),
        }
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.0.next() {
            Some(argument) => Err(ParseError::UnexpectedArgument(argument.to_owned())),
            None => Ok(()),
        }
    }
}

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        let word = tokens.next().ok_or(ParseError::Empty)?.to_ascii_lowercase();
        let mut args = Arguments(tokens);

        let command = match word.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "emergency_stop" | "estop" => Command::EmergencyStop,
            "set_load" => {
                let load = args.number("load")?;
                if !(0.0..=100.0).contains(&load) {
                    return Err(ParseError::LoadOutOfRange(load));
                }
                Command::SetLoad(load)
            }
            "status" => Command::Status,
            "alarms" => Command::Alarms,
            "sensors" => Command::Sensors,
            "ack" => Command::Acknowledge(args.next("alarm")?.parse::<AlarmKind>()?),
            "reset_alarms" => Command::ResetAlarms,
            "set_params" => Command::SetParameters {
                max_rpm: args.number("rpm")?,
                max_voltage: args.number("voltage")?,
                max_frequency: args.number("frequency")?,
            },
            "fail" => Command::SensorFailure {
                fuel: args.flag("fuel")?,
                oil: args.flag("oil")?,
                temperature: args.flag("temperature")?,
            },
            "drift" => Command::CalibrationDrift {
                fuel: args.number("fuel")?,
                oil: args.number("oil")?,
                temperature: args.number("temperature")?,
            },
            "reset_sensors" => Command::ResetSensors,
            _ => return Err(ParseError::UnknownCommand(word)),
        };

        args.finish()?;

        Ok(command)
    }
}

/// Wire representation of the command.
impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Stop => write!(f, "stop"),
            Command::EmergencyStop => write!(f, "emergency_stop"),
            Command::SetLoad(load) => write!(f, "set_load {}", load),
            Command::Status => write!(f, "status"),
            Command::Alarms => write!(f, "alarms"),
            Command::Sensors => write!(f, "sensors"),
            Command::Acknowledge(kind) => write!(f, "ack {}", kind.name()),
            Command::ResetAlarms => write!(f, "reset_alarms"),
            Command::SetParameters {
                max_rpm,
                max_voltage,
                max_frequency,
            } => write!(f, "set_params {} {} {}", max_rpm, max_voltage, max_frequency),
            Command::SensorFailure {
                fuel,
                oil,
                temperature,
            } => write!(f, "fail {} {} {}", fuel, oil, temperature),
            Command::CalibrationDrift {
                fuel,
                oil,
                temperature,
            } => write!(f, "drift {} {} {}", fuel, oil, temperature),
            Command::ResetSensors => write!(f, "reset_sensors"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("start".parse::<Command>(), Ok(Command::Start));
        assert_eq!("STOP".parse::<Command>(), Ok(Command::Stop));
        assert_eq!("estop".parse::<Command>(), Ok(Command::EmergencyStop));
        assert_eq!("Emergency_Stop".parse::<Command>(), Ok(Command::EmergencyStop));
        assert_eq!("  status \r\n".parse::<Command>(), Ok(Command::Status));
        assert_eq!("alarms".parse::<Command>(), Ok(Command::Alarms));
        assert_eq!("sensors".parse::<Command>(), Ok(Command::Sensors));
        assert_eq!("reset_alarms".parse::<Command>(), Ok(Command::ResetAlarms));
        assert_eq!("reset_sensors".parse::<Command>(), Ok(Command::ResetSensors));
    }

    #[test]
    fn test_parse_set_load() {
        assert_eq!("set_load 75".parse::<Command>(), Ok(Command::SetLoad(75.0)));
        assert_eq!("set_load 0".parse::<Command>(), Ok(Command::SetLoad(0.0)));
        assert_eq!("set_load 100".parse::<Command>(), Ok(Command::SetLoad(100.0)));
        assert_eq!(
            "set_load".parse::<Command>(),
            Err(ParseError::MissingArgument("load"))
        );
        assert_eq!(
            "set_load 100.5".parse::<Command>(),
            Err(ParseError::LoadOutOfRange(100.5))
        );
        assert_eq!(
            "set_load -1".parse::<Command>(),
            Err(ParseError::LoadOutOfRange(-1.0))
        );
        assert_eq!(
            "set_load nan".parse::<Command>(),
            Err(ParseError::InvalidArgument {
                argument: "load",
                value: "nan".to_owned()
            })
        );
        assert_eq!(
            "set_load half".parse::<Command>(),
            Err(ParseError::InvalidArgument {
                argument: "load",
                value: "half".to_owned()
            })
        );
    }

    #[test]
    fn test_parse_acknowledge() {
        assert_eq!(
            "ack overspeed".parse::<Command>(),
            Ok(Command::Acknowledge(AlarmKind::Overspeed))
        );
        assert_eq!(
            "ack low_oil_pressure".parse::<Command>(),
            Ok(Command::Acknowledge(AlarmKind::LowOilPressure))
        );
        assert_eq!(
            "ack boiler".parse::<Command>(),
            Err(ParseError::UnknownAlarm("boiler".to_owned()))
        );
        assert_eq!(
            "ack".parse::<Command>(),
            Err(ParseError::MissingArgument("alarm"))
        );
    }

    #[test]
    fn test_parse_fault_injection() {
        assert_eq!(
            "fail false ON 0".parse::<Command>(),
            Ok(Command::SensorFailure {
                fuel: false,
                oil: true,
                temperature: false
            })
        );
        assert_eq!(
            "fail true maybe false".parse::<Command>(),
            Err(ParseError::InvalidArgument {
                argument: "oil",
                value: "maybe".to_owned()
            })
        );
        assert_eq!(
            "drift -0.1 0 0.25".parse::<Command>(),
            Ok(Command::CalibrationDrift {
                fuel: -0.1,
                oil: 0.0,
                temperature: 0.25
            })
        );
        assert_eq!(
            "drift 0.1 0.2".parse::<Command>(),
            Err(ParseError::MissingArgument("temperature"))
        );
        assert_eq!(
            "drift nan 0 0".parse::<Command>(),
            Err(ParseError::InvalidArgument {
                argument: "fuel",
                value: "nan".to_owned()
            })
        );
        assert_eq!(
            "drift 0 0 inf".parse::<Command>(),
            Err(ParseError::InvalidArgument {
                argument: "temperature",
                value: "inf".to_owned()
            })
        );
        assert_eq!(
            "set_params -inf 400 50".parse::<Command>(),
            Err(ParseError::InvalidArgument {
                argument: "rpm",
                value: "-inf".to_owned()
            })
        );
    }

    #[test]
    fn test_parse_set_parameters() {
        assert_eq!(
            "set_params 1500 400 50".parse::<Command>(),
            Ok(Command::SetParameters {
                max_rpm: 1500.0,
                max_voltage: 400.0,
                max_frequency: 50.0
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(ParseError::Empty));
        assert_eq!("   ".parse::<Command>(), Err(ParseError::Empty));
        assert_eq!(
            "Launch".parse::<Command>(),
            Err(ParseError::UnknownCommand("launch".to_owned()))
        );
        assert_eq!(
            "start now".parse::<Command>(),
            Err(ParseError::UnexpectedArgument("now".to_owned()))
        );
    }

    #[test]
    fn test_wire_format_parses_back() {
        for command in [
            Command::EmergencyStop,
            Command::SetLoad(42.5),
            Command::Acknowledge(AlarmKind::HighVibration),
            Command::SetParameters {
                max_rpm: 1500.0,
                max_voltage: 400.0,
                max_frequency: 50.0,
            },
            Command::SensorFailure {
                fuel: true,
                oil: false,
                temperature: true,
            },
        ] {
            assert_eq!(command.to_string().parse::<Command>(), Ok(command));
        }
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            ParseError::LoadOutOfRange(120.0).to_string(),
            "Load must be between 0 and 100"
        );
        assert_eq!(
            ParseError::MissingArgument("load").to_string(),
            "Missing load value"
        );
    }
}
