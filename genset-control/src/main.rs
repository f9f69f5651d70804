// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

use genset::{
    core::AlarmKind,
    protocol::{Command as Request, Response},
};

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Marine generator simulator control", long_about = None)]
struct Args {
    /// Simulator network address.
    #[arg(short = 'a', long = "address", default_value_t = format!("127.0.0.1:{}", genset::consts::DEFAULT_NETWORK_PORT))]
    address: String,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Commands.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the generator.
    Start,
    /// Stop the generator.
    Stop,
    /// Stop the generator immediately.
    #[command(alias = "estop")]
    EmergencyStop,
    /// Request a load in percent.
    SetLoad {
        /// Load in percent.
        load: f64,
    },
    /// Show the generator status.
    Status,
    /// Show the alarm history.
    Alarms,
    /// Show all sensor readings.
    Sensors,
    /// Acknowledge an alarm.
    Ack {
        /// Alarm kind, for example low_oil_pressure.
        kind: String,
    },
    /// Deactivate all alarms.
    ResetAlarms,
    /// Set the generator rating.
    SetParams {
        /// Rated engine speed.
        rpm: f64,
        /// Rated output voltage.
        voltage: f64,
        /// Rated output frequency.
        frequency: f64,
    },
    /// Mark sensors as failed.
    Fail {
        /// Fuel level sensor failed.
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        fuel: bool,
        /// Oil pressure sensor failed.
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        oil: bool,
        /// Temperature sensor failed.
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        temperature: bool,
    },
    /// Set sensor calibration drift rates.
    Drift {
        /// Fuel level drift per second.
        #[arg(allow_negative_numbers = true)]
        fuel: f64,
        /// Oil pressure drift per second.
        #[arg(allow_negative_numbers = true)]
        oil: f64,
        /// Temperature drift per second.
        #[arg(allow_negative_numbers = true)]
        temperature: f64,
    },
    /// Restore all sensors to nominal operation.
    ResetSensors,
    /// Poll the generator status.
    Watch {
        /// Poll interval in milliseconds.
        #[arg(short, long, default_value_t = 1_000)]
        interval: u64,
    },
}

impl Command {
    fn request(&self) -> anyhow::Result<Request> {
        let request = match self {
            Command::Start => Request::Start,
            Command::Stop => Request::Stop,
            Command::EmergencyStop => Request::EmergencyStop,
            Command::SetLoad { load } => Request::SetLoad(*load),
            Command::Status | Command::Watch { .. } => Request::Status,
            Command::Alarms => Request::Alarms,
            Command::Sensors => Request::Sensors,
            Command::Ack { kind } => Request::Acknowledge(kind.parse::<AlarmKind>()?),
            Command::ResetAlarms => Request::ResetAlarms,
            Command::SetParams {
                rpm,
                voltage,
                frequency,
            } => Request::SetParameters {
                max_rpm: *rpm,
                max_voltage: *voltage,
                max_frequency: *frequency,
            },
            Command::Fail {
                fuel,
                oil,
                temperature,
            } => Request::SensorFailure {
                fuel: *fuel,
                oil: *oil,
                temperature: *temperature,
            },
            Command::Drift {
                fuel,
                oil,
                temperature,
            } => Request::CalibrationDrift {
                fuel: *fuel,
                oil: *oil,
                temperature: *temperature,
            },
            Command::ResetSensors => Request::ResetSensors,
        };

        Ok(request)
    }
}

struct Client {
    stream: BufReader<TcpStream>,
}

impl Client {
    async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        log::debug!("Connected to {}", address);

        Ok(Self {
            stream: BufReader::new(stream),
        })
    }

    async fn request(&mut self, request: &Request) -> anyhow::Result<Response> {
        log::debug!("Sending: {}", request);

        self.stream
            .get_mut()
            .write_all(format!("{}\n", request).as_bytes())
            .await?;

        let mut reply = String::new();
        if self.stream.read_line(&mut reply).await? == 0 {
            return Err(anyhow::anyhow!("Connection closed by server"));
        }

        log::trace!("Received: {}", reply.trim_end());

        Ok(serde_json::from_str(&reply)?)
    }
}

fn status_line(data: &serde_json::Value) -> String {
    let number = |key: &str| data[key].as_f64().unwrap_or_default();

    format!(
        "state={} rpm={:.0} voltage={:.1} frequency={:.2} load={:.1} fuel={:.1} oil={:.2} temp={:.1} alarms={}",
        data["state"].as_str().unwrap_or("unknown"),
        number("rpm"),
        number("voltage"),
        number("frequency"),
        number("load"),
        number("fuel_level"),
        number("oil_pressure"),
        number("cooling_temp"),
        data["active_alarms"].as_array().map_or(0, |alarms| alarms.len())
    )
}

fn print_response(response: Response) -> anyhow::Result<()> {
    if !response.is_success() {
        return Err(anyhow::anyhow!(
            "{}",
            response.message.unwrap_or_else(|| "Request failed".to_owned())
        ));
    }

    if let Some(message) = response.message {
        println!("{}", message);
    }
    if let Some(data) = response.data {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_time_level(LevelFilter::Off);
    log_config.set_thread_level(LevelFilter::Off);
    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = match args.verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    run(args).await
}

async fn run(args: Args) -> anyhow::Result<()> {
    log::info!("Starting {}", env!("CARGO_BIN_NAME"));
    log::debug!("Runtime version: {}", genset::consts::VERSION);

    let request = args.command.request()?;

    let mut client = Client::connect(&args.address).await?;

    match args.command {
        Command::Watch { interval } => {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_millis(interval.max(1)));

            loop {
                interval.tick().await;

                let response = client.request(&request).await?;
                if response.is_success() {
                    if let Some(data) = &response.data {
                        println!("{}", status_line(data));
                        continue;
                    }
                }

                print_response(response)?;
            }
        }
        _ => print_response(client.request(&request).await?),
    }
}
