// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::sync::Arc;

use clap::Parser;

mod config;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Marine generator simulator daemon", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(short = 'c', long = "config", alias = "conf", value_name = "FILE")]
    config: Option<std::path::PathBuf>,
    /// Network address to listen on.
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,
    /// Seed for the sensor noise generator.
    #[arg(long)]
    seed: Option<u64>,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Daemonize the service.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut config: config::Config = match &args.config {
        Some(path) => genset::from_file(path)?,
        None => config::Config::default(),
    };

    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(seed) = args.seed {
        config.sensor.seed = Some(seed);
    }

    let mut log_config = simplelog::ConfigBuilder::new();
    if args.daemon {
        log_config.set_time_level(LevelFilter::Off);
        log_config.set_thread_level(LevelFilter::Off);
    }

    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = if args.daemon {
        LevelFilter::Info
    } else if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let color_choice = if args.daemon {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        color_choice,
    )?;

    if args.daemon {
        log::debug!("Running service as daemon");
    }

    log::trace!("{:#?}", config);

    run(config).await
}

async fn run(config: config::Config) -> anyhow::Result<()> {
    use genset::{
        service::{Simulation, TcpServer},
        GeneratorEngine, RuntimeContext,
    };

    log::debug!("Runtime version: {}", genset::consts::VERSION);

    let rating = config.generator;
    log::info!(
        "Generator rating: {} RPM, {} V, {} Hz",
        rating.max_rpm,
        rating.max_voltage,
        rating.max_frequency
    );

    if config.sensor.seed.is_some() {
        log::info!("Sensor noise is seeded");
    }

    let generator: genset::SharedGenerator = Arc::new(tokio::sync::RwLock::new(
        GeneratorEngine::from_config(&config)?,
    ));

    let runtime = RuntimeContext::default().with_shutdown();

    let server = TcpServer::bind(config.server.clone()).await?;
    log::info!("Listening on: {}", server.local_addr()?);

    runtime.spawn_background_task(Simulation::new(&config.simulation).run(generator.clone()));
    runtime.spawn_background_task(server.listen(generator.clone()));

    runtime.wait_for_shutdown().await;

    if generator.read().await.state() != genset::core::OperatingState::Stopped {
        log::warn!("Generator was not stopped before shutdown");
    }

    log::debug!("{} was shutdown gracefully", env!("CARGO_BIN_NAME"));

    Ok(())
}
