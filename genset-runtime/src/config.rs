use std::path::Path;

use serde_derive::Deserialize;

use crate::runtime::{Error, Result};

pub trait Configurable: Clone {
    /// Generator rating configuration.
    fn generator(&self) -> &GeneratorConfig;

    /// Sensor model configuration.
    fn sensor(&self) -> &SensorConfig;
}

/// Generator rating.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Rated engine speed.
    #[serde(default = "GeneratorConfig::default_max_rpm")]
    pub max_rpm: f64,
    /// Rated output voltage.
    #[serde(default = "GeneratorConfig::default_max_voltage")]
    pub max_voltage: f64,
    /// Rated output frequency.
    #[serde(default = "GeneratorConfig::default_max_frequency")]
    pub max_frequency: f64,
    /// Maximum load in percent.
    #[serde(default = "GeneratorConfig::default_max_load")]
    pub max_load: f64,
}

impl GeneratorConfig {
    fn default_max_rpm() -> f64 {
        1_800.0
    }

    fn default_max_voltage() -> f64 {
        440.0
    }

    fn default_max_frequency() -> f64 {
        60.0
    }

    fn default_max_load() -> f64 {
        100.0
    }

    /// Check that every rated maximum is finite and positive.
    pub fn validate(&self) -> Result {
        for (name, value) in [
            ("max_rpm", self.max_rpm),
            ("max_voltage", self.max_voltage),
            ("max_frequency", self.max_frequency),
            ("max_load", self.max_load),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParameter(format!("{} must be positive", name)));
            }
        }

        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_rpm: Self::default_max_rpm(),
            max_voltage: Self::default_max_voltage(),
            max_frequency: Self::default_max_frequency(),
            max_load: Self::default_max_load(),
        }
    }
}

/// Sensor model configuration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct SensorConfig {
    /// Relative noise level applied to every reading.
    #[serde(default = "SensorConfig::default_noise_level")]
    pub noise_level: f64,
    /// Seed for the noise generator. Random when not set.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SensorConfig {
    fn default_noise_level() -> f64 {
        0.02
    }

    /// Check that the noise level is finite and not negative.
    pub fn validate(&self) -> Result {
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(Error::InvalidParameter(
                "noise_level must not be negative".to_owned(),
            ));
        }

        Ok(())
    }

    /// Sensor configuration without any noise.
    pub fn noiseless() -> Self {
        Self {
            noise_level: 0.0,
            seed: Some(0),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            noise_level: Self::default_noise_level(),
            seed: None,
        }
    }
}

/// Simulation loop configuration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Tick interval in milliseconds.
    #[serde(default = "SimulationConfig::default_interval")]
    pub interval: u64,
}

impl SimulationConfig {
    fn default_interval() -> u64 {
        200
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
        }
    }
}

/// Read a TOML configuration file.
pub fn from_file<T, P>(path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    use anyhow::Context;

    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;

    from_str(&contents).with_context(|| format!("invalid configuration {}", path.display()))
}

/// Parse a TOML configuration string.
pub fn from_str<T: serde::de::DeserializeOwned>(contents: &str) -> anyhow::Result<T> {
    Ok(toml::from_str(contents)?)
}
