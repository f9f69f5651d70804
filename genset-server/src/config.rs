use genset::{service::TcpServerConfig, Configurable, GeneratorConfig, SensorConfig, SimulationConfig};

#[derive(Clone, Debug, Default, serde_derive::Deserialize, PartialEq)]
pub struct Config {
    /// Generator rating.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Sensor model configuration.
    #[serde(default)]
    pub sensor: SensorConfig,
    /// Simulation loop configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Server configuration.
    #[serde(default)]
    pub server: TcpServerConfig,
}

impl Configurable for Config {
    fn generator(&self) -> &GeneratorConfig {
        &self.generator
    }

    fn sensor(&self) -> &SensorConfig {
        &self.sensor
    }
}
