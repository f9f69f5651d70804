use std::time::{Duration, Instant};

use crate::{config::SimulationConfig, runtime::SharedGenerator};

/// Simulation loop.
///
/// Advances the generator at a fixed interval. The delta passed to the
/// generator is the real time elapsed since the previous tick, so a late tick
/// is compensated by a larger step.
pub struct Simulation {
    interval: Duration,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval.max(1)),
        }
    }

    /// Tick interval.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the simulation until the task is cancelled.
    pub async fn run(self, generator: SharedGenerator) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        log::debug!("Simulation interval: {:?}", self.interval);

        let mut last_tick = Instant::now();

        loop {
            interval.tick().await;

            let now = Instant::now();
            let delta = now.duration_since(last_tick);
            last_tick = now;

            let mut engine = generator.write().await;
            engine.tick(delta.as_secs_f64());

            log::trace!("{}", engine.status());

            drop(engine);

            let elapsed = now.elapsed();
            if elapsed > self.interval {
                log::warn!(
                    "Simulation tick took {:?}, interval is {:?}",
                    elapsed,
                    self.interval
                );
            }
        }
    }
}
