mod error;

pub use self::error::Error;

pub type Result<T = ()> = std::result::Result<T, error::Error>;

/// Generator shared between the simulation loop and client sessions.
pub type SharedGenerator = std::sync::Arc<tokio::sync::RwLock<crate::GeneratorEngine>>;

pub struct RuntimeContext {
    /// Runtime shutdown bus.
    pub shutdown: (
        tokio::sync::broadcast::Sender<()>,
        tokio::sync::broadcast::Receiver<()>,
    ),
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self {
            shutdown: tokio::sync::broadcast::channel(1),
        }
    }
}

impl RuntimeContext {
    /// Shutdown the runtime on termination signal.
    pub fn with_shutdown(self) -> Self {
        let shutdown = self.shutdown.0.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for termination signal: {}", e);
                return;
            }

            log::info!("Termination requested");

            shutdown.send(()).ok();
        });

        self
    }

    /// Request runtime shutdown.
    pub fn shutdown(&self) {
        self.shutdown.0.send(()).ok();
    }

    /// Listen for shutdown signal.
    pub fn shutdown_signal(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown.0.subscribe()
    }

    /// Spawn an asynchronous task in the background.
    ///
    /// The task will be terminated when the shutdown signal is received.
    pub fn spawn_background_task<T>(&self, task: T) -> tokio::task::JoinHandle<()>
    where
        T: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_signal();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::debug!("Shutting down background task");
                }
                _ = task => {}
            }
        })
    }

    /// Wait for the runtime to shutdown.
    ///
    /// This method will block until the shutdown signal is received.
    pub async fn wait_for_shutdown(&self) {
        let mut shutdown = self.shutdown_signal();

        shutdown.recv().await.ok();
    }
}
