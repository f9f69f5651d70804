use std::{net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpListener,
    sync::Semaphore,
};

use crate::runtime::SharedGenerator;

#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq, Eq)]
pub struct TcpServerConfig {
    /// Network address to listen on.
    #[serde(default = "TcpServerConfig::default_listen")]
    pub listen: String,
    /// Maximum number of connections.
    #[serde(default = "TcpServerConfig::default_max_connections")]
    pub max_connections: usize,
}

impl TcpServerConfig {
    fn default_listen() -> String {
        format!("127.0.0.1:{}", crate::consts::DEFAULT_NETWORK_PORT)
    }

    fn default_max_connections() -> usize {
        10
    }
}

impl Default for TcpServerConfig {
    fn default() -> Self {
        Self {
            listen: Self::default_listen(),
            max_connections: Self::default_max_connections(),
        }
    }
}

enum SessionError {
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "IO error: {}", e),
            SessionError::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

/// Line protocol server.
///
/// Each client session reads one command per line and answers every line
/// with a single JSON reply. Sessions run until the client closes the
/// connection.
pub struct TcpServer {
    config: TcpServerConfig,
    semaphore: Arc<Semaphore>,
    listener: TcpListener,
}

impl TcpServer {
    /// Bind the server to the configured address.
    pub async fn bind(config: TcpServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(&config.listen).await?;

        log::debug!("Listening on: {}", listener.local_addr()?);

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.max_connections)),
            config,
            listener,
        })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    async fn session<T: AsyncRead + AsyncWrite + Unpin>(
        stream: T,
        generator: &SharedGenerator,
    ) -> Result<(), SessionError> {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await.map_err(SessionError::Io)? {
            let response = crate::protocol::handle_line(&line, generator).await;

            let mut reply = response.to_line().map_err(SessionError::Encode)?;
            reply.push('\n');

            writer
                .write_all(reply.as_bytes())
                .await
                .map_err(SessionError::Io)?;
        }

        writer.shutdown().await.ok();

        Ok(())
    }

    async fn spawn_client_session<T: AsyncRead + AsyncWrite + Unpin>(
        stream: T,
        addr: SocketAddr,
        generator: SharedGenerator,
        _permit: tokio::sync::OwnedSemaphorePermit,
    ) {
        log::debug!("Client session started for: {}", addr);

        match Self::session(stream, &generator).await {
            Ok(()) => log::info!("Session shutdown for: {}", addr),
            Err(e) => log::warn!("Session reset for: {}: {}", addr, e),
        }
    }

    /// Accept clients until the task is cancelled.
    pub async fn listen(self, generator: SharedGenerator) {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(connection) => connection,
                Err(e) => {
                    log::error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            log::debug!("Accepted connection from: {}", addr);

            let permit = match self.semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    log::warn!("Too many connections");
                    continue;
                }
            };

            let active_client_count =
                self.config.max_connections - self.semaphore.available_permits();

            log::debug!(
                "Active connections: {}/{}",
                active_client_count,
                self.config.max_connections
            );

            tokio::spawn(Self::spawn_client_session(
                stream,
                addr,
                generator.clone(),
                permit,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpStream,
        sync::RwLock,
    };

    use super::*;
    use crate::{
        config::{GeneratorConfig, SensorConfig},
        driver::SensorBank,
        protocol::{Response, Status},
        GeneratorEngine,
    };

    async fn serve(max_connections: usize) -> (SocketAddr, SharedGenerator) {
        let generator: SharedGenerator = Arc::new(RwLock::new(GeneratorEngine::new(
            GeneratorConfig::default(),
            SensorBank::from_config(&SensorConfig::noiseless()),
        )
        .unwrap()));

        let server = TcpServer::bind(TcpServerConfig {
            listen: "127.0.0.1:0".to_owned(),
            max_connections,
        })
        .await
        .unwrap();

        let addr = server.local_addr().unwrap();
        tokio::spawn(server.listen(generator.clone()));

        (addr, generator)
    }

    async fn request(stream: &mut BufReader<TcpStream>, line: &str) -> Response {
        stream
            .get_mut()
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();

        let mut reply = String::new();
        stream.read_line(&mut reply).await.unwrap();

        serde_json::from_str(&reply).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = TcpServerConfig::default();

        assert_eq!(config.listen, "127.0.0.1:8081");
        assert_eq!(config.max_connections, 10);
    }

    #[tokio::test]
    async fn test_session_replies_per_line() {
        let (addr, generator) = serve(4).await;

        let mut stream = BufReader::new(TcpStream::connect(addr).await.unwrap());

        let response = request(&mut stream, "start").await;
        assert_eq!(response, Response::success("Generator started"));

        let response = request(&mut stream, "bogus").await;
        assert_eq!(response.status, Status::Error);

        // Connection stays usable after an error reply.
        let response = request(&mut stream, "status").await;
        assert_eq!(response.data.unwrap()["state"], "starting");

        assert_eq!(
            generator.read().await.state(),
            crate::core::OperatingState::Starting
        );
    }

    #[tokio::test]
    async fn test_excess_connection_dropped() {
        let (addr, _generator) = serve(1).await;

        let mut first = BufReader::new(TcpStream::connect(addr).await.unwrap());
        assert!(request(&mut first, "status").await.is_success());

        let mut second = BufReader::new(TcpStream::connect(addr).await.unwrap());
        let mut reply = String::new();
        let read = second.read_line(&mut reply).await.unwrap_or(0);
        assert_eq!(read, 0);

        // The session holding the permit is unaffected.
        assert!(request(&mut first, "alarms").await.is_success());
    }
}
