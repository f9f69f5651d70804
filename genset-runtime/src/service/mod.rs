pub use self::simulation::Simulation;
pub use self::tcp_server::{TcpServer, TcpServerConfig};

mod simulation;
mod tcp_server;
