//! Saltline server.
//!
//! Listens on one UDP socket and serves N concurrent peer sessions keyed
//! by remote address. Each inbound datagram is decoded, routed by type,
//! and answered through the [`Dispatcher`]; chat payloads are re-encrypted
//! per recipient and fanned out to every other registered peer.
//!
//! The receive loop never blocks on crypto: each datagram is processed on
//! its own task while the loop goes back to reading. No ordering is
//! guaranteed across datagrams, and a fan-out is not atomic - a send to
//! one recipient may fail while the others succeed.

pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod transport;

use std::{net::SocketAddr, sync::Arc};

pub use dispatcher::{Dispatcher, Outbound};
pub use error::ServerError;
pub use registry::{ClientRecord, PeerRegistry};
use saltline_proto::MAX_DATAGRAM_SIZE;
pub use transport::UdpTransport;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listening endpoint to.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:10001".to_string() }
    }
}

/// A running Saltline server: one socket, one dispatcher.
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    transport: UdpTransport,
}

impl Server {
    /// Generate the server key pair and bind the listening endpoint.
    ///
    /// # Errors
    ///
    /// - `ServerError::Config` if the bind address is unusable; fatal at
    ///   initialization
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let transport = UdpTransport::bind(&config.bind_address).await?;

        Ok(Self { dispatcher: Arc::new(Dispatcher::new()), transport })
    }

    /// Local address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }

    /// The protocol core, exposed for tests and diagnostics.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Drop every peer session.
    pub fn close(&self) {
        self.dispatcher.clear();
    }

    /// Run the receive loop.
    ///
    /// Blocks on the socket; each received datagram is dispatched on its
    /// own task. Transient read errors are logged and the loop continues;
    /// the socket is not restarted.
    pub async fn run(&self) -> Result<(), ServerError> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            match self.transport.recv_from(&mut buf).await {
                Ok((len, addr)) => {
                    let bytes = buf[..len].to_vec();
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let transport = self.transport.clone();

                    tokio::spawn(async move {
                        for outbound in dispatcher.dispatch(addr, &bytes) {
                            let wire = outbound.datagram.to_vec();
                            if let Err(err) = transport.send_to(&wire, outbound.addr).await {
                                tracing::warn!("failed to write to {}: {err}", outbound.addr);
                            }
                        }
                    });
                },
                Err(err) => {
                    tracing::warn!("failed to read from connection: {err}");
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_binds_with_empty_registry() {
        let config = ServerConfig { bind_address: "127.0.0.1:0".to_string() };
        let server = Server::bind(config).await.unwrap();

        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.dispatcher().peer_count(), 0);
    }

    #[tokio::test]
    async fn close_clears_the_registry() {
        let config = ServerConfig { bind_address: "127.0.0.1:0".to_string() };
        let server = Server::bind(config).await.unwrap();

        server.close();
        assert_eq!(server.dispatcher().peer_count(), 0);
    }
}
