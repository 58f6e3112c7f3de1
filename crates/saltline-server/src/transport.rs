//! UDP transport for the server.
//!
//! Thin wrapper around one bound datagram socket. The receive loop in
//! [`crate::Server::run`] owns the read side; sends happen from
//! per-datagram tasks, so the wrapper is cheaply cloneable and shares the
//! underlying socket.

use std::{net::SocketAddr, sync::Arc};

use tokio::net::UdpSocket;

use crate::error::ServerError;

/// Shared handle to the server's datagram socket.
#[derive(Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind the listening endpoint.
    ///
    /// # Errors
    ///
    /// - `ServerError::Config` if the address cannot be bound; fatal at
    ///   initialization
    pub async fn bind(address: &str) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(address)
            .await
            .map_err(|e| ServerError::Config(format!("failed to bind '{address}': {e}")))?;

        Ok(Self { socket: Arc::new(socket) })
    }

    /// Local address the transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive one datagram; returns the byte count and source address.
    pub async fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }

    /// Send one datagram to a peer address.
    pub async fn send_to(&self, bytes: &[u8], addr: SocketAddr) -> std::io::Result<usize> {
        self.socket.send_to(bytes, addr).await
    }
}
