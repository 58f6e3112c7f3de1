//! UDP transport for the client.
//!
//! Thin I/O layer around [`ClientSession`]: owns the connected socket, runs
//! the receive loop, and executes the actions the session produces.
//! Protocol logic stays in the sans-IO session.
//!
//! The receive loop never blocks on crypto: each received datagram is
//! handed to its own task, so a slow decrypt cannot stall intake of the
//! next datagram. Session state sits behind a mutex that is never held
//! across an await.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use saltline_proto::MAX_DATAGRAM_SIZE;
use tokio::{net::UdpSocket, sync::mpsc};

use crate::{
    error::ClientError,
    session::{ClientAction, ClientSession},
};

/// Handle to a connected client.
///
/// Created by [`ConnectedClient::connect`], which also returns the channel
/// of decrypted chat lines. Dropping the handle leaves the receive task
/// running; call [`ConnectedClient::stop`] to tear it down.
pub struct ConnectedClient {
    session: Arc<Mutex<ClientSession>>,
    socket: Arc<UdpSocket>,
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Bind a local endpoint, connect to the server, and send the initial
    /// handshake.
    ///
    /// Returns the client handle and the stream of decrypted chat lines.
    ///
    /// # Errors
    ///
    /// - `ClientError::EmptyIdentity` / `ClientError::IdentityTooLarge` for
    ///   an invalid identity
    /// - `ClientError::Io` if binding, connecting, or the first handshake
    ///   send fails (fatal at initialization)
    pub async fn connect(
        identity: &str,
        server_addr: &str,
    ) -> Result<(Self, mpsc::Receiver<String>), ClientError> {
        let mut session = ClientSession::new(identity)?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(server_addr).await?;

        let handshake = session.handshake();
        socket.send(&handshake.to_vec()).await?;

        let session = Arc::new(Mutex::new(session));
        let socket = Arc::new(socket);
        let (deliveries, incoming) = mpsc::channel(32);

        let handle =
            tokio::spawn(receive_loop(Arc::clone(&socket), Arc::clone(&session), deliveries));

        Ok((Self { session, socket, abort_handle: handle.abort_handle() }, incoming))
    }

    /// Seal and transmit one chat message.
    ///
    /// # Errors
    ///
    /// - `ClientError::MessageTooLarge` before any transmission occurs
    /// - `ClientError::NotEstablished` if the handshake has not completed
    /// - `ClientError::Io` if the send fails
    pub async fn send_chat(&self, message: &str) -> Result<(), ClientError> {
        let datagram = lock(&self.session).send_chat(message)?;
        self.socket.send(&datagram.to_vec()).await?;
        Ok(())
    }

    /// Whether the handshake has completed.
    pub fn is_established(&self) -> bool {
        lock(&self.session).is_established()
    }

    /// Local address the client socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ClientError> {
        Ok(self.socket.local_addr()?)
    }

    /// Stop the receive task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Lock the session, recovering from a poisoned mutex.
fn lock(session: &Arc<Mutex<ClientSession>>) -> MutexGuard<'_, ClientSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Blocking receive loop: read datagrams and dispatch each to its own task.
///
/// Transient read errors are logged and the loop continues; the socket is
/// not restarted.
async fn receive_loop(
    socket: Arc<UdpSocket>,
    session: Arc<Mutex<ClientSession>>,
    deliveries: mpsc::Sender<String>,
) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    loop {
        match socket.recv(&mut buf).await {
            Ok(len) => {
                let bytes = buf[..len].to_vec();
                tokio::spawn(process_datagram(
                    Arc::clone(&socket),
                    Arc::clone(&session),
                    deliveries.clone(),
                    bytes,
                ));
            },
            Err(err) => {
                tracing::warn!("failed to read from connection: {err}");
            },
        }
    }
}

/// Handle one received datagram and execute the resulting actions.
async fn process_datagram(
    socket: Arc<UdpSocket>,
    session: Arc<Mutex<ClientSession>>,
    deliveries: mpsc::Sender<String>,
    bytes: Vec<u8>,
) {
    // Mutate session state and release the lock before any await.
    let actions = lock(&session).handle_datagram(&bytes);

    for action in actions {
        match action {
            ClientAction::Send(datagram) => {
                if let Err(err) = socket.send(&datagram.to_vec()).await {
                    tracing::warn!("failed to write to connection: {err}");
                }
            },
            ClientAction::Deliver(line) => {
                // A dropped receiver means no one is displaying chat; the
                // line is abandoned like any other transient failure.
                if deliveries.send(line).await.is_err() {
                    tracing::debug!("chat receiver dropped, discarding line");
                }
            },
        }
    }
}
