//! Saltline client.
//!
//! One outbound encrypted session to a Saltline server. The
//! [`ClientSession`] state machine holds the protocol logic (handshake,
//! session key, seal/open, automatic re-handshake on disconnect); the
//! [`ConnectedClient`] transport owns the UDP socket and drives it.
//!
//! Reconnection policy: on any server-signaled `Disconnected` the client
//! re-handshakes immediately, with no backoff and no retry bound.

pub mod error;
pub mod session;
pub mod transport;

pub use error::ClientError;
pub use session::{ClientAction, ClientSession};
pub use transport::ConnectedClient;
