//! Message-oriented transport
//!
//! The sender and receiver loops only need to send and receive whole
//! messages and to close the connection once. SRT provides this over the
//! network; an in-memory channel provides it for tests and local piping.

pub mod memory;
pub mod srt;

use bytes::Bytes;

use crate::error::TransportError;

pub use srt::{SrtReceiver, SrtSender};

/// Outbound half of a connection.
///
/// One `send` is one message on the receiving side.
#[allow(async_fn_in_trait)]
pub trait MessageSink {
    async fn send(&mut self, message: Bytes) -> Result<(), TransportError>;

    /// Release the connection. Called exactly once by the sender loop.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a connection
#[allow(async_fn_in_trait)]
pub trait MessageSource {
    /// Receive one message; `Ok(None)` once the peer has closed the stream.
    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError>;

    /// Release the connection. Called exactly once by the receiver loop.
    async fn close(&mut self) -> Result<(), TransportError>;
}
