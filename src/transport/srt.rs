//! SRT transport over `srt-tokio`
//!
//! The caller side only sends and the listener side only receives. TSBPD is
//! always enabled in `srt-tokio` live mode. Only the caller requests the
//! configured latency; the listener keeps the library default, and the
//! connection runs at the larger of the two.

use bytes::Bytes;
use futures_util::{SinkExt, TryStreamExt};
use srt_tokio::options::PacketSize;
use srt_tokio::{SrtSocket, SrtSocketBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use super::{MessageSink, MessageSource};
use crate::config::TransportConfig;
use crate::error::TransportError;

fn builder(config: &TransportConfig) -> SrtSocketBuilder {
    let payload_size = config.payload_size as u64;
    let connect_timeout = config.connect_timeout();

    SrtSocket::builder().set(|options| {
        options.connect.timeout = connect_timeout;
        options.sender.max_payload_size = PacketSize(payload_size);
    })
}

/// Outbound SRT connection
pub struct SrtSender {
    socket: SrtSocket,
    remote: SocketAddr,
}

impl SrtSender {
    /// Connect to a listening peer
    pub async fn connect(
        remote: SocketAddr,
        config: &TransportConfig,
    ) -> Result<Self, TransportError> {
        tracing::info!(
            "SRT connect to {} (latency {:?}, payload {} bytes)",
            remote,
            config.latency(),
            config.payload_size
        );

        let socket = builder(config)
            .latency(config.latency())
            .call(remote, None)
            .await
            .map_err(|e| TransportError::Connect {
                addr: remote,
                reason: e.to_string(),
            })?;

        tracing::info!(
            "SRT connected to {} (negotiated latency {:?})",
            remote,
            socket.settings().send_tsbpd_latency
        );
        Ok(Self { socket, remote })
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }
}

impl MessageSink for SrtSender {
    async fn send(&mut self, message: Bytes) -> Result<(), TransportError> {
        self.socket
            .send((Instant::now(), message))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        tracing::info!("SRT close {}", self.remote);
        SinkExt::close(&mut self.socket)
            .await
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}

/// Inbound SRT connection, accepted from a listener
pub struct SrtReceiver {
    socket: SrtSocket,
    local: SocketAddr,
}

impl SrtReceiver {
    /// Listen on `local` and wait for exactly one peer
    pub async fn accept(
        local: SocketAddr,
        config: &TransportConfig,
    ) -> Result<Self, TransportError> {
        tracing::info!("SRT listening on {}", local);

        let socket = builder(config)
            .listen_on(local)
            .await
            .map_err(|e| TransportError::Bind {
                addr: local,
                reason: e.to_string(),
            })?;

        tracing::info!(
            "SRT accepted connection from {} (negotiated latency {:?})",
            socket.settings().remote,
            socket.settings().recv_tsbpd_latency
        );
        Ok(Self { socket, local })
    }

    pub fn local(&self) -> SocketAddr {
        self.local
    }
}

impl MessageSource for SrtReceiver {
    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError> {
        match self.socket.try_next().await {
            Ok(Some((_instant, message))) => Ok(Some(message)),
            Ok(None) => Ok(None),
            Err(e) => Err(TransportError::Receive(e.to_string())),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        tracing::info!("SRT close {}", self.local);
        SinkExt::close(&mut self.socket)
            .await
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}
