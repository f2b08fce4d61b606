//! Stream receiver
//!
//! Appends every message from one connection to an output, verbatim and in
//! arrival order. A receive error, a write error or the peer closing the
//! connection all end the stream normally.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::ReceiverConfig;
use crate::error::{Result, TransportError};
use crate::transport::MessageSource;

/// Receiver statistics
#[derive(Debug, Clone, Default)]
pub struct ReceiverStats {
    pub messages_received: u64,
    pub bytes_received: u64,
}

/// Copies one connection into one output
pub struct StreamReceiver<S> {
    source: S,
    recv_buffer: usize,
    stats: ReceiverStats,
}

impl<S: MessageSource> StreamReceiver<S> {
    pub fn new(source: S, config: &ReceiverConfig) -> Self {
        Self {
            source,
            recv_buffer: config.recv_buffer,
            stats: ReceiverStats::default(),
        }
    }

    /// Receive until the stream ends, then flush the output and close the
    /// connection exactly once.
    ///
    /// Only a failure to close the connection is returned as an error.
    pub async fn run<W>(mut self, mut output: W) -> Result<ReceiverStats>
    where
        W: AsyncWrite + Unpin,
    {
        self.copy(&mut output).await;

        if let Err(e) = output.flush().await {
            tracing::warn!("flushing output failed: {}", e);
        }
        drop(output);
        let closed = self.source.close().await;

        tracing::info!(
            "Received {} messages, {} bytes",
            self.stats.messages_received,
            self.stats.bytes_received
        );

        closed?;
        Ok(self.stats)
    }

    async fn copy<W>(&mut self, output: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            let message = match self.source.recv().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    tracing::info!("peer closed the stream");
                    break;
                }
                Err(e) => {
                    tracing::warn!("receive ended: {}", e);
                    break;
                }
            };

            if message.len() > self.recv_buffer {
                let e = TransportError::MessageTooLarge {
                    size: message.len(),
                    limit: self.recv_buffer,
                };
                tracing::warn!("receive ended: {}", e);
                break;
            }

            tracing::debug!("Got data of len {}", message.len());
            if let Err(e) = output.write_all(&message).await {
                tracing::warn!("writing output failed: {}", e);
                break;
            }
            self.stats.messages_received += 1;
            self.stats.bytes_received += message.len() as u64;
        }
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::VecDeque;

    /// Replays scripted receive results and counts closes
    #[derive(Default)]
    struct ScriptedSource {
        script: VecDeque<std::result::Result<Option<Bytes>, TransportError>>,
        closes: usize,
    }

    impl MessageSource for &mut ScriptedSource {
        async fn recv(&mut self) -> std::result::Result<Option<Bytes>, TransportError> {
            self.script.pop_front().unwrap_or(Ok(None))
        }

        async fn close(&mut self) -> std::result::Result<(), TransportError> {
            self.closes += 1;
            Ok(())
        }
    }

    fn script(items: Vec<std::result::Result<Option<Bytes>, TransportError>>) -> ScriptedSource {
        ScriptedSource {
            script: items.into(),
            closes: 0,
        }
    }

    #[tokio::test]
    async fn test_writes_messages_in_order() {
        let mut source = script(vec![
            Ok(Some(Bytes::from_static(b"first "))),
            Ok(Some(Bytes::from_static(b"second"))),
            Ok(None),
        ]);
        let mut output = Vec::new();

        let stats = StreamReceiver::new(&mut source, &ReceiverConfig::default())
            .run(&mut output)
            .await
            .unwrap();

        assert_eq!(output, b"first second");
        assert_eq!(stats.messages_received, 2);
        assert_eq!(stats.bytes_received, 12);
        assert_eq!(source.closes, 1);
    }

    #[tokio::test]
    async fn test_receive_error_ends_stream() {
        let mut source = script(vec![
            Ok(Some(Bytes::from_static(b"kept"))),
            Err(TransportError::Receive("connection reset".into())),
            Ok(Some(Bytes::from_static(b"never read"))),
        ]);
        let mut output = Vec::new();

        let stats = StreamReceiver::new(&mut source, &ReceiverConfig::default())
            .run(&mut output)
            .await
            .unwrap();

        assert_eq!(output, b"kept");
        assert_eq!(stats.messages_received, 1);
        assert_eq!(source.closes, 1);
    }

    #[tokio::test]
    async fn test_oversized_message_ends_stream() {
        let mut source = script(vec![Ok(Some(Bytes::from(vec![0u8; 16])))]);
        let mut output = Vec::new();
        let config = ReceiverConfig { recv_buffer: 8 };

        let stats = StreamReceiver::new(&mut source, &config)
            .run(&mut output)
            .await
            .unwrap();

        assert!(output.is_empty());
        assert_eq!(stats.messages_received, 0);
        assert_eq!(source.closes, 1);
    }

    #[tokio::test]
    async fn test_write_error_ends_stream() {
        let mut source = script(vec![
            Ok(Some(Bytes::from_static(b"abcd"))),
            Ok(Some(Bytes::from_static(b"efgh"))),
        ]);
        // room for one message only
        let mut storage = [0u8; 4];
        let output = std::io::Cursor::new(&mut storage[..]);

        let stats = StreamReceiver::new(&mut source, &ReceiverConfig::default())
            .run(output)
            .await
            .unwrap();

        assert_eq!(stats.messages_received, 1);
        assert_eq!(&storage, b"abcd");
        assert_eq!(source.closes, 1);
    }
}
