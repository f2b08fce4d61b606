//! In-process transport over a bounded tokio channel

use bytes::Bytes;
use tokio::sync::mpsc;

use super::{MessageSink, MessageSource};
use crate::error::TransportError;

/// Create a connected sink/source pair holding at most `capacity` messages
pub fn channel(capacity: usize) -> (MemorySink, MemorySource) {
    let (tx, rx) = mpsc::channel(capacity);
    (MemorySink { tx: Some(tx) }, MemorySource { rx })
}

pub struct MemorySink {
    tx: Option<mpsc::Sender<Bytes>>,
}

impl MessageSink for MemorySink {
    async fn send(&mut self, message: Bytes) -> Result<(), TransportError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| TransportError::Send("connection closed".into()))?;
        tx.send(message)
            .await
            .map_err(|_| TransportError::Send("peer disconnected".into()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // dropping the sender ends the stream for the source
        self.tx
            .take()
            .map(drop)
            .ok_or_else(|| TransportError::Close("already closed".into()))
    }
}

pub struct MemorySource {
    rx: mpsc::Receiver<Bytes>,
}

impl MessageSource for MemorySource {
    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError> {
        Ok(self.rx.recv().await)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.rx.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_keep_boundaries() {
        let (mut sink, mut source) = channel(4);

        sink.send(Bytes::from_static(b"abc")).await.unwrap();
        sink.send(Bytes::from_static(b"de")).await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(source.recv().await.unwrap().unwrap(), "abc");
        assert_eq!(source.recv().await.unwrap().unwrap(), "de");
        assert!(source.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (mut sink, _source) = channel(1);
        sink.close().await.unwrap();

        assert!(matches!(
            sink.send(Bytes::from_static(b"x")).await,
            Err(TransportError::Send(_))
        ));
        assert!(matches!(sink.close().await, Err(TransportError::Close(_))));
    }

    #[tokio::test]
    async fn test_send_to_closed_source_fails() {
        let (mut sink, mut source) = channel(1);
        source.close().await.unwrap();

        assert!(sink.send(Bytes::from_static(b"x")).await.is_err());
    }
}
