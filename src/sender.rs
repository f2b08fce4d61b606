//! Paced ADTS sender
//!
//! Reads frames from an [`AdtsReader`], sends each as one transport message
//! and sleeps between frames so that transmission tracks the audio's playback
//! rate.

use tokio::io::AsyncRead;
use tokio::time::Instant;

use crate::adts::{AdtsFrame, AdtsReader};
use crate::config::{AppConfig, SenderConfig};
use crate::error::{CorruptInput, Result, TransportError};
use crate::pacing::{Pacer, PacingDecision};
use crate::transport::MessageSink;

/// Sender statistics
#[derive(Debug, Clone, Default)]
pub struct SenderStats {
    pub frames_sent: u64,
    pub bytes_sent: u64,
    /// Periodic fixed pauses taken
    pub throttle_pauses: u64,
    /// Sleeps until a frame deadline
    pub pacing_sleeps: u64,
    /// Frames sent with no sleep because the schedule had slipped
    pub late_frames: u64,
    /// Bytes skipped while searching for sync
    pub sync_misses: u64,
}

/// Streams one ADTS input over one connection
pub struct AdtsSender<S> {
    sink: S,
    config: SenderConfig,
    /// Largest message the transport accepts
    payload_size: usize,
    stats: SenderStats,
}

impl<S: MessageSink> AdtsSender<S> {
    pub fn new(sink: S, config: &AppConfig) -> Self {
        Self {
            sink,
            config: config.sender.clone(),
            payload_size: config.transport.payload_size,
            stats: SenderStats::default(),
        }
    }

    /// Stream every frame of `input`, then release the connection and the
    /// input.
    ///
    /// The connection is closed exactly once whether streaming ended at end of
    /// stream, on corrupt input, or on a transport error. The first error wins.
    pub async fn run<R>(mut self, input: R) -> Result<SenderStats>
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = AdtsReader::with_capacity(input, self.config.max_frame_payload);

        let streamed = self.stream(&mut reader).await;
        self.stats.sync_misses = reader.stats().sync_misses;
        if let Err(e) = &streamed {
            tracing::error!(position = reader.position(), "streaming stopped: {}", e);
        }

        let closed = self.sink.close().await;
        drop(reader);

        tracing::info!(
            "Sent {} frames, {} bytes ({} throttle pauses, {} late frames, {} bytes skipped)",
            self.stats.frames_sent,
            self.stats.bytes_sent,
            self.stats.throttle_pauses,
            self.stats.late_frames,
            self.stats.sync_misses
        );

        streamed?;
        closed?;
        Ok(self.stats)
    }

    async fn stream<R>(&mut self, reader: &mut AdtsReader<R>) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut pacer = Pacer::new(&self.config)?;

        while let Some(frame) = reader.next_frame().await? {
            let decision = self.send_frame(&frame, &mut pacer).await?;

            match decision {
                PacingDecision::Throttle(pause) => {
                    self.stats.throttle_pauses += 1;
                    tracing::info!(
                        "Stats: {} frames sent, {:.1} KB sent, {} late",
                        self.stats.frames_sent,
                        self.stats.bytes_sent as f64 / 1024.0,
                        self.stats.late_frames
                    );
                    tokio::time::sleep(pause).await;
                }
                PacingDecision::Sleep(delay) => {
                    self.stats.pacing_sleeps += 1;
                    tokio::time::sleep(delay).await;
                }
                PacingDecision::Immediate => {
                    self.stats.late_frames += 1;
                }
            }
        }

        tracing::info!("end of input");
        Ok(())
    }

    async fn send_frame(&mut self, frame: &AdtsFrame, pacer: &mut Pacer) -> Result<PacingDecision> {
        if frame.len() > self.payload_size {
            return Err(TransportError::MessageTooLarge {
                size: frame.len(),
                limit: self.payload_size,
            }
            .into());
        }

        tracing::debug!(offset = frame.offset, length = frame.len(), "send frame");
        self.sink.send(frame.data.clone()).await?;
        self.stats.frames_sent += 1;
        self.stats.bytes_sent += frame.len() as u64;

        let decision = pacer
            .on_frame_sent(frame.sample_frequency, Instant::now())
            .map_err(|_| CorruptInput::InvalidSamplingFrequency {
                offset: frame.offset,
                index: frame.header.sampling_frequency_index,
            })?;
        Ok(decision)
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adts::header::tests::{header_bytes, HeaderFields};
    use crate::error::Error;
    use bytes::Bytes;
    use std::time::Duration;

    /// Records messages and closes; fails sends after `fail_after` messages
    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<Bytes>,
        closes: usize,
        fail_after: Option<usize>,
    }

    impl MessageSink for &mut RecordingSink {
        async fn send(&mut self, message: Bytes) -> std::result::Result<(), TransportError> {
            if Some(self.sent.len()) == self.fail_after {
                return Err(TransportError::Send("injected".into()));
            }
            self.sent.push(message);
            Ok(())
        }

        async fn close(&mut self) -> std::result::Result<(), TransportError> {
            self.closes += 1;
            Ok(())
        }
    }

    fn frames(count: usize, sampling_frequency_index: u32) -> Vec<u8> {
        let mut data = Vec::new();
        for i in 0..count {
            data.extend(header_bytes(HeaderFields {
                sampling_frequency_index,
                frame_length: 7 + 4,
                ..Default::default()
            }));
            data.extend_from_slice(&[i as u8; 4]);
        }
        data
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_one_message_per_frame_in_real_time() {
        let input = frames(10, 3);
        let mut sink = RecordingSink::default();

        let start = Instant::now();
        let stats = AdtsSender::new(&mut sink, &AppConfig::default())
            .run(&input[..])
            .await
            .unwrap();

        assert_eq!(stats.frames_sent, 10);
        assert_eq!(stats.bytes_sent, input.len() as u64);
        assert_eq!(sink.sent.len(), 10);
        assert!(sink.sent.iter().all(|m| m.len() == 11));
        assert_eq!(sink.sent.concat(), input);
        assert_eq!(sink.closes, 1);

        // ten frames of 1024 samples at 48 kHz; the timer rounds each deadline
        // up to the next millisecond
        let expected = Duration::from_micros(10 * 1_000_000 * 1024 / 48000);
        let elapsed = start.elapsed();
        assert!(elapsed >= expected, "elapsed {:?}", elapsed);
        assert!(elapsed <= expected + Duration::from_millis(1), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttles_every_hundredth_frame() {
        let input = frames(250, 3);
        let mut sink = RecordingSink::default();

        let stats = AdtsSender::new(&mut sink, &AppConfig::default())
            .run(&input[..])
            .await
            .unwrap();

        assert_eq!(stats.frames_sent, 250);
        assert_eq!(stats.throttle_pauses, 2);
        assert_eq!(sink.closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_closes_once() {
        let input = frames(5, 3);
        let mut sink = RecordingSink {
            fail_after: Some(2),
            ..Default::default()
        };

        let result = AdtsSender::new(&mut sink, &AppConfig::default())
            .run(&input[..])
            .await;

        assert!(matches!(result, Err(Error::Transport(TransportError::Send(_)))));
        assert_eq!(sink.sent.len(), 2);
        assert_eq!(sink.closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reserved_frequency_index_is_corrupt() {
        let input = frames(3, 13);
        let mut sink = RecordingSink::default();

        let result = AdtsSender::new(&mut sink, &AppConfig::default())
            .run(&input[..])
            .await;

        assert!(matches!(
            result,
            Err(Error::CorruptInput(CorruptInput::InvalidSamplingFrequency {
                offset: 0,
                index: 13
            }))
        ));
        assert_eq!(sink.closes, 1);
    }

    #[tokio::test]
    async fn test_zero_throttle_interval_is_config_error() {
        let input = frames(3, 3);
        let mut sink = RecordingSink::default();
        let mut config = AppConfig::default();
        config.sender.throttle_interval = 0;

        let result = AdtsSender::new(&mut sink, &config).run(&input[..]).await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert!(sink.sent.is_empty());
        assert_eq!(sink.closes, 1);
    }

    #[tokio::test]
    async fn test_frame_larger_than_payload_size() {
        let input = frames(1, 3);
        let mut sink = RecordingSink::default();
        let mut config = AppConfig::default();
        config.transport.payload_size = 10;

        let result = AdtsSender::new(&mut sink, &config).run(&input[..]).await;

        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::MessageTooLarge { size: 11, limit: 10 }))
        ));
        assert!(sink.sent.is_empty());
        assert_eq!(sink.closes, 1);
    }
}
