//! Resynchronising ADTS frame reader
//!
//! Scans an async byte stream for sync words one byte at a time and yields
//! complete frames (header plus payload) in stream order. End of stream is a
//! short read anywhere in a frame and is reported as `Ok(None)`.

use bytes::{Bytes, BytesMut};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::adts::header::{is_sync, AdtsHeader};
use crate::constants::{ADTS_HEADER_SIZE, ADTS_SYNC_SIZE, DEFAULT_MAX_FRAME_PAYLOAD};
use crate::error::{CorruptInput, Result};

/// One complete ADTS frame
#[derive(Debug, Clone)]
pub struct AdtsFrame {
    pub header: AdtsHeader,
    /// Sampling rate in Hz, 0 for a reserved index
    pub sample_frequency: u32,
    /// Header bytes followed by the payload (and CRC, when present)
    pub data: Bytes,
    /// Byte offset of the sync word in the input stream
    pub offset: u64,
    /// Bytes after the 7 header bytes
    pub payload_len: usize,
}

impl AdtsFrame {
    /// Total frame length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Extractor statistics
#[derive(Debug, Clone, Default)]
pub struct ExtractorStats {
    pub frames: u64,
    pub bytes: u64,
    /// Failed sync attempts, one per skipped byte
    pub sync_misses: u64,
}

/// ADTS frame reader over any async byte stream
pub struct AdtsReader<R> {
    inner: R,
    /// Bytes consumed from `inner` so far
    position: u64,
    /// Payload capacity; frames must stay strictly below it
    max_payload: usize,
    stats: ExtractorStats,
}

impl<R: AsyncRead + Unpin> AdtsReader<R> {
    /// Create a reader with the default 512 byte payload capacity
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_MAX_FRAME_PAYLOAD)
    }

    pub fn with_capacity(inner: R, max_payload: usize) -> Self {
        Self {
            inner,
            position: 0,
            max_payload,
            stats: ExtractorStats::default(),
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` at end of stream, `Err(Error::CorruptInput)` when a
    /// header claims a frame that cannot fit the payload capacity.
    pub async fn next_frame(&mut self) -> Result<Option<AdtsFrame>> {
        let mut header_bytes = [0u8; ADTS_HEADER_SIZE];

        if !self.fill(&mut header_bytes[..ADTS_SYNC_SIZE]).await? {
            return Ok(None);
        }

        let mut skipped = 0u64;
        while !is_sync([header_bytes[0], header_bytes[1]]) {
            tracing::trace!(position = self.position, "sync not found");
            skipped += 1;
            self.stats.sync_misses += 1;

            header_bytes[0] = header_bytes[1];
            if !self.fill(&mut header_bytes[1..ADTS_SYNC_SIZE]).await? {
                tracing::debug!(skipped, "end of stream while searching for sync");
                return Ok(None);
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, position = self.position, "resynchronised");
        }

        let offset = self.position - ADTS_SYNC_SIZE as u64;

        if !self.fill(&mut header_bytes[ADTS_SYNC_SIZE..]).await? {
            return Ok(None);
        }

        let header = AdtsHeader::parse(&header_bytes);
        let payload_len = header
            .payload_len()
            .ok_or(CorruptInput::FrameTooShort {
                offset,
                frame_length: header.aac_frame_length,
            })?;

        if payload_len >= self.max_payload {
            return Err(CorruptInput::FrameTooLarge {
                offset,
                frame_size: payload_len,
                capacity: self.max_payload,
            }
            .into());
        }

        let mut frame = BytesMut::with_capacity(ADTS_HEADER_SIZE + payload_len);
        frame.extend_from_slice(&header_bytes);
        frame.resize(ADTS_HEADER_SIZE + payload_len, 0);
        if !self.fill(&mut frame[ADTS_HEADER_SIZE..]).await? {
            return Ok(None);
        }

        self.stats.frames += 1;
        self.stats.bytes += frame.len() as u64;

        Ok(Some(AdtsFrame {
            sample_frequency: header.sampling_frequency(),
            header,
            data: frame.freeze(),
            offset,
            payload_len,
        }))
    }

    /// Fill `buf` completely; `false` means the stream ended first.
    async fn fill(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.inner.read_exact(buf).await {
            Ok(n) => {
                self.position += n as u64;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Bytes consumed from the underlying stream
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn stats(&self) -> &ExtractorStats {
        &self.stats
    }
}
