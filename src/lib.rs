//! # ADTS SRT Streamer
//!
//! Streams an AAC elementary stream in ADTS framing over SRT, paced to the
//! audio's real-time playback rate.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────── adts-send ────────────────────────────┐
//! │  ┌────────────┐   ┌──────────────────┐   ┌─────────────────────┐  │
//! │  │ input.aac  │──▶│ AdtsReader       │──▶│ AdtsSender + Pacer  │  │
//! │  └────────────┘   │ (adts::reader)   │   │ (sender, pacing)    │  │
//! │                   │ sync / header /  │   │ one frame = one     │  │
//! │                   │ payload          │   │ message, sleep to   │  │
//! │                   └──────────────────┘   │ wall-clock deadline │  │
//! │                                          └──────────┬──────────┘  │
//! └─────────────────────────────────────────────────────┼─────────────┘
//!                                                       │ SRT (transport::srt)
//!                                                       ▼
//! ┌──────────────────────────── adts-recv ────────────────────────────┐
//! │  ┌─────────────────────┐   ┌──────────────────────────────────┐   │
//! │  │ SrtReceiver         │──▶│ StreamReceiver (receiver)        │   │
//! │  │ accept one peer     │   │ append each message to output    │   │
//! │  └─────────────────────┘   └──────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

pub mod adts;
pub mod config;
pub mod error;
pub mod pacing;
#[cfg(feature = "receiver")]
pub mod receiver;
#[cfg(feature = "sender")]
pub mod sender;
pub mod transport;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// ADTS header size without CRC
    pub const ADTS_HEADER_SIZE: usize = 7;

    /// Bytes read to test for a sync word
    pub const ADTS_SYNC_SIZE: usize = 2;

    /// Trailing CRC size when protection_absent is 0
    pub const ADTS_CRC_SIZE: usize = 2;

    /// 12-bit ADTS sync word
    pub const ADTS_SYNC_WORD: u16 = 0xfff;

    /// Default extractor payload capacity in bytes
    pub const DEFAULT_MAX_FRAME_PAYLOAD: usize = 512;

    /// AAC samples per channel in one ADTS frame
    pub const AAC_SAMPLES_PER_FRAME: u32 = 1024;

    /// SRT payload size: one MTU minus IP/UDP/SRT headers
    pub const DEFAULT_PAYLOAD_SIZE: usize = 1456;

    /// Receive buffer; must cover the largest SRT message
    pub const DEFAULT_RECV_BUFFER: usize = 2048;

    /// Frames between forced pauses
    pub const DEFAULT_THROTTLE_INTERVAL: u64 = 100;

    /// Length of the forced pause in milliseconds
    pub const DEFAULT_THROTTLE_PAUSE_MS: u64 = 100;

    /// Default SRT connect timeout in milliseconds
    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;
}
