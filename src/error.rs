//! Error types for the ADTS streamer

use std::net::SocketAddr;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Corrupt input: {0}")]
    CorruptInput(#[from] CorruptInput),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input that cannot be framed or paced.
///
/// Distinct from end of stream, which is never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorruptInput {
    #[error("frame too large at offset {offset}: {frame_size} bytes, capacity {capacity}")]
    FrameTooLarge {
        offset: u64,
        frame_size: usize,
        capacity: usize,
    },

    #[error("frame too short at offset {offset}: aac_frame_length {frame_length}")]
    FrameTooShort { offset: u64, frame_length: u16 },

    #[error("invalid sampling frequency index {index} at offset {offset}")]
    InvalidSamplingFrequency { offset: u64, index: u8 },

    #[error("sample frequency is zero")]
    ZeroSampleFrequency,
}

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection to {addr} failed: {reason}")]
    Connect { addr: SocketAddr, reason: String },

    #[error("Listen on {addr} failed: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Close failed: {0}")]
    Close(String),

    #[error("Message too large: {size} bytes, limit {limit}")]
    MessageTooLarge { size: usize, limit: usize },
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
