//! Application configuration
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::error::{Error, Result};

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub sender: SenderConfig,
    pub receiver: ReceiverConfig,
}

/// SRT connection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Latency requested by the sender; 0 asks for the minimum. The listener
    /// keeps the transport default and the larger value wins.
    pub latency_ms: u64,
    /// Fixed application payload size per message
    pub payload_size: usize,
    pub connect_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl TransportConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Frame extraction and pacing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Frame payloads must be strictly smaller than this
    pub max_frame_payload: usize,
    /// A fixed pause is taken after every this many frames
    pub throttle_interval: u64,
    pub throttle_pause_ms: u64,
    pub samples_per_frame: u32,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            max_frame_payload: DEFAULT_MAX_FRAME_PAYLOAD,
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            throttle_pause_ms: DEFAULT_THROTTLE_PAUSE_MS,
            samples_per_frame: AAC_SAMPLES_PER_FRAME,
        }
    }
}

impl SenderConfig {
    pub fn throttle_pause(&self) -> Duration {
        Duration::from_millis(self.throttle_pause_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Largest message accepted from the transport
    pub recv_buffer: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the platform
    /// config directory is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    tracing::debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::info!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// `<config dir>/adts-srt-streamer/config.toml` for this platform
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "adts-srt-streamer")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.transport;
        if t.payload_size == 0 || t.payload_size > DEFAULT_PAYLOAD_SIZE {
            return Err(Error::Config(format!(
                "transport.payload_size must be between 1 and {}",
                DEFAULT_PAYLOAD_SIZE
            )));
        }

        let s = &self.sender;
        if s.max_frame_payload == 0 || s.max_frame_payload + ADTS_HEADER_SIZE > t.payload_size {
            return Err(Error::Config(format!(
                "sender.max_frame_payload must be between 1 and {} for payload_size {}",
                t.payload_size.saturating_sub(ADTS_HEADER_SIZE),
                t.payload_size
            )));
        }
        if s.throttle_interval == 0 {
            return Err(Error::Config("sender.throttle_interval must be at least 1".into()));
        }
        if s.samples_per_frame == 0 {
            return Err(Error::Config("sender.samples_per_frame must be at least 1".into()));
        }

        if self.receiver.recv_buffer < t.payload_size {
            return Err(Error::Config(format!(
                "receiver.recv_buffer must be at least payload_size ({})",
                t.payload_size
            )));
        }
        Ok(())
    }
}
