//! Real-time pacing for frame transmission
//!
//! Each frame carries `samples_per_frame` samples at the frame's sampling
//! rate, so frame `n` is due `n * samples_per_frame / rate` seconds after the
//! stream started. The pacer compares that deadline with the wall clock after
//! each send and tells the caller how long to sleep.

use std::time::Duration;
use tokio::time::Instant;

use crate::config::SenderConfig;
use crate::error::{CorruptInput, Error};

const MICROS_PER_SEC: u64 = 1_000_000;

/// What to do after a frame has been sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingDecision {
    /// Periodic fixed pause, taken regardless of schedule
    Throttle(Duration),
    /// Ahead of schedule: sleep until the frame's deadline
    Sleep(Duration),
    /// On or behind schedule: send the next frame now
    Immediate,
}

impl PacingDecision {
    pub fn delay(&self) -> Option<Duration> {
        match *self {
            PacingDecision::Throttle(d) | PacingDecision::Sleep(d) => Some(d),
            PacingDecision::Immediate => None,
        }
    }
}

/// Pacing state for one stream
#[derive(Debug, Clone)]
pub struct Pacer {
    start: Instant,
    frames: u64,
    samples_per_frame: u64,
    throttle_interval: u64,
    throttle_pause: Duration,
}

impl Pacer {
    /// Start pacing now
    pub fn new(config: &SenderConfig) -> Result<Self, Error> {
        Self::starting_at(Instant::now(), config)
    }

    /// Fails when `throttle_interval` is 0.
    pub fn starting_at(start: Instant, config: &SenderConfig) -> Result<Self, Error> {
        if config.throttle_interval == 0 {
            return Err(Error::Config("sender.throttle_interval must be at least 1".into()));
        }
        Ok(Self {
            start,
            frames: 0,
            samples_per_frame: u64::from(config.samples_per_frame),
            throttle_interval: config.throttle_interval,
            throttle_pause: config.throttle_pause(),
        })
    }

    /// Time from stream start at which frame `n` (1-based) is due.
    pub fn expected_elapsed(&self, n: u64, sample_frequency: u32) -> Result<Duration, CorruptInput> {
        if sample_frequency == 0 {
            return Err(CorruptInput::ZeroSampleFrequency);
        }
        let micros = n
            .saturating_mul(MICROS_PER_SEC)
            .saturating_mul(self.samples_per_frame)
            / u64::from(sample_frequency);
        Ok(Duration::from_micros(micros))
    }

    /// Account for one sent frame and decide how long to wait before the next.
    ///
    /// `now` is the time the send completed; blocking time inside the send is
    /// absorbed here and shortens the sleep.
    pub fn on_frame_sent(
        &mut self,
        sample_frequency: u32,
        now: Instant,
    ) -> Result<PacingDecision, CorruptInput> {
        self.frames += 1;
        let expected = self.expected_elapsed(self.frames, sample_frequency)?;
        let actual = now.saturating_duration_since(self.start);

        let decision = if self.frames % self.throttle_interval == 0 {
            PacingDecision::Throttle(self.throttle_pause)
        } else if expected > actual {
            PacingDecision::Sleep(expected - actual)
        } else {
            PacingDecision::Immediate
        };
        Ok(decision)
    }

    /// Frames accounted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

}
