//! ADTS framing
//!
//! Header decoding and a resynchronising frame reader for AAC elementary
//! streams in Audio Data Transport Stream framing.

pub mod header;
pub mod reader;

pub use header::{sampling_frequency, AdtsHeader, AudioObjectType, MpegVersion};
pub use reader::{AdtsFrame, AdtsReader, ExtractorStats};
