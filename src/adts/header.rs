//! ADTS fixed and variable header decoding
//!
//! The 7 header bytes are viewed as one 56-bit big-endian integer and every
//! field is pulled out with a shift and a mask. Positions are counted from the
//! least significant bit of that integer.

use crate::constants::{ADTS_CRC_SIZE, ADTS_HEADER_SIZE, ADTS_SYNC_WORD};

/// Bit position and width of one header field
#[derive(Debug, Clone, Copy)]
struct Field {
    shift: u32,
    width: u32,
}

impl Field {
    const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    #[inline]
    fn extract(self, bits: u64) -> u64 {
        (bits >> self.shift) & ((1 << self.width) - 1)
    }
}

const ID: Field = Field::new(43, 1);
const LAYER: Field = Field::new(41, 2);
const PROTECTION_ABSENT: Field = Field::new(40, 1);
const PROFILE: Field = Field::new(38, 2);
const SAMPLING_FREQUENCY_INDEX: Field = Field::new(34, 4);
const PRIVATE_BIT: Field = Field::new(33, 1);
const CHANNEL_CONFIGURATION: Field = Field::new(30, 3);
const ORIGINAL_OR_COPY: Field = Field::new(29, 1);
const HOME: Field = Field::new(28, 1);
const COPYRIGHT_IDENTIFICATION_BIT: Field = Field::new(27, 1);
const COPYRIGHT_IDENTIFICATION_START: Field = Field::new(26, 1);
const AAC_FRAME_LENGTH: Field = Field::new(13, 13);
const ADTS_BUFFER_FULLNESS: Field = Field::new(2, 11);
const NO_RAW_DATA_BLOCKS_IN_FRAME: Field = Field::new(0, 2);

/// Standard AAC sampling rates, indexed by `sampling_frequency_index`
pub const SAMPLING_FREQUENCY_TABLE: [u32; 12] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000,
];

/// Look up a sampling frequency index; reserved indices yield 0.
pub fn sampling_frequency(index: u8) -> u32 {
    SAMPLING_FREQUENCY_TABLE
        .get(usize::from(index))
        .copied()
        .unwrap_or(0)
}

/// Extract the 12-bit sync word from the first two bytes of a window
#[inline]
pub fn sync_word(window: [u8; 2]) -> u16 {
    u16::from(window[0]) << 4 | u16::from(window[1] >> 4)
}

/// Returns true if the window starts an ADTS frame
#[inline]
pub fn is_sync(window: [u8; 2]) -> bool {
    sync_word(window) == ADTS_SYNC_WORD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg4,
    Mpeg2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioObjectType {
    AacMain,
    AacLC,
    AacSSR,
    AacLTP,
}

/// Decoded ADTS header.
///
/// Parsed once per frame and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    pub id: u8,
    pub layer: u8,
    pub protection_absent: bool,
    pub profile: u8,
    pub sampling_frequency_index: u8,
    pub private_bit: u8,
    pub channel_configuration: u8,
    pub original_or_copy: u8,
    pub home: u8,
    pub copyright_identification_bit: u8,
    pub copyright_identification_start: u8,
    /// Total frame length including the 7 header bytes
    pub aac_frame_length: u16,
    pub adts_buffer_fullness: u16,
    pub no_raw_data_blocks_in_frame: u8,
}

impl AdtsHeader {
    /// Decode all header fields.
    ///
    /// The caller is expected to have checked the sync word already; it is not
    /// part of the decoded record.
    pub fn parse(bytes: &[u8; ADTS_HEADER_SIZE]) -> Self {
        let mut wide = [0u8; 8];
        wide[1..].copy_from_slice(bytes);
        let bits = u64::from_be_bytes(wide);

        // Every field is at most 13 bits wide, so the narrowing casts are exact.
        Self {
            id: ID.extract(bits) as u8,
            layer: LAYER.extract(bits) as u8,
            protection_absent: PROTECTION_ABSENT.extract(bits) == 1,
            profile: PROFILE.extract(bits) as u8,
            sampling_frequency_index: SAMPLING_FREQUENCY_INDEX.extract(bits) as u8,
            private_bit: PRIVATE_BIT.extract(bits) as u8,
            channel_configuration: CHANNEL_CONFIGURATION.extract(bits) as u8,
            original_or_copy: ORIGINAL_OR_COPY.extract(bits) as u8,
            home: HOME.extract(bits) as u8,
            copyright_identification_bit: COPYRIGHT_IDENTIFICATION_BIT.extract(bits) as u8,
            copyright_identification_start: COPYRIGHT_IDENTIFICATION_START.extract(bits) as u8,
            aac_frame_length: AAC_FRAME_LENGTH.extract(bits) as u16,
            adts_buffer_fullness: ADTS_BUFFER_FULLNESS.extract(bits) as u16,
            no_raw_data_blocks_in_frame: NO_RAW_DATA_BLOCKS_IN_FRAME.extract(bits) as u8,
        }
    }

    /// Sampling rate in Hz, or 0 for a reserved index
    pub fn sampling_frequency(&self) -> u32 {
        sampling_frequency(self.sampling_frequency_index)
    }

    pub fn crc_present(&self) -> bool {
        !self.protection_absent
    }

    /// Bytes following the 7 header bytes, including the CRC when present.
    ///
    /// Returns `None` when `aac_frame_length` cannot even cover the header.
    pub fn payload_len(&self) -> Option<usize> {
        let len = usize::from(self.aac_frame_length).checked_sub(ADTS_HEADER_SIZE)?;
        Some(if self.crc_present() { len + ADTS_CRC_SIZE } else { len })
    }

    pub fn mpeg_version(&self) -> MpegVersion {
        if self.id == 1 {
            MpegVersion::Mpeg2
        } else {
            MpegVersion::Mpeg4
        }
    }

    pub fn audio_object_type(&self) -> AudioObjectType {
        match self.profile {
            0 => AudioObjectType::AacMain,
            1 => AudioObjectType::AacLC,
            2 => AudioObjectType::AacSSR,
            _ => AudioObjectType::AacLTP,
        }
    }

    /// Output channel count; 0 means the count lives in the raw data blocks
    pub fn channel_count(&self) -> u8 {
        match self.channel_configuration {
            7 => 8,
            n => n,
        }
    }

    /// Number of raw data blocks, between 1 and 4
    pub fn raw_data_blocks(&self) -> u8 {
        self.no_raw_data_blocks_in_frame + 1
    }
}
