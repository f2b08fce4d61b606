//! Shared ADTS test data

#![allow(dead_code)]

use bitstream_io::{BigEndian, BitWrite, BitWriter};

/// Build one frame without CRC: header followed by `payload`
pub fn adts_frame(sampling_frequency_index: u32, payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let mut w = BitWriter::endian(&mut data, BigEndian);
        let mut put = |bits: u32, value: u32| w.write_var(bits, value).unwrap();
        put(12, 0xfff); // sync_word
        put(1, 0); // id
        put(2, 0); // layer
        put(1, 1); // protection_absent
        put(2, 1); // profile: AAC LC
        put(4, sampling_frequency_index);
        put(1, 0); // private_bit
        put(3, 2); // channel_configuration
        put(4, 0); // original_or_copy, home, copyright bits
        put(13, 7 + payload.len() as u32);
        put(11, 0x7ff); // adts_buffer_fullness
        put(2, 0); // no_raw_data_blocks_in_frame
    }
    data.extend_from_slice(payload);
    data
}

/// `count` 48 kHz frames with payload sizes cycling through 1..=200
pub fn adts_stream(count: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..count {
        let len = i % 200 + 1;
        let payload: Vec<u8> = (0..len).map(|b| (b * 7 + i) as u8).collect();
        data.extend(adts_frame(3, &payload));
    }
    data
}
