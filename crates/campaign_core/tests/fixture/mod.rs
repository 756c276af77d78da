#![allow(dead_code)]

use campaign_core::campaign::{
    CHECKSUM_OFFSET, HEADER_LEN, PAYLOAD_LEN_OFFSET, SEGMENT_COUNT,
};
use campaign_core::checksum::payload_checksum;
use campaign_core::codec;
use campaign_core::segment2::StringTable;

pub const STORED_HEALTH: i32 = 100;

/// Raw (uncompressed) segment 2 record with the given dvars.
pub fn segment2_record(dvars: &[(&str, &str)], health: i32) -> Vec<u8> {
    let mut out: Vec<u8> = (0..0xD0).map(|i| (i * 3) as u8).collect();
    for table in StringTable::ALL {
        for i in 0..table.capacity() {
            let entry = if i % 5 == 0 {
                format!("{table}_{i}")
            } else {
                String::new()
            };
            out.extend_from_slice(&(entry.len() as i16).to_le_bytes());
            out.extend_from_slice(entry.as_bytes());
        }
    }
    for (key, value) in dvars {
        out.extend_from_slice(&(key.len() as i32).to_le_bytes());
        out.extend_from_slice(key.as_bytes());
        out.extend_from_slice(&(value.len() as i32).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out.extend_from_slice(&(-1i32).to_le_bytes());

    // Mostly zero, like the real block.
    let mut post = vec![0u8; 0xD000];
    for (i, b) in post.iter_mut().enumerate().step_by(97) {
        *b = (i % 251) as u8 | 1;
    }
    out.extend_from_slice(&post);

    out.extend_from_slice(&3i32.to_le_bytes());
    out.extend((0..24u8).map(|i| if i % 4 == 0 { i } else { 0 }));
    for v in [1i32, 0, -1, 0x7FFF_FFFF] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&health.to_le_bytes());
    out.extend_from_slice(&[0, 0, 0, 0, 0xAB, 0xCD, 0, 0, 0, 0, 0, 0, 0x11]);
    out
}

/// Complete save file whose segment 2 holds `record`.
pub fn save_file(record: &[u8]) -> Vec<u8> {
    let segments: Vec<Vec<u8>> = (0..SEGMENT_COUNT)
        .map(|index| {
            if index == 2 {
                codec::compress(record).expect("fixture record should compress")
            } else {
                let mut raw = vec![0u8; 40 + index * 11];
                for (i, b) in raw.iter_mut().enumerate() {
                    if (i + index) % 9 < 2 {
                        *b = (i + index) as u8 | 0x80;
                    }
                }
                codec::compress(&raw).expect("fixture segment should compress")
            }
        })
        .collect();

    let mut bytes: Vec<u8> = (0..HEADER_LEN).map(|i| (i % 13) as u8).collect();
    for segment in &segments {
        bytes.extend_from_slice(&((segment.len() + 4) as u32).to_le_bytes());
        bytes.extend_from_slice(segment);
    }
    let payload_len = (bytes.len() - HEADER_LEN) as u32;
    bytes[PAYLOAD_LEN_OFFSET..PAYLOAD_LEN_OFFSET + 4].copy_from_slice(&payload_len.to_le_bytes());
    let checksum = payload_checksum(&bytes[HEADER_LEN..]);
    bytes[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
    bytes
}

pub fn default_save() -> Vec<u8> {
    save_file(&segment2_record(
        &[
            ("0x1A2B3C4D", "1"),
            ("0x00C0FFEE", "0.75"),
            ("0x7E57AB1E", "hello world"),
        ],
        STORED_HEALTH,
    ))
}

pub fn stored_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(
        bytes[offset..offset + 4]
            .try_into()
            .expect("slice should be four bytes"),
    )
}
