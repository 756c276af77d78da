use std::io::{self, Cursor, Read};

use serde::{Deserialize, Serialize};

use crate::checksum::payload_checksum;
use crate::codec::{self, EncoderConfig};
use crate::layout::{ByteRange, FileLayout, SectionId, SectionLayout};
use crate::reader::LittleEndianReader;

pub const CHECKSUM_OFFSET: usize = 0x08;
pub const PAYLOAD_LEN_OFFSET: usize = 0x4CC;
pub const PAYLOAD_OFFSET: usize = 0x500;
pub const HEADER_LEN: usize = PAYLOAD_OFFSET;
pub const SEGMENT_COUNT: usize = 38;
pub const DVAR_SEGMENT_INDEX: usize = 2;
// Each segment length counts its own prefix.
const SEGMENT_PREFIX_LEN: usize = 4;
const U32_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChecksumStatus {
    Valid { checksum: u32 },
    /// The save was edited outside the game. Loading still succeeds.
    Mismatch { stored: u32, computed: u32 },
}

impl ChecksumStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Top-level save file: an opaque header followed by 38 compressed segments.
#[derive(Debug, Clone)]
pub struct CampaignSave {
    header: Vec<u8>,
    segments: Vec<Vec<u8>>,
    checksum_status: ChecksumStatus,
    trailing_len: usize,
    encoder: EncoderConfig,
}

impl CampaignSave {
    pub fn parse<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "file too short for save header: {} bytes, need {HEADER_LEN}",
                    bytes.len()
                ),
            ));
        }

        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        let header = r.read_bytes(HEADER_LEN)?;

        r.seek_to(PAYLOAD_LEN_OFFSET as u64)?;
        let payload_len = r.read_u32()? as usize;
        let available = bytes.len() - PAYLOAD_OFFSET;
        if payload_len > available {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("payload truncated: header declares {payload_len} bytes, file has {available}"),
            ));
        }

        r.seek_to(PAYLOAD_OFFSET as u64)?;
        let payload = r.read_bytes(payload_len)?;

        r.seek_to(CHECKSUM_OFFSET as u64)?;
        let stored = r.read_u32()?;
        let computed = payload_checksum(&payload);
        let checksum_status = if stored == computed {
            ChecksumStatus::Valid { checksum: stored }
        } else {
            log::warn!(
                "save checksum mismatch (stored {stored:#010x}, computed {computed:#010x}); data may have been tampered with"
            );
            ChecksumStatus::Mismatch { stored, computed }
        };

        let segments = split_segments(&payload)?;

        let trailing_len = available - payload_len;
        if trailing_len > 0 {
            log::debug!("ignoring {trailing_len} bytes past the declared payload");
        }

        Ok(Self {
            header,
            segments,
            checksum_status,
            trailing_len,
            encoder: EncoderConfig::default(),
        })
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn checksum_status(&self) -> ChecksumStatus {
        self.checksum_status
    }

    /// Bytes found after the declared payload on load; they are not written back.
    pub fn trailing_len(&self) -> usize {
        self.trailing_len
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn payload_len(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| segment.len() + SEGMENT_PREFIX_LEN)
            .sum()
    }

    pub fn set_encoder_config(&mut self, config: EncoderConfig) {
        self.encoder = config;
    }

    /// Compressed bytes of segment `index`, exactly as stored.
    pub fn raw_segment(&self, index: usize) -> io::Result<&[u8]> {
        self.segments
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| segment_out_of_range(index))
    }

    pub fn segment(&self, index: usize) -> io::Result<Vec<u8>> {
        self.raw_segment(index).map(codec::decompress)
    }

    pub fn set_segment(&mut self, index: usize, data: &[u8]) -> io::Result<&mut Self> {
        if index >= self.segments.len() {
            return Err(segment_out_of_range(index));
        }
        let packed = codec::compress_with(data, &self.encoder)?;
        log::debug!(
            "segment {index}: {} bytes decoded, {} bytes stored",
            data.len(),
            packed.len()
        );
        self.segments[index] = packed;
        Ok(self)
    }

    /// Where each part lands in the output of [`CampaignSave::to_bytes`].
    pub fn layout(&self) -> FileLayout {
        let mut sections = Vec::with_capacity(self.segments.len() + 1);
        sections.push(SectionLayout {
            id: SectionId::Header,
            range: ByteRange {
                start: 0,
                end: HEADER_LEN,
            },
        });

        let mut start = HEADER_LEN;
        for (index, segment) in self.segments.iter().enumerate() {
            let end = start + SEGMENT_PREFIX_LEN + segment.len();
            sections.push(SectionLayout {
                id: SectionId::Segment(index),
                range: ByteRange { start, end },
            });
            start = end;
        }

        FileLayout {
            file_len: start,
            sections,
        }
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let payload_len = self.payload_len();
        let mut out = Vec::with_capacity(HEADER_LEN + payload_len);
        out.extend_from_slice(&self.header);
        patch_u32(&mut out, PAYLOAD_LEN_OFFSET, to_u32(payload_len, "payload length")?)?;

        for (index, segment) in self.segments.iter().enumerate() {
            let framed = to_u32(
                segment.len() + SEGMENT_PREFIX_LEN,
                &format!("segment {index} length"),
            )?;
            out.extend_from_slice(&framed.to_le_bytes());
            out.extend_from_slice(segment);
        }

        let checksum = payload_checksum(&out[PAYLOAD_OFFSET..]);
        patch_u32(&mut out, CHECKSUM_OFFSET, checksum)?;
        Ok(out)
    }
}

fn split_segments(payload: &[u8]) -> io::Result<Vec<Vec<u8>>> {
    let mut r = LittleEndianReader::new(Cursor::new(payload));
    let mut segments = Vec::with_capacity(SEGMENT_COUNT);

    for index in 0..SEGMENT_COUNT {
        let framed_len = r.read_u32().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("segment {index} length prefix missing: {e}"),
            )
        })? as usize;
        let data_len = framed_len.checked_sub(SEGMENT_PREFIX_LEN).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("segment {index} length {framed_len} is shorter than its prefix"),
            )
        })?;

        let remaining = payload.len() - r.position()? as usize;
        if data_len > remaining {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("segment {index} declares {data_len} bytes, payload has {remaining} left"),
            ));
        }
        segments.push(r.read_bytes(data_len)?);
    }

    let consumed = r.position()? as usize;
    if consumed != payload.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "payload length mismatch: {SEGMENT_COUNT} segments span {consumed} bytes, header declares {}",
                payload.len()
            ),
        ));
    }

    Ok(segments)
}

fn segment_out_of_range(index: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid segment index {index}, expected 0..{}", SEGMENT_COUNT - 1),
    )
}

fn to_u32(value: usize, field: &str) -> io::Result<u32> {
    u32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{field} {value} does not fit in 32 bits"),
        )
    })
}

fn patch_u32(buf: &mut [u8], offset: usize, value: u32) -> io::Result<()> {
    if buf.len() < offset + U32_WIDTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "buffer too short for patch at {offset:#x}: len={}, need at least {}",
                buf.len(),
                offset + U32_WIDTH
            ),
        ));
    }
    buf[offset..offset + U32_WIDTH].copy_from_slice(&value.to_le_bytes());
    Ok(())
}
