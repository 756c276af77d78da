//! Zero-run-length codec used for save segments.
//!
//! A compressed segment is one version byte followed by runs. Each run starts
//! with a control byte: the top two bits hold a trailing literal count `T`,
//! the low six bits a length `L`.
//!
//! * `T == 0`: copy `L + 1` literal bytes.
//! * `T != 0`: copy `T` literal bytes, then emit `L + 1` zero bytes.
//!
//! There is no end marker; the stream ends with its input.

use std::io;

use thiserror::Error;

pub const FORMAT_VERSION: u8 = 1;
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 0x1C_0000;

const RUN_LEN_MASK: u8 = 0x3F;
const KIND_SHIFT: u8 = 6;
const MAX_RUN_LEN: usize = 64;
const MAX_TRAILING_LITERALS: usize = 3;
const MIN_ZERO_RUN: usize = 3;
const DECODE_RESERVE: usize = 0x1_0000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error(
        "compressed output would exceed {limit} bytes: cursor {cursor}, next run {run} bytes"
    )]
    OutputLimitExceeded {
        limit: usize,
        cursor: usize,
        run: usize,
    },
    #[error("encoder cursor mismatch: tracked {tracked} bytes, wrote {written}")]
    CursorMismatch { tracked: usize, written: usize },
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Upper bound on the compressed size, version byte included.
    pub max_output_len: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }
}

pub fn decompress(data: &[u8]) -> Vec<u8> {
    let Some((&version, stream)) = data.split_first() else {
        return Vec::new();
    };
    if version != FORMAT_VERSION {
        log::warn!("segment codec version {version}, expected {FORMAT_VERSION}; decoding anyway");
    }

    let mut out = Vec::with_capacity(DECODE_RESERVE);
    let mut pos = 0usize;
    let mut literals = 0usize;
    let mut zeros = 0usize;

    loop {
        if literals > 0 {
            let available = stream.len() - pos;
            if literals > available {
                log::debug!(
                    "compressed segment truncated: run wants {literals} literal bytes, {available} left"
                );
                out.extend_from_slice(&stream[pos..]);
                break;
            }
            out.extend_from_slice(&stream[pos..pos + literals]);
            pos += literals;
        }
        out.resize(out.len() + zeros, 0);

        let Some(&control) = stream.get(pos) else {
            break;
        };
        pos += 1;
        (literals, zeros) = split_control(control);
    }

    out
}

/// Returns `(literal_count, zero_count)` for one control byte.
fn split_control(control: u8) -> (usize, usize) {
    let kind = usize::from(control >> KIND_SHIFT);
    let len = usize::from(control & RUN_LEN_MASK) + 1;
    if kind == 0 { (len, 0) } else { (kind, len) }
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    compress_with(data, &EncoderConfig::default())
}

pub fn compress_with(data: &[u8], config: &EncoderConfig) -> Result<Vec<u8>, CodecError> {
    let mut w = RunWriter::new(config.max_output_len, data.len())?;

    // Bytes in data[lit_start..pos] are literals not yet written.
    let mut lit_start = 0usize;
    let mut pos = 0usize;

    while pos < data.len() {
        let zeros = leading_zeros(&data[pos..]);
        let pending = pos - lit_start;

        if zeros >= MIN_ZERO_RUN && pending > 0 {
            let trailing = pending.min(MAX_TRAILING_LITERALS);
            w.literal_runs(&data[lit_start..pos - trailing])?;
            let run = zeros.min(MAX_RUN_LEN);
            w.zero_run(&data[pos - trailing..pos], run)?;
            pos += run;
            lit_start = pos;
        } else if zeros > 0 && zeros < MIN_ZERO_RUN {
            pos += zeros;
        } else {
            // Non-zero byte, or a zero run with no literal to lead it.
            pos += 1;
        }
    }
    w.literal_runs(&data[lit_start..])?;

    w.finish()
}

/// Zeros at the start of `data`, counted up to one run's worth.
fn leading_zeros(data: &[u8]) -> usize {
    data.iter()
        .take(MAX_RUN_LEN)
        .take_while(|&&b| b == 0)
        .count()
}

struct RunWriter {
    out: Vec<u8>,
    cursor: usize,
    limit: usize,
}

impl RunWriter {
    fn new(limit: usize, input_len: usize) -> Result<Self, CodecError> {
        let mut w = Self {
            out: Vec::with_capacity((input_len + input_len / MAX_RUN_LEN + 2).min(limit)),
            cursor: 0,
            limit,
        };
        w.reserve(1)?;
        w.out.push(FORMAT_VERSION);
        Ok(w)
    }

    fn reserve(&mut self, run: usize) -> Result<(), CodecError> {
        if self.cursor + run > self.limit {
            return Err(CodecError::OutputLimitExceeded {
                limit: self.limit,
                cursor: self.cursor,
                run,
            });
        }
        self.cursor += run;
        Ok(())
    }

    fn literal_runs(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        for chunk in bytes.chunks(MAX_RUN_LEN) {
            self.reserve(1 + chunk.len())?;
            self.out.push((chunk.len() - 1) as u8);
            self.out.extend_from_slice(chunk);
        }
        Ok(())
    }

    fn zero_run(&mut self, trailing: &[u8], zeros: usize) -> Result<(), CodecError> {
        debug_assert!((1..=MAX_TRAILING_LITERALS).contains(&trailing.len()));
        debug_assert!((1..=MAX_RUN_LEN).contains(&zeros));
        self.reserve(1 + trailing.len())?;
        self.out
            .push(((trailing.len() as u8) << KIND_SHIFT) | (zeros - 1) as u8);
        self.out.extend_from_slice(trailing);
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, CodecError> {
        if self.out.len() != self.cursor {
            return Err(CodecError::CursorMismatch {
                tracked: self.cursor,
                written: self.out.len(),
            });
        }
        Ok(self.out)
    }
}
