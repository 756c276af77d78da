use std::io::{self, Read, Seek};

use crate::reader::{LittleEndianReader, ascii_bytes};

use super::dvars::DvarMap;
use super::types::{DVAR_BLOCK_END, MAX_STRING_LEN, RESERVED_DVAR_PREFIX};

// --- Opaque blocks ---

/// Read `n` bytes, failing before allocating if the record is shorter.
pub fn read_block<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    n: usize,
    label: &str,
) -> io::Result<Vec<u8>> {
    let remaining = remaining(r)?;
    if n > remaining {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{label} needs {n} bytes, record has {remaining} left"),
        ));
    }
    r.read_bytes(n)
}

fn remaining<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<usize> {
    let pos = r.position()?;
    let len = r.stream_len()?;
    Ok(len.saturating_sub(pos) as usize)
}

// --- String tables ---

pub fn read_string_table<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    count: usize,
) -> io::Result<Vec<String>> {
    let mut strings = Vec::with_capacity(count);
    for _ in 0..count {
        let len = r.read_i16()?;
        if len > 0 && (len as usize) < MAX_STRING_LEN {
            strings.push(r.read_ascii_string(len as usize)?);
        } else {
            strings.push(String::new());
        }
    }
    Ok(strings)
}

pub fn write_string_table(out: &mut Vec<u8>, strings: &[String], label: &str) -> io::Result<()> {
    for (index, string) in strings.iter().enumerate() {
        let bytes = ascii_bytes(string, label)?;
        if bytes.len() >= MAX_STRING_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{label}[{index}] is {} bytes, entries must be shorter than {MAX_STRING_LEN}",
                    bytes.len()
                ),
            ));
        }
        out.extend_from_slice(&(bytes.len() as i16).to_le_bytes());
        out.extend_from_slice(&bytes);
    }
    Ok(())
}

// --- Dvar table ---

pub fn read_dvar_block<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<DvarMap> {
    let mut dvars = DvarMap::new();
    loop {
        let key_len = r.read_i32()?;
        if key_len == DVAR_BLOCK_END {
            break;
        }
        let key = read_sized_string(r, key_len, "dvar key")?;
        let value_len = r.read_i32()?;
        let value = read_sized_string(r, value_len, "dvar value")?;
        dvars.insert(key, value);
    }
    Ok(dvars)
}

fn read_sized_string<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    len: i32,
    label: &str,
) -> io::Result<String> {
    let len = usize::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{label} has negative length {len}"),
        )
    })?;
    let bytes = read_block(r, len, label)?;
    Ok(bytes.into_iter().map(char::from).collect())
}

pub fn write_dvar_block(out: &mut Vec<u8>, dvars: &DvarMap) -> io::Result<()> {
    for (key, value) in dvars.defined() {
        if key.starts_with(RESERVED_DVAR_PREFIX) {
            continue;
        }
        write_sized_string(out, key, "dvar key")?;
        write_sized_string(out, value, "dvar value")?;
    }
    out.extend_from_slice(&DVAR_BLOCK_END.to_le_bytes());
    Ok(())
}

fn write_sized_string(out: &mut Vec<u8>, value: &str, label: &str) -> io::Result<()> {
    let bytes = ascii_bytes(value, label)?;
    let len = i32::try_from(bytes.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{label} of {} bytes is too long", bytes.len()),
        )
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&bytes);
    Ok(())
}
