use std::io::{self, Read, Seek, SeekFrom};

pub struct LittleEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Always returns an owned copy, so callers may checksum or mutate the
    /// result without touching the source buffer.
    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read `n` bytes as single-byte text. Each byte maps to the char with
    /// the same code point so that arbitrary bytes survive a write back.
    pub fn read_ascii_string(&mut self, n: usize) -> io::Result<String> {
        let bytes = self.read_bytes(n)?;
        Ok(bytes.into_iter().map(char::from).collect())
    }

    pub fn read_remaining(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn stream_len(&mut self) -> io::Result<u64> {
        let cur = self.position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(cur))?;
        Ok(end)
    }
}

/// Encode single-byte text written by [`LittleEndianReader::read_ascii_string`].
pub fn ascii_bytes(value: &str, field: &str) -> io::Result<Vec<u8>> {
    value
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{field} contains non single-byte character {c:?}"),
                )
            })
        })
        .collect()
}
