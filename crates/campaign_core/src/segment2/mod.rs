pub mod dvars;
pub mod sections;
pub mod types;

use std::io::{self, Cursor};

use crate::hash::hash_dvar;
use crate::reader::LittleEndianReader;
pub use dvars::DvarMap;
use sections::{
    read_block, read_dvar_block, read_string_table, write_dvar_block, write_string_table,
};
pub use types::StringTable;
use types::{EXTRA_ENTRY_LEN, EXTRA_FIELD_COUNT, HEADER_LEN, HEALTH_DVAR, POST_DVAR_LEN};

/// Decoded segment 2: string tables, the dvar table, and the blocks around
/// them that are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment2 {
    pub dvars: DvarMap,
    header: Vec<u8>,
    tables: Vec<Vec<String>>,
    post_dvars: Vec<u8>,
    extra_count: i32,
    extra_entries: Vec<u8>,
    extra_fields: [i32; EXTRA_FIELD_COUNT],
    health: i32,
    footer: Vec<u8>,
}

impl Segment2 {
    pub fn parse(bytes: &[u8]) -> io::Result<Self> {
        let mut r = LittleEndianReader::new(Cursor::new(bytes));

        let header = read_block(&mut r, HEADER_LEN, "segment 2 header")?;

        let mut tables = Vec::with_capacity(StringTable::ALL.len());
        for table in StringTable::ALL {
            tables.push(read_string_table(&mut r, table.capacity()).map_err(|e| {
                io::Error::new(e.kind(), format!("string table {table}: {e}"))
            })?);
        }

        let dvars = read_dvar_block(&mut r)?;
        let post_dvars = read_block(&mut r, POST_DVAR_LEN, "post-dvar block")?;

        let extra_count = r.read_i32()?;
        let extra_len = usize::try_from(extra_count)
            .ok()
            .and_then(|count| count.checked_mul(EXTRA_ENTRY_LEN))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid extra entry count {extra_count}"),
                )
            })?;
        let extra_entries = read_block(&mut r, extra_len, "extra entries")?;

        let mut extra_fields = [0i32; EXTRA_FIELD_COUNT];
        for field in &mut extra_fields {
            *field = r.read_i32()?;
        }
        let health = r.read_i32()?;
        let footer = r.read_remaining()?;

        Ok(Self {
            dvars,
            header,
            tables,
            post_dvars,
            extra_count,
            extra_entries,
            extra_fields,
            health,
            footer,
        })
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let health = self.effective_health()?;

        let mut out = Vec::with_capacity(self.footer.len() + POST_DVAR_LEN * 2);
        out.extend_from_slice(&self.header);
        for (table, strings) in StringTable::ALL.iter().zip(&self.tables) {
            write_string_table(&mut out, strings, table.as_str())?;
        }
        write_dvar_block(&mut out, &self.dvars)?;
        out.extend_from_slice(&self.post_dvars);
        out.extend_from_slice(&self.extra_count.to_le_bytes());
        out.extend_from_slice(&self.extra_entries);
        for field in self.extra_fields {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&health.to_le_bytes());
        out.extend_from_slice(&self.footer);
        Ok(out)
    }

    /// Replace the whole dvar table, as when restoring a backup.
    pub fn import_dvars(&mut self, dvars: DvarMap) {
        self.dvars = dvars;
    }

    pub fn string_table(&self, table: StringTable) -> &[String] {
        &self.tables[table.index()]
    }

    /// Health field as read from the record.
    pub fn stored_health(&self) -> i32 {
        self.health
    }

    /// Health that [`Segment2::to_bytes`] will write: the `g_player_maxHealth`
    /// dvar when it has a value, the stored field otherwise.
    pub fn effective_health(&self) -> io::Result<i32> {
        match self.dvars.get(&hash_dvar(HEALTH_DVAR)) {
            Some(value) => parse_health(value),
            None => Ok(self.health),
        }
    }

    pub fn extra_count(&self) -> i32 {
        self.extra_count
    }

    pub fn footer_len(&self) -> usize {
        self.footer.len()
    }
}

fn parse_health(value: &str) -> io::Result<i32> {
    let trimmed = value.trim();
    if let Ok(health) = trimmed.parse::<i32>() {
        return Ok(health);
    }
    // Dvar values are free text; accept decimal forms such as "500.0".
    match trimmed.parse::<f64>() {
        Ok(v) if (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&v) => {
            Ok(v.trunc() as i32)
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{HEALTH_DVAR} value {value:?} is not an integer"),
        )),
    }
}
