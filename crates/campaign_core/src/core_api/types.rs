use serde::{Deserialize, Serialize};

use crate::campaign::ChecksumStatus;
use crate::segment2::StringTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub checksum: ChecksumStatus,
    pub segment_count: usize,
    pub payload_len: usize,
    pub trailing_len: usize,
    pub dvar_count: usize,
    pub stored_health: i32,
    /// `None` when the health dvar holds a non-numeric value.
    pub effective_health: Option<i32>,
    pub string_tables: Vec<StringTableSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StringTableSummary {
    pub table: StringTable,
    pub capacity: usize,
    pub populated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DvarEntry {
    pub hash: String,
    pub value: Option<String>,
}
