use std::fmt;

use serde::{Deserialize, Serialize};

// Segment 2 record constants
pub const HEADER_LEN: usize = 0xD0;
pub const POST_DVAR_LEN: usize = 0xD000;
pub const EXTRA_ENTRY_LEN: usize = 8;
pub const EXTRA_FIELD_COUNT: usize = 4;

/// Length prefixes of 0, negative, or at least this size mean "empty".
pub const MAX_STRING_LEN: usize = 0x400;

pub const DVAR_BLOCK_END: i32 = -1;
/// Keys with this prefix are editor bookkeeping and never written to a save.
pub const RESERVED_DVAR_PREFIX: &str = "__";
/// Dvar that back-fills the record's fixed health field on write.
pub const HEALTH_DVAR: &str = "g_player_maxHealth";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringTable {
    Models1,
    Models2,
    Effects1,
    Effects2,
    Audio1,
    Audio2,
    Text1,
    UList1,
    UList2,
}

pub const STRING_TABLE_COUNT: usize = 9;

impl StringTable {
    /// On-disk order.
    pub const ALL: [StringTable; STRING_TABLE_COUNT] = [
        Self::Models1,
        Self::Models2,
        Self::Effects1,
        Self::Effects2,
        Self::Audio1,
        Self::Audio2,
        Self::Text1,
        Self::UList1,
        Self::UList2,
    ];

    pub fn capacity(self) -> usize {
        match self {
            Self::Models1 => 0x400,
            Self::Models2 => 0x40,
            Self::Effects1 | Self::Effects2 | Self::Audio1 => 0x200,
            Self::Audio2 => 0x80,
            Self::Text1 => 0x95F,
            Self::UList1 => 0x02,
            Self::UList2 => 0x0D,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Models1 => "models1",
            Self::Models2 => "models2",
            Self::Effects1 => "effects1",
            Self::Effects2 => "effects2",
            Self::Audio1 => "audio1",
            Self::Audio2 => "audio2",
            Self::Text1 => "text1",
            Self::UList1 => "u_list1",
            Self::UList2 => "u_list2",
        }
    }
}

impl fmt::Display for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
