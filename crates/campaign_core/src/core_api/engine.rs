use crate::campaign::{CampaignSave, DVAR_SEGMENT_INDEX};
use crate::codec::EncoderConfig;
use crate::hash::hash_dvar;
use crate::layout::FileLayout;
use crate::reader::ascii_bytes;
use crate::segment2::{DvarMap, Segment2, StringTable};

use super::error::{CoreError, CoreErrorCode};
use super::types::{DvarEntry, Snapshot, StringTableSummary};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    encoder: EncoderConfig,
}

/// A loaded save with its dvar segment decoded and ready for editing.
#[derive(Debug)]
pub struct Session {
    save: CampaignSave,
    segment2: Segment2,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoder_config(encoder: EncoderConfig) -> Self {
        Self { encoder }
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let mut save = CampaignSave::from_bytes(bytes.as_ref())
            .map_err(|e| CoreError::from_io("failed to parse save container", e))?;
        save.set_encoder_config(self.encoder);

        let decoded = save
            .segment(DVAR_SEGMENT_INDEX)
            .map_err(|e| CoreError::from_io("failed to read dvar segment", e))?;
        let segment2 = Segment2::parse(&decoded)
            .map_err(|e| CoreError::from_io("failed to parse dvar segment", e))?;

        Ok(Session { save, segment2 })
    }
}

impl Session {
    pub fn snapshot(&self) -> Snapshot {
        let string_tables = StringTable::ALL
            .iter()
            .map(|&table| {
                let strings = self.segment2.string_table(table);
                StringTableSummary {
                    table,
                    capacity: strings.len(),
                    populated: strings.iter().filter(|s| !s.is_empty()).count(),
                }
            })
            .collect();

        Snapshot {
            checksum: self.save.checksum_status(),
            segment_count: self.save.segment_count(),
            payload_len: self.save.payload_len(),
            trailing_len: self.save.trailing_len(),
            dvar_count: self.segment2.dvars.len(),
            stored_health: self.segment2.stored_health(),
            effective_health: self.segment2.effective_health().ok(),
            string_tables,
        }
    }

    pub fn campaign(&self) -> &CampaignSave {
        &self.save
    }

    pub fn segment2(&self) -> &Segment2 {
        &self.segment2
    }

    pub fn layout(&self) -> FileLayout {
        self.save.layout()
    }

    pub fn dvars(&self) -> Vec<DvarEntry> {
        self.segment2
            .dvars
            .iter()
            .map(|(hash, value)| DvarEntry {
                hash: hash.to_string(),
                value: value.map(str::to_string),
            })
            .collect()
    }

    /// Look up a dvar by name or by `0x` hash.
    pub fn dvar(&self, name: &str) -> Option<&str> {
        self.segment2.dvars.get(&hash_dvar(name))
    }

    /// Set a dvar by name or hash; returns the key it was stored under.
    pub fn set_dvar(&mut self, name: &str, value: &str) -> Result<String, CoreError> {
        ascii_bytes(value, "dvar value")
            .map_err(|e| CoreError::new(CoreErrorCode::InvalidInput, format!("{name}: {e}")))?;
        let hash = hash_dvar(name);
        self.segment2.dvars.insert(hash.clone(), value);
        Ok(hash)
    }

    /// Keep the dvar key but drop its value so it is left out of the save.
    pub fn unset_dvar(&mut self, name: &str) -> String {
        let hash = hash_dvar(name);
        self.segment2.dvars.unset(hash.clone());
        hash
    }

    pub fn remove_dvar(&mut self, name: &str) -> Result<Option<String>, CoreError> {
        let hash = hash_dvar(name);
        if !self.segment2.dvars.contains_key(&hash) {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("dvar {name} ({hash}) not found"),
            ));
        }
        Ok(self.segment2.dvars.remove(&hash))
    }

    pub fn import_dvars(&mut self, dvars: DvarMap) {
        self.segment2.import_dvars(dvars);
    }

    pub fn export_dvars(&self) -> DvarMap {
        self.segment2.dvars.clone()
    }

    /// Re-encode the dvar segment and emit the whole save.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let record = self
            .segment2
            .to_bytes()
            .map_err(|e| CoreError::from_io("failed to serialize dvar segment", e))?;
        self.save
            .set_segment(DVAR_SEGMENT_INDEX, &record)
            .and_then(|save| save.to_bytes())
            .map_err(|e| CoreError::from_io("failed to write save", e))
    }
}
