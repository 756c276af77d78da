use std::io;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionId {
    Header,
    /// Framed segment, length prefix included.
    Segment(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub fn section(&self, id: SectionId) -> Option<&SectionLayout> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn validate(&self) -> io::Result<()> {
        let Some(first) = self.sections.first() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "file layout must contain at least one section",
            ));
        };

        if first.range.start != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "layout does not start at byte 0",
            ));
        }

        let mut expected = 0usize;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "layout gap/overlap around section {:?}: expected start {}, got {}",
                        section.id, expected, section.range.start
                    ),
                ));
            }
            if section.range.end < section.range.start {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "invalid section range {:?}: {}..{}",
                        section.id, section.range.start, section.range.end
                    ),
                ));
            }
            expected = section.range.end;
        }

        if expected != self.file_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "layout does not cover file: ended at {}, file length {}",
                    expected, self.file_len
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: SectionId, start: usize, end: usize) -> SectionLayout {
        SectionLayout {
            id,
            range: ByteRange { start, end },
        }
    }

    #[test]
    fn contiguous_layout_validates() {
        let layout = FileLayout {
            file_len: 30,
            sections: vec![
                section(SectionId::Header, 0, 10),
                section(SectionId::Segment(0), 10, 14),
                section(SectionId::Segment(1), 14, 30),
            ],
        };
        layout.validate().expect("layout should validate");
        assert_eq!(
            layout.section(SectionId::Segment(1)).map(|s| s.range.len()),
            Some(16)
        );
    }

    #[test]
    fn gap_is_rejected() {
        let layout = FileLayout {
            file_len: 20,
            sections: vec![
                section(SectionId::Header, 0, 10),
                section(SectionId::Segment(0), 12, 20),
            ],
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn short_coverage_is_rejected() {
        let layout = FileLayout {
            file_len: 20,
            sections: vec![section(SectionId::Header, 0, 10)],
        };
        assert!(layout.validate().is_err());
        assert!(
            FileLayout {
                file_len: 0,
                sections: Vec::new()
            }
            .validate()
            .is_err()
        );
    }
}
