//! Packed experiment record stream.

use crate::wave::{trim_nul, ByteCursor, Endian};

use super::ArchiveError;

/// Size of `PackedFileRecordHeader`
pub(crate) const RECORD_HEADER_SIZE: usize = 8;
/// Low 15 bits of `recordType` carry the kind
const RECORD_TYPE_MASK: u16 = 0x7FFF;
/// High bit of `recordType` marks a record replaced later in the file
const SUPERSEDED_MASK: u16 = 0x8000;

/// Record kinds defined by the packed experiment format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Unused slot
    Unused,
    /// System and user variables
    Variables,
    /// Command history text
    History,
    /// Embedded binary wave
    Wave,
    /// Recreation macros
    Recreation,
    /// Procedure window text
    Procedure,
    /// History retrieval marker
    GetHistory,
    /// Embedded packed file (notebooks, procedures)
    PackedFile,
    /// Start of a data folder
    FolderStart,
    /// End of the current data folder
    FolderEnd,
}

impl RecordKind {
    /// Map a record type code (superseded flag removed) to its kind
    pub fn from_code(code: u16) -> Option<Self> {
        let kind = match code {
            0 | 6 => RecordKind::Unused,
            1 => RecordKind::Variables,
            2 => RecordKind::History,
            3 => RecordKind::Wave,
            4 => RecordKind::Recreation,
            5 => RecordKind::Procedure,
            7 => RecordKind::GetHistory,
            8 => RecordKind::PackedFile,
            9 => RecordKind::FolderStart,
            10 => RecordKind::FolderEnd,
            _ => return None,
        };
        Some(kind)
    }
}

/// `PackedFileRecordHeader`
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordHeader {
    pub record_type: u16,
    pub version: i16,
    pub num_data_bytes: usize,
}

impl RecordHeader {
    pub(crate) fn read(bytes: &[u8], offset: usize, endian: Endian) -> Result<Self, ArchiveError> {
        let truncated = || ArchiveError::TruncatedRecord {
            offset,
            needed: RECORD_HEADER_SIZE,
            available: bytes.len().saturating_sub(offset),
        };
        let mut cursor = ByteCursor::at(bytes, endian, offset);
        let record_type = cursor.u16("recordType").map_err(|_| truncated())?;
        let version = cursor.i16("version").map_err(|_| truncated())?;
        let num_data_bytes = cursor.i32("numDataBytes").map_err(|_| truncated())?;
        let num_data_bytes = usize::try_from(num_data_bytes).map_err(|_| truncated())?;
        Ok(Self {
            record_type,
            version,
            num_data_bytes,
        })
    }

    pub(crate) fn is_superseded(&self) -> bool {
        self.record_type & SUPERSEDED_MASK != 0
    }

    pub(crate) fn type_code(&self) -> u16 {
        self.record_type & RECORD_TYPE_MASK
    }
}

/// A record body, classified in one dispatch step
#[derive(Debug)]
pub(crate) enum PackedRecord<'a> {
    /// Complete single-wave container
    Wave(&'a [u8]),
    /// Folder name (NUL trimmed)
    FolderStart(&'a [u8]),
    FolderEnd,
    /// A known kind this decoder has no use for
    Ignored(RecordKind),
}

impl<'a> PackedRecord<'a> {
    pub(crate) fn classify(header: &RecordHeader, body: &'a [u8], offset: usize) -> Result<Self, ArchiveError> {
        let kind = RecordKind::from_code(header.type_code()).ok_or(ArchiveError::UnsupportedRecord {
            record_type: header.type_code(),
            offset,
        })?;
        let record = match kind {
            RecordKind::Wave => PackedRecord::Wave(body),
            RecordKind::FolderStart => PackedRecord::FolderStart(trim_nul(body)),
            RecordKind::FolderEnd => PackedRecord::FolderEnd,
            other => PackedRecord::Ignored(other),
        };
        Ok(record)
    }
}
