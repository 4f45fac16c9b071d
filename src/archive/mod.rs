//! # Packed experiment decoding
//!
//! A packed experiment (`.pxp`) is a flat stream of records, each an 8-byte
//! header followed by a body. Folder start/end records bracket the data
//! folder hierarchy and wave records embed complete binary waves. This module
//! rebuilds that hierarchy as an [`ArchiveTree`] and resolves slash-delimited
//! paths against it.
//!
//! Records this decoder has no use for (variables, history, procedures, ...)
//! are skipped. A record whose kind is not defined by the format at all is
//! an [`ArchiveError::UnsupportedRecord`] unless the caller opts into
//! [`RecordPolicy::Skip`].

mod error;
mod record;
mod resolve;
mod tree;

#[cfg(test)]
mod tests;

use log::{debug, warn};
use serde::Deserialize;

use crate::wave::{Endian, WaveRecord};
use record::{PackedRecord, RecordHeader, RECORD_HEADER_SIZE};

pub use error::ArchiveError;
pub use record::RecordKind;
pub use tree::{ArchiveNode, ArchiveTree, Folder, ObjectName};

/// What to do with a record kind the format does not define
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// Abort decoding with [`ArchiveError::UnsupportedRecord`]
    #[default]
    Error,
    /// Log a warning and continue with the next record
    Skip,
}

/// Options for decoding a packed experiment
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    /// Handling of undefined record kinds
    pub unknown_records: RecordPolicy,
}

impl ArchiveTree {
    /// Decode a packed experiment with default options
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        decode_archive(bytes, &ArchiveOptions::default())
    }
}

fn current<'a>(stack: &'a mut [(ObjectName, Folder)], root: &'a mut Folder) -> &'a mut Folder {
    match stack.last_mut() {
        Some((_, folder)) => folder,
        None => root,
    }
}

/// Decode a packed experiment record stream into its folder tree
pub fn decode_archive(bytes: &[u8], options: &ArchiveOptions) -> Result<ArchiveTree, ArchiveError> {
    let mut endian: Option<Endian> = None;
    let mut root = Folder::new();
    let mut stack: Vec<(ObjectName, Folder)> = Vec::new();
    let mut offset = 0usize;
    let mut record_count = 0usize;

    while offset < bytes.len() {
        let record_offset = offset;
        let mut header = RecordHeader::read(bytes, offset, endian.unwrap_or(Endian::Little))?;

        // The first record's version field fixes the byte order of the stream
        if endian.is_none() {
            let detected = Endian::detect([bytes[offset + 2], bytes[offset + 3]]);
            if detected != Endian::Little {
                header = RecordHeader::read(bytes, offset, detected)?;
            }
            debug!("Packed experiment byte order: {:?}", detected);
            endian = Some(detected);
        }

        let body_start = offset + RECORD_HEADER_SIZE;
        let body_end = body_start
            .checked_add(header.num_data_bytes)
            .filter(|&end| end <= bytes.len())
            .ok_or(ArchiveError::TruncatedRecord {
                offset: record_offset,
                needed: header.num_data_bytes,
                available: bytes.len() - body_start,
            })?;
        let body = &bytes[body_start..body_end];
        offset = body_end;
        record_count += 1;

        if header.is_superseded() {
            debug!("Skipping superseded record at byte {}", record_offset);
            continue;
        }

        let record = match PackedRecord::classify(&header, body, record_offset) {
            Ok(record) => record,
            Err(ArchiveError::UnsupportedRecord { record_type, offset })
                if options.unknown_records == RecordPolicy::Skip =>
            {
                warn!(
                    "Skipping unsupported record type {} at byte {}",
                    record_type, offset
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        match record {
            PackedRecord::Wave(container) => {
                let wave = WaveRecord::from_bytes(container).map_err(|source| {
                    ArchiveError::InvalidWave {
                        offset: record_offset,
                        source,
                    }
                })?;
                let name = ObjectName::bytes(wave.header.name.clone());
                debug!("Wave record '{}' at byte {}", name, record_offset);
                current(&mut stack, &mut root).insert(name, ArchiveNode::Wave(Box::new(wave)));
            }
            PackedRecord::FolderStart(name) => {
                let name = ObjectName::bytes(name);
                debug!("Entering folder '{}'", name);
                stack.push((name, Folder::new()));
            }
            PackedRecord::FolderEnd => {
                let (name, folder) = stack
                    .pop()
                    .ok_or(ArchiveError::UnbalancedFolder {
                        offset: record_offset,
                    })?;
                current(&mut stack, &mut root).insert(name, ArchiveNode::Folder(folder));
            }
            PackedRecord::Ignored(kind) => {
                debug!("Ignoring {:?} record at byte {}", kind, record_offset);
            }
        }
    }

    while let Some((name, folder)) = stack.pop() {
        warn!("Folder '{}' not closed before end of stream", name);
        current(&mut stack, &mut root).insert(name, ArchiveNode::Folder(folder));
    }

    debug!("Decoded {} packed records", record_count);
    Ok(ArchiveTree::from_root(root))
}
