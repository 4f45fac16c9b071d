use crate::wave::DecodeError;

/// Errors that can occur while decoding a packed experiment
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// A record header or body extends past the end of the stream
    #[error("Truncated record at byte {offset}: needs {needed} bytes, {available} available")]
    TruncatedRecord {
        /// Byte offset of the record header
        offset: usize,
        /// Bytes the record declares
        needed: usize,
        /// Bytes left in the stream
        available: usize,
    },

    /// A wave record's embedded container could not be decoded
    #[error("Invalid wave record at byte {offset}: {source}")]
    InvalidWave {
        /// Byte offset of the record header
        offset: usize,
        /// Underlying decode error
        #[source]
        source: DecodeError,
    },

    /// Folder start/end markers do not nest
    #[error("Folder end at byte {offset} without a matching folder start")]
    UnbalancedFolder {
        /// Byte offset of the record header
        offset: usize,
    },

    /// Record kind the decoder does not model
    #[error("Unsupported record type {record_type} at byte {offset}")]
    UnsupportedRecord {
        /// Record type code (superseded flag removed)
        record_type: u16,
        /// Byte offset of the record header
        offset: usize,
    },
}
