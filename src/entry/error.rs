use crate::archive::ArchiveError;
use crate::wave::DecodeError;

/// Errors that can occur during a conversion run
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Reading an input file failed
    #[error("I/O error reading {file}: {source}")]
    Io {
        /// File being read
        file: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Undecodable wave header or record stream
    #[error("Malformed container {file}: {reason}")]
    MalformedContainer {
        /// Container the error was found in
        file: String,
        /// Decoder diagnostic
        reason: String,
    },

    /// Archive record kind the format does not define
    #[error("Unsupported record type {record_type} at byte {offset} in {file}")]
    UnsupportedRecord {
        /// Archive the record was found in
        file: String,
        /// Record type code with flag bits removed
        record_type: u16,
        /// Byte offset of the record header
        offset: usize,
    },

    /// Inputs or configuration sources that cannot be combined
    #[error("Conflicting input mode: {0}")]
    ConflictingInputMode(String),

    /// Archive entries configured without a `data` reference
    #[error("Entries without a data reference: {}", entries.join(", "))]
    MissingDataReference {
        /// Every offending entry, in name order
        entries: Vec<String>,
    },

    /// A required archive path did not resolve to a wave
    #[error("Entry '{entry}': {key} path '{path}' not found in {file}")]
    ReferenceNotFound {
        /// Entry holding the reference
        entry: String,
        /// Configuration key of the reference
        key: String,
        /// Configured path
        path: String,
        /// Archive searched
        file: String,
    },

    /// The entry configuration cannot be interpreted
    #[error("Invalid entry configuration: {0}")]
    InvalidConfig(String),
}

impl ConvertError {
    pub(crate) fn from_decode(file: &str, err: DecodeError) -> Self {
        ConvertError::MalformedContainer {
            file: file.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn from_archive(file: &str, err: ArchiveError) -> Self {
        match err {
            ArchiveError::UnsupportedRecord {
                record_type,
                offset,
            } => ConvertError::UnsupportedRecord {
                file: file.to_string(),
                record_type,
                offset,
            },
            other => ConvertError::MalformedContainer {
                file: file.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
