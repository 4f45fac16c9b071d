/// Errors that can occur while decoding a single-wave container
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before a field could be read
    #[error("Truncated container: {field} needs {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Field being read when the buffer ran out
        field: &'static str,
        /// Byte offset of the field
        offset: usize,
        /// Bytes required by the field
        needed: usize,
        /// Bytes remaining in the buffer
        available: usize,
    },

    /// The version marker is not a known binary-wave version
    #[error("Unsupported binary wave version: {0}")]
    UnsupportedVersion(i16),

    /// Header words do not sum to zero
    #[error("Header checksum mismatch (residual {0:#06x})")]
    ChecksumMismatch(u16),

    /// The wave declares an element type this decoder does not model
    #[error("Unsupported wave element type: {0:#06x}")]
    UnsupportedType(i16),

    /// Structurally inconsistent header or payload
    #[error("Invalid wave layout: {0}")]
    InvalidLayout(String),
}
