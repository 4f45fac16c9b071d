//! Wave note parsing.
//!
//! Instrument software writes acquisition parameters into the wave note as
//! `key=value` pairs, one per line, mixed with free-form text. Parsing is
//! permissive: anything that is not a single `key=value` token is skipped.

use std::collections::BTreeMap;

/// Parse a note blob into key/value pairs.
///
/// Carriage returns and line feeds both separate lines. The text is split on
/// whitespace and each token containing exactly one `=` becomes a pair; all
/// other tokens are ignored. When a key repeats, the last value wins.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_note(note: &[u8]) -> BTreeMap<String, String> {
    let text = String::from_utf8_lossy(note).replace('\r', "\n");

    let mut pairs = BTreeMap::new();
    for token in text.split_whitespace() {
        let mut parts = token.split('=');
        if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            pairs.insert(key.to_string(), value.to_string());
        }
    }
    pairs
}
