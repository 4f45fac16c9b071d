//! # Igor Binary Wave decoding
//!
//! A binary wave (`.ibw`) holds one N-dimensional array (up to four
//! dimensions), its scaling header, and a free-text note. This module turns
//! the raw container bytes into a [`WaveRecord`]:
//!
//! - **Header**: element type, dimension sizes, per-dimension scale factor
//!   `A` and offset `B`, and units, normalized into [`WaveHeader`] for every
//!   supported file version (1, 2, 3 and 5).
//! - **Note**: kept as raw bytes; see [`crate::note`] for parsing.
//! - **Payload**: decoded into a typed [`WaveArray`] in file order.
//!
//! Decoding is a pure function of the input bytes. Both byte orders are
//! supported; the order is detected from the version field.
//!
//! ```rust,no_run
//! use igornx::wave::WaveRecord;
//!
//! let bytes = std::fs::read("scan_1.ibw")?;
//! let wave = WaveRecord::from_bytes(&bytes)?;
//! println!("{} points, units {:?}", wave.data.len(), wave.data_units);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cursor;
mod data;
mod error;
mod header;
mod record;


pub(crate) use cursor::{trim_nul, word_checksum, ByteCursor};
pub use cursor::Endian;
pub use data::{ElementType, WaveArray, WaveData};
pub use error::DecodeError;
pub use header::{WaveHeader, MAX_DIMS};
pub use record::WaveRecord;
