//! # igornx - Igor Pro wave decoding and entry normalization
//!
//! `igornx` reads the two container families written by WaveMetrics Igor Pro
//! and flattens their contents into path-keyed entries, ready to be mapped
//! onto a hierarchical scientific data format.
//!
//! ## Key Features
//!
//! - **Binary waves** (`.ibw`): versions 1, 2, 3 and 5, both byte orders,
//!   numeric, complex and text payloads, header checksum verification.
//!
//! - **Packed experiments** (`.pxp`): the record stream is rebuilt into the
//!   experiment's data folder tree; waves are addressed by slash-delimited
//!   paths such as `root/scans/scan_1`.
//!
//! - **Wave notes**: `key=value` metadata written by acquisition software is
//!   parsed into a sorted map.
//!
//! - **Axes from scaling**: coordinates are reconstructed from each
//!   dimension's step and offset, or taken from a configured coordinate wave.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use igornx::entry::{ConversionRun, EntryConfig, EntryConfigSet};
//!
//! let entries = EntryConfigSet::new().with_entry(
//!     "scan_1",
//!     EntryConfig::with_data("scan_1.ibw")
//!         .axis_name(0, "energy")
//!         .axis_units(0, "eV"),
//! );
//!
//! let mut run = ConversionRun::new();
//! run.set_entries(entries)?;
//! run.add_wave_file("scan_1.ibw");
//! let store = run.run()?;
//!
//! for (key, _value) in store.iter() {
//!     println!("{key}");
//! }
//! # Ok::<(), igornx::entry::ConvertError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`wave`]: binary wave container decoding
//! - [`archive`]: packed experiment decoding and path resolution
//! - [`note`]: wave note parsing
//! - [`axis`]: axis coordinates from wave scaling
//! - [`entry`]: entry configuration and normalization into an [`entry::OutputStore`]

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod axis;
pub mod entry;
pub mod note;
pub mod wave;

#[cfg(test)]
mod fixtures;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::archive::{
        decode_archive, ArchiveError, ArchiveNode, ArchiveOptions, ArchiveTree, Folder,
        ObjectName, RecordPolicy,
    };
    pub use crate::axis::{axis_coordinates, axis_units};
    pub use crate::entry::{
        ContainerKind, ConversionRun, ConvertError, EntryConfig, EntryConfigSet, InputFile,
        MetadataValue, OutputStore, RunSettings, StoreValue,
    };
    pub use crate::note::parse_note;
    pub use crate::wave::{
        DecodeError, ElementType, Endian, WaveArray, WaveData, WaveHeader, WaveRecord,
    };
}
