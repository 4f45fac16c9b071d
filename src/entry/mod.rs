//! # Entry normalization
//!
//! Turns decoded waves into entries of a flat, path-keyed [`OutputStore`].
//! A [`ConversionRun`] works in one of two modes, picked from its inputs:
//!
//! - **Single-wave mode**: any number of binary waves. Each file becomes one
//!   entry, either the configured entry whose `data` equals the file name or
//!   an entry named after the file stem.
//! - **Packed-archive mode**: exactly one packed experiment. Every configured
//!   entry names its data wave (and optionally error and axis waves) by
//!   archive path.
//!
//! Per entry the store receives:
//!
//! ```text
//! <entry>/note/<key>      parsed note values
//! <entry>/<axis>.data     coordinates of each populated dimension
//! <entry>/<axis>.units
//! <entry>/<axis>.index    dimension index
//! <entry>/dims            axis names in dimension order
//! <entry>/data            payload
//! <entry>/data.units
//! <entry>/data.errors     archive mode, when configured
//! <entry>/<key>           configured metadata literals
//! ```

mod config;
mod error;
mod normalize;
mod store;


pub use config::{AxisOverride, EntryConfig, EntryConfigSet, MetadataValue};
pub use error::ConvertError;
pub use normalize::{ContainerKind, ConversionRun, InputFile, RunSettings};
pub use store::{OutputStore, StoreValue};
