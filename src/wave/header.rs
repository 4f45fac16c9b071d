use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::cursor::Endian;
use super::data::ElementType;

/// Maximum number of dimensions an Igor wave can carry
pub const MAX_DIMS: usize = 4;

/// Normalized header of a binary wave, independent of the file version.
///
/// Versions 1-3 describe a single dimension; they are mapped onto the
/// four-slot layout with slots 1..3 left empty (count 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveHeader {
    /// Binary wave file version (1, 2, 3 or 5)
    pub version: i16,
    /// Byte order the container was written in
    pub byte_order: Endian,
    /// Raw wave name bytes (NUL padding removed)
    pub name: Vec<u8>,
    /// Payload element type
    pub element_type: ElementType,
    /// Total element count (`npnts`)
    pub num_points: usize,
    /// Element count per dimension; 0 marks an unused dimension
    pub dim_sizes: [i32; MAX_DIMS],
    /// Per-dimension scale factor `A` (coordinate step)
    pub scale_a: [f64; MAX_DIMS],
    /// Per-dimension offset `B` (coordinate of the first element)
    pub scale_b: [f64; MAX_DIMS],
    /// Per-dimension units
    pub dim_units: [String; MAX_DIMS],
    /// Creation time, seconds since 1904-01-01
    pub creation_date: u32,
    /// Last modification time, seconds since 1904-01-01
    pub mod_date: u32,
}

impl WaveHeader {
    /// Wave name decoded lossily as UTF-8
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// Element count of dimension `dim` if that dimension is populated
    pub fn dim_size(&self, dim: usize) -> Option<usize> {
        match self.dim_sizes.get(dim) {
            Some(&count) if count > 0 => Some(count as usize),
            _ => None,
        }
    }

    /// Indices of the populated dimensions in ascending order
    pub fn populated_dims(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_DIMS).filter(move |&dim| self.dim_size(dim).is_some())
    }

    /// Number of populated dimensions
    pub fn num_dims(&self) -> usize {
        self.populated_dims().count()
    }

    /// Creation timestamp, if one was recorded
    pub fn created(&self) -> Option<NaiveDateTime> {
        igor_timestamp(self.creation_date)
    }

    /// Modification timestamp, if one was recorded
    pub fn modified(&self) -> Option<NaiveDateTime> {
        igor_timestamp(self.mod_date)
    }
}

/// Convert Igor's seconds-since-1904 clock; zero means "not set"
fn igor_timestamp(seconds: u32) -> Option<NaiveDateTime> {
    if seconds == 0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1904, 1, 1)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::seconds(i64::from(seconds)))
}
