//! Binary wave container decoding.
//!
//! Layouts handled:
//!
//! ```text
//! v1:  BinHeader1 (8)   WaveHeader2 (110)  wData  pad(16)
//! v2:  BinHeader2 (16)  WaveHeader2 (110)  wData  pad(16)  note
//! v3:  BinHeader3 (20)  WaveHeader2 (110)  wData  pad(16)  note  formula
//! v5:  BinHeader5 (64)  WaveHeader5 (320)  wData  formula  note  dataEUnits
//!      dimEUnits[4]  dimLabels[4]  sIndices
//! ```
//!
//! `wfmSize` counts the wave header (up to `wData`) plus the payload, plus
//! the 16 bytes of padding in versions 1-3, so the trailing sections start
//! at `bin_header_size + wfmSize`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::cursor::{trim_nul, word_checksum, ByteCursor, Endian};
use super::data::{element_count, ElementType, WaveArray, WaveData};
use super::header::{WaveHeader, MAX_DIMS};
use super::DecodeError;
use crate::note::parse_note;

/// Offset of `wData` inside WaveHeader2
const WAVE_HEADER2_DATA_OFFSET: usize = 110;
/// `sizeof(WaveHeader2)`, which includes the first 16 payload bytes
const WAVE_HEADER2_CHECKSUM_SIZE: usize = 126;
/// Offset of `wData` inside WaveHeader5
const WAVE_HEADER5_SIZE: usize = 320;
const BIN_HEADER5_SIZE: usize = 64;
/// Width of one dimension label slot, including the terminating NUL
const DIM_LABEL_SIZE: usize = 32;

/// One decoded wave: header, note blob and payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveRecord {
    /// Normalized header
    pub header: WaveHeader,
    /// Raw note bytes
    #[serde(skip)]
    pub note: Vec<u8>,
    /// Payload with its shape
    pub data: WaveArray,
    /// Units of the payload values (may be empty)
    pub data_units: String,
    /// Dependency formula, if the wave has one
    pub formula: Option<String>,
    /// Per-dimension labels: the dimension label first, then element labels
    pub dim_labels: [Vec<String>; MAX_DIMS],
}

impl WaveRecord {
    /// Decode a single-wave container from its raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < 2 {
            return Err(DecodeError::Truncated {
                field: "version",
                offset: 0,
                needed: 2,
                available: bytes.len(),
            });
        }
        let endian = Endian::detect([bytes[0], bytes[1]]);
        let version = ByteCursor::new(bytes, endian).i16("version")?;

        match version {
            1..=3 => decode_v123(bytes, endian, version),
            5 => decode_v5(bytes, endian),
            other => Err(DecodeError::UnsupportedVersion(other)),
        }
    }

    /// Parsed key/value pairs of the note
    pub fn notes(&self) -> BTreeMap<String, String> {
        parse_note(&self.note)
    }
}

fn verify_checksum(bytes: &[u8], endian: Endian, len: usize) -> Result<(), DecodeError> {
    if bytes.len() < len {
        return Err(DecodeError::Truncated {
            field: "header",
            offset: 0,
            needed: len,
            available: bytes.len(),
        });
    }
    match word_checksum(&bytes[..len], endian) {
        0 => Ok(()),
        residual => Err(DecodeError::ChecksumMismatch(residual)),
    }
}

fn element_type(code: i16) -> Result<ElementType, DecodeError> {
    ElementType::from_code(code).ok_or(DecodeError::UnsupportedType(code))
}

fn non_negative(value: i32, field: &str) -> Result<usize, DecodeError> {
    usize::try_from(value)
        .map_err(|_| DecodeError::InvalidLayout(format!("negative {field}: {value}")))
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(trim_nul(bytes)).into_owned()
}

fn formula(bytes: &[u8]) -> Option<String> {
    Some(text(bytes)).filter(|f| !f.is_empty())
}

/// Split a dimension label block into its fixed-width slots
fn labels(block: &[u8]) -> Vec<String> {
    block.chunks(DIM_LABEL_SIZE).map(text).collect()
}

/// Versions 1-3: one dimension described by WaveHeader2
fn decode_v123(bytes: &[u8], endian: Endian, version: i16) -> Result<WaveRecord, DecodeError> {
    let mut cursor = ByteCursor::at(bytes, endian, 2);
    let wfm_size = non_negative(cursor.i32("wfmSize")?, "wfmSize")?;
    let (note_size, formula_size, bin_header_size) = match version {
        1 => (0, 0, 8),
        2 => (non_negative(cursor.i32("noteSize")?, "noteSize")?, 0, 16),
        _ => (
            non_negative(cursor.i32("noteSize")?, "noteSize")?,
            non_negative(cursor.i32("formulaSize")?, "formulaSize")?,
            20,
        ),
    };
    verify_checksum(bytes, endian, bin_header_size + WAVE_HEADER2_CHECKSUM_SIZE)?;

    let base = bin_header_size;
    let mut cursor = ByteCursor::at(bytes, endian, base);
    let element_type = element_type(cursor.i16("type")?)?;
    if element_type == ElementType::Text {
        return Err(DecodeError::UnsupportedType(0));
    }
    cursor.skip(4);
    let name = trim_nul(cursor.bytes("bname", 20)?).to_vec();
    cursor.seek(base + 34);
    let data_units = text(cursor.bytes("dataUnits", 4)?);
    let x_units = text(cursor.bytes("xUnits", 4)?);
    let npnts = non_negative(cursor.i32("npnts")?, "npnts")?;
    cursor.skip(2);
    let hs_a = cursor.f64("hsA")?;
    let hs_b = cursor.f64("hsB")?;
    cursor.seek(base + 96);
    let creation_date = cursor.u32("creationDate")?;
    cursor.skip(2);
    let mod_date = cursor.u32("modDate")?;

    let data_start = base + WAVE_HEADER2_DATA_OFFSET;
    let payload = bytes.get(data_start..).unwrap_or_default();
    let data = WaveData::decode_numeric(payload, element_type, npnts, endian)?;
    let data = WaveArray::new(vec![npnts], data)?;

    let payload_bytes = npnts * element_type.byte_size().unwrap_or(0);
    if wfm_size < WAVE_HEADER2_DATA_OFFSET + payload_bytes {
        return Err(DecodeError::InvalidLayout(format!(
            "wfmSize {wfm_size} smaller than header plus {payload_bytes} payload bytes"
        )));
    }

    let mut cursor = ByteCursor::at(bytes, endian, base + wfm_size);
    let note = cursor.bytes("note", note_size)?.to_vec();
    let formula = formula(cursor.bytes("formula", formula_size)?);

    let mut dim_units: [String; MAX_DIMS] = Default::default();
    dim_units[0] = x_units;

    Ok(WaveRecord {
        header: WaveHeader {
            version,
            byte_order: endian,
            name,
            element_type,
            num_points: npnts,
            dim_sizes: [npnts as i32, 0, 0, 0],
            scale_a: [hs_a, 0.0, 0.0, 0.0],
            scale_b: [hs_b, 0.0, 0.0, 0.0],
            dim_units,
            creation_date,
            mod_date,
        },
        note,
        data,
        data_units,
        formula,
        dim_labels: Default::default(),
    })
}

/// Section sizes from BinHeader5
struct BinHeader5 {
    wfm_size: usize,
    formula_size: usize,
    note_size: usize,
    data_e_units_size: usize,
    dim_e_units_size: [usize; MAX_DIMS],
    dim_labels_size: [usize; MAX_DIMS],
    s_indices_size: usize,
}

impl BinHeader5 {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.seek(4);
        let wfm_size = non_negative(cursor.i32("wfmSize")?, "wfmSize")?;
        let formula_size = non_negative(cursor.i32("formulaSize")?, "formulaSize")?;
        let note_size = non_negative(cursor.i32("noteSize")?, "noteSize")?;
        let data_e_units_size = non_negative(cursor.i32("dataEUnitsSize")?, "dataEUnitsSize")?;
        let mut dim_e_units_size = [0; MAX_DIMS];
        for size in dim_e_units_size.iter_mut() {
            *size = non_negative(cursor.i32("dimEUnitsSize")?, "dimEUnitsSize")?;
        }
        let mut dim_labels_size = [0; MAX_DIMS];
        for size in dim_labels_size.iter_mut() {
            *size = non_negative(cursor.i32("dimLabelsSize")?, "dimLabelsSize")?;
        }
        let s_indices_size = non_negative(cursor.i32("sIndicesSize")?, "sIndicesSize")?;
        Ok(Self {
            wfm_size,
            formula_size,
            note_size,
            data_e_units_size,
            dim_e_units_size,
            dim_labels_size,
            s_indices_size,
        })
    }
}

fn decode_v5(bytes: &[u8], endian: Endian) -> Result<WaveRecord, DecodeError> {
    verify_checksum(bytes, endian, BIN_HEADER5_SIZE + WAVE_HEADER5_SIZE)?;
    let mut cursor = ByteCursor::new(bytes, endian);
    let bin = BinHeader5::read(&mut cursor)?;

    let base = BIN_HEADER5_SIZE;
    cursor.seek(base + 4);
    let creation_date = cursor.u32("creationDate")?;
    let mod_date = cursor.u32("modDate")?;
    let npnts = non_negative(cursor.i32("npnts")?, "npnts")?;
    let element_type = element_type(cursor.i16("type")?)?;
    cursor.seek(base + 28);
    let name = trim_nul(cursor.bytes("bname", 32)?).to_vec();
    cursor.seek(base + 68);
    let mut dim_sizes = [0i32; MAX_DIMS];
    for size in dim_sizes.iter_mut() {
        *size = cursor.i32("nDim")?;
    }
    let mut scale_a = [0.0; MAX_DIMS];
    for a in scale_a.iter_mut() {
        *a = cursor.f64("sfA")?;
    }
    let mut scale_b = [0.0; MAX_DIMS];
    for b in scale_b.iter_mut() {
        *b = cursor.f64("sfB")?;
    }
    let short_data_units = text(cursor.bytes("dataUnits", 4)?);
    let mut dim_units: [String; MAX_DIMS] = Default::default();
    for units in dim_units.iter_mut() {
        *units = text(cursor.bytes("dimUnits", 4)?);
    }

    let mut shape: Vec<usize> = dim_sizes
        .iter()
        .filter(|&&size| size > 0)
        .map(|&size| size as usize)
        .collect();
    if shape.is_empty() {
        shape.push(npnts);
    }
    let described = element_count(&shape)?;
    if described != npnts {
        return Err(DecodeError::InvalidLayout(format!(
            "dimension sizes {shape:?} describe {described} elements, npnts is {npnts}"
        )));
    }

    if bin.wfm_size < WAVE_HEADER5_SIZE {
        return Err(DecodeError::InvalidLayout(format!(
            "wfmSize {} smaller than the wave header",
            bin.wfm_size
        )));
    }
    let data_start = base + WAVE_HEADER5_SIZE;
    let data_block_size = bin.wfm_size - WAVE_HEADER5_SIZE;
    cursor.seek(data_start);
    let data_block = cursor.bytes("wData", data_block_size)?;

    let formula = formula(cursor.bytes("formula", bin.formula_size)?);
    let note = cursor.bytes("note", bin.note_size)?.to_vec();
    let data_units = match bin.data_e_units_size {
        0 => short_data_units,
        size => text(cursor.bytes("dataEUnits", size)?),
    };
    for (dim, &size) in bin.dim_e_units_size.iter().enumerate() {
        if size > 0 {
            dim_units[dim] = text(cursor.bytes("dimEUnits", size)?);
        }
    }
    let mut dim_labels: [Vec<String>; MAX_DIMS] = Default::default();
    for (dim, &size) in bin.dim_labels_size.iter().enumerate() {
        dim_labels[dim] = labels(cursor.bytes("dimLabels", size)?);
    }

    let data = if element_type == ElementType::Text {
        let index_table = cursor.bytes("sIndices", bin.s_indices_size)?;
        WaveData::decode_text(data_block, index_table, npnts, endian)?
    } else {
        WaveData::decode_numeric(data_block, element_type, npnts, endian)?
    };

    let data = WaveArray::new(shape, data)?;

    Ok(WaveRecord {
        header: WaveHeader {
            version: 5,
            byte_order: endian,
            name,
            element_type,
            num_points: npnts,
            dim_sizes,
            scale_a,
            scale_b,
            dim_units,
            creation_date,
            mod_date,
        },
        note,
        data,
        data_units,
        formula,
        dim_labels,
    })
}
