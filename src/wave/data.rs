//! Typed wave payloads.
//!
//! Igor stores the numeric payload as a flat run of fixed-size elements in
//! column-major order (the first dimension varies fastest). The payload is
//! kept in that order; [`WaveArray::shape`] records the populated dimension
//! sizes so consumers can reinterpret it.

use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use serde::Serialize;

use super::cursor::Endian;
use super::DecodeError;

const NT_CMPLX: i16 = 0x01;
const NT_FP32: i16 = 0x02;
const NT_FP64: i16 = 0x04;
const NT_I8: i16 = 0x08;
const NT_I16: i16 = 0x10;
const NT_I32: i16 = 0x20;
const NT_UNSIGNED: i16 = 0x40;
const NT_I64: i16 = 0x80;

/// Element type of a wave payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Complex pair of 32-bit floats
    Complex32,
    /// Complex pair of 64-bit floats
    Complex64,
    /// Text wave (one string per element)
    Text,
}

impl ElementType {
    /// Map an Igor type code to an element type.
    ///
    /// Code 0 is a text wave; complex integer waves are not modeled.
    pub fn from_code(code: i16) -> Option<Self> {
        let ty = match code {
            0 => ElementType::Text,
            NT_I8 => ElementType::Int8,
            NT_I16 => ElementType::Int16,
            NT_I32 => ElementType::Int32,
            NT_I64 => ElementType::Int64,
            c if c == NT_I8 | NT_UNSIGNED => ElementType::UInt8,
            c if c == NT_I16 | NT_UNSIGNED => ElementType::UInt16,
            c if c == NT_I32 | NT_UNSIGNED => ElementType::UInt32,
            c if c == NT_I64 | NT_UNSIGNED => ElementType::UInt64,
            NT_FP32 => ElementType::Float32,
            NT_FP64 => ElementType::Float64,
            c if c == NT_FP32 | NT_CMPLX => ElementType::Complex32,
            c if c == NT_FP64 | NT_CMPLX => ElementType::Complex64,
            _ => return None,
        };
        Some(ty)
    }

    /// Igor type code for this element type
    pub fn code(&self) -> i16 {
        match self {
            ElementType::Text => 0,
            ElementType::Int8 => NT_I8,
            ElementType::Int16 => NT_I16,
            ElementType::Int32 => NT_I32,
            ElementType::Int64 => NT_I64,
            ElementType::UInt8 => NT_I8 | NT_UNSIGNED,
            ElementType::UInt16 => NT_I16 | NT_UNSIGNED,
            ElementType::UInt32 => NT_I32 | NT_UNSIGNED,
            ElementType::UInt64 => NT_I64 | NT_UNSIGNED,
            ElementType::Float32 => NT_FP32,
            ElementType::Float64 => NT_FP64,
            ElementType::Complex32 => NT_FP32 | NT_CMPLX,
            ElementType::Complex64 => NT_FP64 | NT_CMPLX,
        }
    }

    /// Byte size of one element (text waves have no fixed size)
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            ElementType::Text => None,
            ElementType::Int8 | ElementType::UInt8 => Some(1),
            ElementType::Int16 | ElementType::UInt16 => Some(2),
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => Some(4),
            ElementType::Int64
            | ElementType::UInt64
            | ElementType::Float64
            | ElementType::Complex32 => Some(8),
            ElementType::Complex64 => Some(16),
        }
    }
}

/// Decoded payload values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WaveData {
    /// Signed 8-bit values
    Int8(Vec<i8>),
    /// Signed 16-bit values
    Int16(Vec<i16>),
    /// Signed 32-bit values
    Int32(Vec<i32>),
    /// Signed 64-bit values
    Int64(Vec<i64>),
    /// Unsigned 8-bit values
    UInt8(Vec<u8>),
    /// Unsigned 16-bit values
    UInt16(Vec<u16>),
    /// Unsigned 32-bit values
    UInt32(Vec<u32>),
    /// Unsigned 64-bit values
    UInt64(Vec<u64>),
    /// 32-bit float values
    Float32(Vec<f32>),
    /// 64-bit float values
    Float64(Vec<f64>),
    /// Complex values as `[re, im]` pairs
    Complex32(Vec<[f32; 2]>),
    /// Complex values as `[re, im]` pairs
    Complex64(Vec<[f64; 2]>),
    /// Text elements
    Text(Vec<String>),
}

macro_rules! read_numeric {
    ($bytes:expr, $endian:expr, $count:expr, $ty:ty, $read_into:ident) => {{
        let mut values: Vec<$ty> = vec![Default::default(); $count];
        let mut cursor = Cursor::new($bytes);
        let result = match $endian {
            Endian::Little => cursor.$read_into::<LittleEndian>(&mut values),
            Endian::Big => cursor.$read_into::<BigEndian>(&mut values),
        };
        result.map_err(|e| DecodeError::InvalidLayout(format!("payload read failed: {e}")))?;
        values
    }};
}

impl WaveData {
    /// Decode `count` numeric elements of `ty` from `bytes`.
    ///
    /// `bytes` must hold at least `count` elements; extra bytes are ignored.
    pub(crate) fn decode_numeric(
        bytes: &[u8],
        ty: ElementType,
        count: usize,
        endian: Endian,
    ) -> Result<Self, DecodeError> {
        let size = ty
            .byte_size()
            .ok_or_else(|| DecodeError::InvalidLayout("text payload decoded as numeric".into()))?;
        let needed = size.checked_mul(count).ok_or_else(|| {
            DecodeError::InvalidLayout(format!("element count {count} overflows payload size"))
        })?;
        if bytes.len() < needed {
            return Err(DecodeError::Truncated {
                field: "wData",
                offset: 0,
                needed,
                available: bytes.len(),
            });
        }
        let bytes = &bytes[..needed];

        let data = match ty {
            ElementType::Int8 => WaveData::Int8(bytes.iter().map(|&b| b as i8).collect()),
            ElementType::UInt8 => WaveData::UInt8(bytes.to_vec()),
            ElementType::Int16 => WaveData::Int16(read_numeric!(bytes, endian, count, i16, read_i16_into)),
            ElementType::UInt16 => WaveData::UInt16(read_numeric!(bytes, endian, count, u16, read_u16_into)),
            ElementType::Int32 => WaveData::Int32(read_numeric!(bytes, endian, count, i32, read_i32_into)),
            ElementType::UInt32 => WaveData::UInt32(read_numeric!(bytes, endian, count, u32, read_u32_into)),
            ElementType::Int64 => WaveData::Int64(read_numeric!(bytes, endian, count, i64, read_i64_into)),
            ElementType::UInt64 => WaveData::UInt64(read_numeric!(bytes, endian, count, u64, read_u64_into)),
            ElementType::Float32 => WaveData::Float32(read_numeric!(bytes, endian, count, f32, read_f32_into)),
            ElementType::Float64 => WaveData::Float64(read_numeric!(bytes, endian, count, f64, read_f64_into)),
            ElementType::Complex32 => {
                let flat = read_numeric!(bytes, endian, count * 2, f32, read_f32_into);
                WaveData::Complex32(flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
            }
            ElementType::Complex64 => {
                let flat = read_numeric!(bytes, endian, count * 2, f64, read_f64_into);
                WaveData::Complex64(flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
            }
            ElementType::Text => unreachable!("text waves have no element size"),
        };
        Ok(data)
    }

    /// Split a text wave block using its end-offset index table
    pub(crate) fn decode_text(
        block: &[u8],
        index_table: &[u8],
        count: usize,
        endian: Endian,
    ) -> Result<Self, DecodeError> {
        if index_table.len() < count * 4 {
            return Err(DecodeError::InvalidLayout(format!(
                "text wave has {count} elements but only {} index bytes",
                index_table.len()
            )));
        }

        let mut strings = Vec::with_capacity(count);
        let mut start = 0usize;
        for word in index_table.chunks_exact(4).take(count) {
            let end = match endian {
                Endian::Little => LittleEndian::read_u32(word),
                Endian::Big => BigEndian::read_u32(word),
            } as usize;
            if end < start || end > block.len() {
                return Err(DecodeError::InvalidLayout(format!(
                    "text element offset {end} outside block of {} bytes",
                    block.len()
                )));
            }
            strings.push(String::from_utf8_lossy(&block[start..end]).into_owned());
            start = end;
        }
        Ok(WaveData::Text(strings))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            WaveData::Int8(v) => v.len(),
            WaveData::Int16(v) => v.len(),
            WaveData::Int32(v) => v.len(),
            WaveData::Int64(v) => v.len(),
            WaveData::UInt8(v) => v.len(),
            WaveData::UInt16(v) => v.len(),
            WaveData::UInt32(v) => v.len(),
            WaveData::UInt64(v) => v.len(),
            WaveData::Float32(v) => v.len(),
            WaveData::Float64(v) => v.len(),
            WaveData::Complex32(v) => v.len(),
            WaveData::Complex64(v) => v.len(),
            WaveData::Text(v) => v.len(),
        }
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the stored values
    pub fn element_type(&self) -> ElementType {
        match self {
            WaveData::Int8(_) => ElementType::Int8,
            WaveData::Int16(_) => ElementType::Int16,
            WaveData::Int32(_) => ElementType::Int32,
            WaveData::Int64(_) => ElementType::Int64,
            WaveData::UInt8(_) => ElementType::UInt8,
            WaveData::UInt16(_) => ElementType::UInt16,
            WaveData::UInt32(_) => ElementType::UInt32,
            WaveData::UInt64(_) => ElementType::UInt64,
            WaveData::Float32(_) => ElementType::Float32,
            WaveData::Float64(_) => ElementType::Float64,
            WaveData::Complex32(_) => ElementType::Complex32,
            WaveData::Complex64(_) => ElementType::Complex64,
            WaveData::Text(_) => ElementType::Text,
        }
    }

    /// Real values widened to f64, or `None` for complex and text payloads
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        let values = match self {
            WaveData::Int8(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::Int16(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::Int64(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::UInt8(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::UInt16(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::UInt32(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::UInt64(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            WaveData::Float64(v) => v.clone(),
            WaveData::Complex32(_) | WaveData::Complex64(_) | WaveData::Text(_) => return None,
        };
        Some(values)
    }
}

/// Number of elements described by `shape`, failing on overflow
pub(crate) fn element_count(shape: &[usize]) -> Result<usize, DecodeError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| {
            DecodeError::InvalidLayout(format!("dimension sizes {shape:?} overflow the element count"))
        })
}

/// A wave payload together with its populated dimension sizes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveArray {
    /// Populated dimension sizes, first dimension first
    pub shape: Vec<usize>,
    /// Values in column-major order
    pub data: WaveData,
}

impl WaveArray {
    /// Create an array, checking that the shape covers every element
    pub fn new(shape: Vec<usize>, data: WaveData) -> Result<Self, DecodeError> {
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(DecodeError::InvalidLayout(format!(
                "dimension sizes {shape:?} describe {expected} elements, payload has {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat column-major offset of a multi-dimensional index
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        let mut stride = 1;
        for (&i, &size) in index.iter().zip(&self.shape) {
            if i >= size {
                return None;
            }
            offset += i * stride;
            stride *= size;
        }
        Some(offset)
    }
}

impl From<Vec<f64>> for WaveArray {
    fn from(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            data: WaveData::Float64(values),
        }
    }
}
