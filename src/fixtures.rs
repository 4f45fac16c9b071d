//! Builders for synthetic wave and packed-experiment bytes used by tests.

use crate::wave::{Endian, MAX_DIMS};

enum Payload {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I16(Vec<i16>),
    Text(Vec<String>),
}

impl Payload {
    fn len(&self) -> usize {
        match self {
            Payload::F64(v) => v.len(),
            Payload::F32(v) => v.len(),
            Payload::I16(v) => v.len(),
            Payload::Text(v) => v.len(),
        }
    }

    fn type_code(&self) -> i16 {
        match self {
            Payload::F64(_) => 0x04,
            Payload::F32(_) => 0x02,
            Payload::I16(_) => 0x10,
            Payload::Text(_) => 0,
        }
    }
}

/// Little helper writing numbers in a fixed byte order
struct Writer {
    endian: Endian,
    buf: Vec<u8>,
}

impl Writer {
    fn new(endian: Endian) -> Self {
        Self { endian, buf: Vec::new() }
    }

    fn i16(&mut self, v: i16) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            Endian::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn u16(&mut self, v: u16) {
        self.i16(v as i16);
    }

    fn i32(&mut self, v: i32) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            Endian::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn u32(&mut self, v: u32) {
        self.i32(v as i32);
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn f64(&mut self, v: f64) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            Endian::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn fixed(&mut self, text: &[u8], width: usize) {
        let mut field = vec![0u8; width];
        let n = text.len().min(width);
        field[..n].copy_from_slice(&text[..n]);
        self.buf.extend_from_slice(&field);
    }

    fn pad_to(&mut self, len: usize) {
        self.buf.resize(len, 0);
    }

    fn payload(&mut self, payload: &Payload) {
        match payload {
            Payload::F64(v) => v.iter().for_each(|&x| self.f64(x)),
            Payload::F32(v) => v.iter().for_each(|&x| self.f32(x)),
            Payload::I16(v) => v.iter().for_each(|&x| self.i16(x)),
            Payload::Text(v) => v.iter().for_each(|s| self.buf.extend_from_slice(s.as_bytes())),
        }
    }

    /// Store the value that makes the header words sum to zero
    fn seal_checksum(&mut self, checksum_offset: usize, len: usize) {
        let sum = crate::wave::word_checksum(&self.buf[..len], self.endian);
        let fix = 0u16.wrapping_sub(sum);
        let bytes = match self.endian {
            Endian::Little => fix.to_le_bytes(),
            Endian::Big => fix.to_be_bytes(),
        };
        self.buf[checksum_offset..checksum_offset + 2].copy_from_slice(&bytes);
    }
}

/// Builder for single-wave containers (versions 2 and 5)
pub(crate) struct WaveBuilder {
    version: i16,
    endian: Endian,
    name: String,
    payload: Payload,
    dim_sizes: Option<[i32; MAX_DIMS]>,
    scale_a: [f64; MAX_DIMS],
    scale_b: [f64; MAX_DIMS],
    dim_units: [String; MAX_DIMS],
    extended_dim_units: [Option<String>; MAX_DIMS],
    data_units: String,
    extended_data_units: Option<String>,
    note: Vec<u8>,
    formula: Vec<u8>,
    dim_labels: [Vec<String>; MAX_DIMS],
    creation_date: u32,
}

impl WaveBuilder {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            version: 5,
            endian: Endian::Little,
            name: name.to_string(),
            payload: Payload::F64(Vec::new()),
            dim_sizes: None,
            scale_a: [1.0; MAX_DIMS],
            scale_b: [0.0; MAX_DIMS],
            dim_units: Default::default(),
            extended_dim_units: Default::default(),
            data_units: String::new(),
            extended_data_units: None,
            note: Vec::new(),
            formula: Vec::new(),
            dim_labels: Default::default(),
            creation_date: 0,
        }
    }

    pub(crate) fn version(mut self, version: i16) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn big_endian(mut self) -> Self {
        self.endian = Endian::Big;
        self
    }

    pub(crate) fn f64_data(mut self, values: &[f64]) -> Self {
        self.payload = Payload::F64(values.to_vec());
        self
    }

    pub(crate) fn f32_data(mut self, values: &[f32]) -> Self {
        self.payload = Payload::F32(values.to_vec());
        self
    }

    pub(crate) fn i16_data(mut self, values: &[i16]) -> Self {
        self.payload = Payload::I16(values.to_vec());
        self
    }

    pub(crate) fn text_data(mut self, values: &[&str]) -> Self {
        self.payload = Payload::Text(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Dimension sizes; defaults to one dimension covering the payload
    pub(crate) fn dims(mut self, sizes: [i32; MAX_DIMS]) -> Self {
        self.dim_sizes = Some(sizes);
        self
    }

    pub(crate) fn scale(mut self, dim: usize, a: f64, b: f64) -> Self {
        self.scale_a[dim] = a;
        self.scale_b[dim] = b;
        self
    }

    pub(crate) fn dim_units(mut self, dim: usize, units: &str) -> Self {
        self.dim_units[dim] = units.to_string();
        self
    }

    pub(crate) fn extended_dim_units(mut self, dim: usize, units: &str) -> Self {
        self.extended_dim_units[dim] = Some(units.to_string());
        self
    }

    pub(crate) fn data_units(mut self, units: &str) -> Self {
        self.data_units = units.to_string();
        self
    }

    pub(crate) fn extended_data_units(mut self, units: &str) -> Self {
        self.extended_data_units = Some(units.to_string());
        self
    }

    pub(crate) fn note(mut self, note: &str) -> Self {
        self.note = note.as_bytes().to_vec();
        self
    }

    /// Dependency formula (v5 only)
    pub(crate) fn formula(mut self, formula: &str) -> Self {
        self.formula = formula.as_bytes().to_vec();
        self
    }

    /// Labels of one dimension, dimension label first (v5 only)
    pub(crate) fn dim_labels(mut self, dim: usize, labels: &[&str]) -> Self {
        self.dim_labels[dim] = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn creation_date(mut self, seconds: u32) -> Self {
        self.creation_date = seconds;
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        match self.version {
            5 => self.build_v5(),
            _ => self.build_v2(),
        }
    }

    fn payload_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new(self.endian);
        w.payload(&self.payload);
        w.buf
    }

    fn build_v5(self) -> Vec<u8> {
        let npnts = self.payload.len();
        let dim_sizes = self.dim_sizes.unwrap_or([npnts as i32, 0, 0, 0]);
        let data = self.payload_bytes();
        let data_e_units = self.extended_data_units.clone().unwrap_or_default();
        let s_indices: Vec<u32> = match &self.payload {
            Payload::Text(strings) => strings
                .iter()
                .scan(0u32, |end, s| {
                    *end += s.len() as u32;
                    Some(*end)
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut w = Writer::new(self.endian);
        w.i16(5);
        w.i16(0);
        w.i32(320 + data.len() as i32);
        w.i32(self.formula.len() as i32);
        w.i32(self.note.len() as i32);
        w.i32(data_e_units.len() as i32);
        for units in &self.extended_dim_units {
            w.i32(units.as_ref().map_or(0, |u| u.len() as i32));
        }
        for labels in &self.dim_labels {
            w.i32(labels.len() as i32 * 32);
        }
        w.i32(s_indices.len() as i32 * 4);
        w.i32(0);
        w.i32(0);
        assert_eq!(w.buf.len(), 64);

        w.i32(0);
        w.u32(self.creation_date);
        w.u32(self.creation_date);
        w.i32(npnts as i32);
        w.i16(self.payload.type_code());
        w.i16(0);
        w.fixed(b"", 6);
        w.i16(1);
        w.fixed(self.name.as_bytes(), 32);
        w.i32(0);
        w.i32(0);
        for size in dim_sizes {
            w.i32(size);
        }
        for a in self.scale_a {
            w.f64(a);
        }
        for b in self.scale_b {
            w.f64(b);
        }
        w.fixed(self.data_units.as_bytes(), 4);
        for units in &self.dim_units {
            w.fixed(units.as_bytes(), 4);
        }
        w.pad_to(384);

        w.buf.extend_from_slice(&data);
        w.buf.extend_from_slice(&self.formula);
        w.buf.extend_from_slice(&self.note);
        w.buf.extend_from_slice(data_e_units.as_bytes());
        for units in self.extended_dim_units.iter().flatten() {
            w.buf.extend_from_slice(units.as_bytes());
        }
        for label in self.dim_labels.iter().flatten() {
            w.fixed(label.as_bytes(), 32);
        }
        for end in s_indices {
            w.u32(end);
        }

        w.seal_checksum(2, 384);
        w.buf
    }

    fn build_v2(self) -> Vec<u8> {
        let npnts = self.payload.len();
        let data = self.payload_bytes();

        let mut w = Writer::new(self.endian);
        w.i16(self.version);
        w.i32(110 + data.len() as i32 + 16);
        w.i32(self.note.len() as i32);
        w.i32(0);
        w.i16(0);
        assert_eq!(w.buf.len(), 16);

        w.i16(self.payload.type_code());
        w.i32(0);
        w.fixed(self.name.as_bytes(), 20);
        w.i16(1);
        w.i16(0);
        w.i32(0);
        w.fixed(self.data_units.as_bytes(), 4);
        w.fixed(self.dim_units[0].as_bytes(), 4);
        w.i32(npnts as i32);
        w.i16(0);
        w.f64(self.scale_a[0]);
        w.f64(self.scale_b[0]);
        w.pad_to(16 + 96);
        w.u32(self.creation_date);
        w.u16(0);
        w.u32(self.creation_date);
        w.pad_to(16 + 110);

        w.buf.extend_from_slice(&data);
        w.buf.extend_from_slice(&[0u8; 16]);
        w.buf.extend_from_slice(&self.note);

        w.seal_checksum(14, 16 + 126);
        w.buf
    }
}

/// Builder for packed experiment record streams
pub(crate) struct ArchiveBuilder {
    writer: Writer,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Endian::Little),
        }
    }

    pub(crate) fn big_endian() -> Self {
        Self {
            writer: Writer::new(Endian::Big),
        }
    }

    pub(crate) fn record(self, record_type: u16, body: &[u8]) -> Self {
        self.versioned_record(record_type, 1, body)
    }

    pub(crate) fn versioned_record(mut self, record_type: u16, version: i16, body: &[u8]) -> Self {
        self.writer.u16(record_type);
        self.writer.i16(version);
        self.writer.i32(body.len() as i32);
        self.writer.buf.extend_from_slice(body);
        self
    }

    pub(crate) fn folder_start(self, name: &str) -> Self {
        let mut body = [0u8; 32];
        body[..name.len()].copy_from_slice(name.as_bytes());
        self.record(9, &body)
    }

    pub(crate) fn folder_end(self) -> Self {
        self.record(10, &[])
    }

    pub(crate) fn wave(self, wave: Vec<u8>) -> Self {
        self.record(3, &wave)
    }

    pub(crate) fn build(self) -> Vec<u8> {
        self.writer.buf
    }
}
