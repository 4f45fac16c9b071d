//! Axis reconstruction from wave scaling.
//!
//! Igor does not store coordinate arrays for its dimensions. Each populated
//! dimension `d` carries a step `A[d]` and an offset `B[d]`, and element `i`
//! sits at `A[d] * i + B[d]`.

use crate::wave::WaveHeader;

/// Coordinates of dimension `dim`, or `None` if it is not populated
pub fn axis_coordinates(header: &WaveHeader, dim: usize) -> Option<Vec<f64>> {
    let count = header.dim_size(dim)?;
    let step = header.scale_a[dim];
    let offset = header.scale_b[dim];
    Some((0..count).map(|i| step * i as f64 + offset).collect())
}

/// Units of dimension `dim`, or `None` if it is not populated
pub fn axis_units(header: &WaveHeader, dim: usize) -> Option<&str> {
    header.dim_size(dim)?;
    Some(header.dim_units[dim].as_str())
}
