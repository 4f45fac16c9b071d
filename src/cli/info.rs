use anyhow::{Context, Result};
use std::path::PathBuf;

use igornx::axis::axis_coordinates;
use igornx::wave::WaveRecord;

/// Display header and note of a binary wave
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let bytes = std::fs::read(&file).context("Failed to read file")?;
    let wave = WaveRecord::from_bytes(&bytes).context("Failed to decode binary wave")?;
    let header = &wave.header;

    println!("Igor Binary Wave Information");
    println!("============================");
    println!("File: {}", file.display());
    println!();

    println!("Header:");
    println!("  Name: {}", header.name_lossy());
    println!("  Version: {}", header.version);
    println!("  Byte order: {:?}", header.byte_order);
    println!("  Element type: {:?}", header.element_type);
    println!("  Points: {}", header.num_points);
    println!("  Data units: {:?}", wave.data_units);
    if let Some(created) = header.created() {
        println!("  Created: {created}");
    }
    if let Some(modified) = header.modified() {
        println!("  Modified: {modified}");
    }
    if let Some(formula) = &wave.formula {
        println!("  Formula: {formula}");
    }
    println!();

    println!("Dimensions:");
    for dim in header.populated_dims() {
        let count = header.dim_size(dim).unwrap_or(0);
        let range = axis_coordinates(header, dim)
            .and_then(|axis| Some((*axis.first()?, *axis.last()?)))
            .map(|(first, last)| format!("{first} .. {last}"))
            .unwrap_or_default();
        println!(
            "  {dim}: {count} points, A={} B={}, units {:?}, {range}",
            header.scale_a[dim], header.scale_b[dim], header.dim_units[dim]
        );
        if let Some(label) = wave.dim_labels[dim].first().filter(|label| !label.is_empty()) {
            println!("     label: {label}");
        }
    }
    println!();

    let notes = wave.notes();
    if !notes.is_empty() {
        println!("Note ({} keys):", notes.len());
        for (key, value) in &notes {
            println!("  {key} = {value}");
        }
    }

    Ok(())
}
