use super::*;
use crate::fixtures::{ArchiveBuilder, WaveBuilder};

fn wave(name: &str, values: &[f64]) -> Vec<u8> {
    WaveBuilder::new(name).f64_data(values).build()
}

fn sample_archive() -> Vec<u8> {
    ArchiveBuilder::new()
        .record(1, &[0u8; 12])
        .wave(wave("top", &[1.0]))
        .folder_start("scan")
        .wave(wave("spectrum", &[1.0, 2.0, 3.0]))
        .folder_start("axes")
        .wave(wave("energy", &[10.0, 20.0, 30.0]))
        .folder_end()
        .folder_end()
        .record(2, b"history text")
        .build()
}

#[test]
fn test_decode_nested_folders() {
    let tree = ArchiveTree::from_bytes(&sample_archive()).unwrap();

    assert_eq!(tree.wave_count(), 3);
    let root = tree.top().get(&ObjectName::text("root")).unwrap().as_folder().unwrap();
    assert_eq!(root.len(), 2);
    let scan = root.get(&ObjectName::bytes("scan")).unwrap().as_folder().unwrap();
    assert!(scan.get(&ObjectName::bytes("spectrum")).unwrap().as_wave().is_some());
}

#[test]
fn test_resolve_paths() {
    let tree = ArchiveTree::from_bytes(&sample_archive()).unwrap();

    let spectrum = tree.resolve_wave("root/scan/spectrum").unwrap();
    assert_eq!(spectrum.data.len(), 3);
    let energy = tree.resolve_wave("root/scan/axes/energy").unwrap();
    assert_eq!(energy.data.data.to_f64().unwrap(), vec![10.0, 20.0, 30.0]);
    assert!(tree.resolve_wave("/root/top/").is_some());

    assert!(tree.resolve("root/scan/missing").is_none());
    assert!(tree.resolve("root/nothing/spectrum").is_none());
    assert!(tree.resolve("root/top/deeper").is_none());
    assert!(tree.resolve("").is_none());
    // A folder is not a wave
    assert!(tree.resolve("root/scan").is_some());
    assert!(tree.resolve_wave("root/scan").is_none());
}

#[test]
fn test_resolve_byte_key_with_text_path() {
    let wave = WaveRecord::from_bytes(&wave("wave0", &[4.0])).unwrap();
    let mut top = Folder::new();
    top.insert(ObjectName::bytes(b"wave0".to_vec()), ArchiveNode::Wave(Box::new(wave)));
    let tree = ArchiveTree::from_top(top);

    assert!(tree.resolve_wave("wave0").is_some());
}

#[test]
fn test_text_key_preferred_over_byte_key() {
    let text_wave = WaveRecord::from_bytes(&wave("a", &[1.0])).unwrap();
    let byte_wave = WaveRecord::from_bytes(&wave("a", &[2.0, 2.0])).unwrap();
    let mut top = Folder::new();
    top.insert(ObjectName::text("a"), ArchiveNode::Wave(Box::new(text_wave)));
    top.insert(ObjectName::bytes("a"), ArchiveNode::Wave(Box::new(byte_wave)));
    let tree = ArchiveTree::from_top(top);

    assert_eq!(tree.resolve_wave("a").unwrap().data.len(), 1);
}

#[test]
fn test_big_endian_record_stream() {
    let bytes = ArchiveBuilder::big_endian()
        .folder_start("data")
        .wave(WaveBuilder::new("w").big_endian().f64_data(&[5.0, 6.0]).build())
        .folder_end()
        .build();
    let tree = ArchiveTree::from_bytes(&bytes).unwrap();
    let wave = tree.resolve_wave("root/data/w").unwrap();
    assert_eq!(wave.data.data.to_f64().unwrap(), vec![5.0, 6.0]);
}

#[test]
fn test_first_record_fixes_byte_order_even_with_zero_version() {
    let bytes = ArchiveBuilder::big_endian()
        .versioned_record(2, 0, b"history text")
        .folder_start("data")
        .wave(WaveBuilder::new("w").big_endian().f64_data(&[7.0]).build())
        .folder_end()
        .build();
    let tree = ArchiveTree::from_bytes(&bytes).unwrap();
    let wave = tree.resolve_wave("root/data/w").unwrap();
    assert_eq!(wave.data.data.to_f64().unwrap(), vec![7.0]);
}

#[test]
fn test_unknown_record_fails_by_default() {
    let bytes = ArchiveBuilder::new()
        .wave(wave("kept", &[1.0]))
        .record(42, &[1, 2, 3])
        .build();
    match ArchiveTree::from_bytes(&bytes) {
        Err(ArchiveError::UnsupportedRecord { record_type, offset }) => {
            assert_eq!(record_type, 42);
            assert!(offset > 0);
        }
        other => panic!("expected unsupported record, got {other:?}"),
    }
}

#[test]
fn test_unknown_record_skipped_by_policy() {
    let bytes = ArchiveBuilder::new()
        .record(42, &[1, 2, 3])
        .wave(wave("kept", &[1.0]))
        .build();
    let options = ArchiveOptions {
        unknown_records: RecordPolicy::Skip,
    };
    let tree = decode_archive(&bytes, &options).unwrap();
    assert!(tree.resolve_wave("root/kept").is_some());
}

#[test]
fn test_superseded_records_ignored() {
    let bytes = ArchiveBuilder::new()
        .record(0x8000 | 3, &wave("old", &[1.0]))
        .record(0x8000 | 42, &[0])
        .wave(wave("new", &[2.0]))
        .build();
    let tree = ArchiveTree::from_bytes(&bytes).unwrap();
    assert!(tree.resolve_wave("root/old").is_none());
    assert!(tree.resolve_wave("root/new").is_some());
}

#[test]
fn test_unbalanced_folder_end() {
    let bytes = ArchiveBuilder::new().folder_end().build();
    assert!(matches!(
        ArchiveTree::from_bytes(&bytes),
        Err(ArchiveError::UnbalancedFolder { offset: 0 })
    ));
}

#[test]
fn test_unclosed_folder_is_kept() {
    let bytes = ArchiveBuilder::new()
        .folder_start("open")
        .wave(wave("w", &[1.0]))
        .build();
    let tree = ArchiveTree::from_bytes(&bytes).unwrap();
    assert!(tree.resolve_wave("root/open/w").is_some());
}

#[test]
fn test_truncated_record_body() {
    let mut bytes = sample_archive();
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(
        ArchiveTree::from_bytes(&bytes),
        Err(ArchiveError::TruncatedRecord { .. })
    ));
}

#[test]
fn test_corrupt_embedded_wave() {
    let mut broken = wave("broken", &[1.0]);
    broken[90] ^= 0xff;
    let bytes = ArchiveBuilder::new().wave(broken).build();
    assert!(matches!(
        ArchiveTree::from_bytes(&bytes),
        Err(ArchiveError::InvalidWave { offset: 0, .. })
    ));
}
