#![no_main]

use libfuzzer_sys::fuzz_target;
use igornx::archive::{decode_archive, ArchiveOptions, RecordPolicy};

fuzz_target!(|data: &[u8]| {
    let options = ArchiveOptions {
        unknown_records: RecordPolicy::Skip,
    };
    if let Ok(tree) = decode_archive(data, &options) {
        let _ = tree.wave_count();
        let _ = tree.resolve("root/a/b");
    }
});
