#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must either succeed or fail with an error, never panic
    if let Ok(wave) = igornx::wave::WaveRecord::from_bytes(data) {
        let _ = wave.notes();
        for dim in wave.header.populated_dims() {
            let _ = igornx::axis::axis_coordinates(&wave.header, dim);
        }
    }
});
