#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: frame header and frame size queries.
//
// Catches bugs in:
// - Short or truncated headers
// - Skippable frame handling
// - Sentinel content sizes
fuzz_target!(|data: &[u8]| {
    let _ = zflow_engine::frame_info(data);
    if let Ok(size) = zflow_engine::frame_size(data) {
        assert!(size <= data.len());
    }
});
