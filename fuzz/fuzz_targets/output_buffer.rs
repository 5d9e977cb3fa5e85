#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zflow_engine::OutputBuffer;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    max_length: Option<u32>,
    writes: Vec<u16>,
}

// Fuzz target: OutputBuffer growth and finish.
//
// Each write fills up to the given number of bytes, growing the buffer
// whenever the current chunk is full.
//
// Asserts:
// - The cap is never exceeded
// - finish() returns exactly the bytes written, in order
fuzz_target!(|input: FuzzInput| {
    let max_length = input.max_length.map(|m| (m % (1 << 22)) as usize);
    let Ok(mut buf) = OutputBuffer::new(max_length) else {
        return;
    };

    let mut expected = Vec::new();
    for (i, &want) in input.writes.iter().enumerate() {
        if buf.is_full() {
            if buf.is_at_limit() {
                break;
            }
            buf.grow().unwrap();
        }
        let spare = buf.spare_mut();
        let n = usize::from(want).min(spare.len());
        let byte = i as u8;
        spare[..n].fill(byte);
        buf.advance(n);
        expected.extend(std::iter::repeat(byte).take(n));

        if let Some(max) = max_length {
            assert!(buf.allocated() <= max);
        }
    }

    assert_eq!(buf.len(), expected.len());
    assert_eq!(buf.finish().unwrap(), expected);
});
