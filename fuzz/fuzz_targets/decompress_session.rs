#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zflow_decompress::{DecompressOptions, Decompressor};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    pieces: Vec<Vec<u8>>,
    caps: Vec<u16>,
}

// Fuzz target: Decompressor fed arbitrary pieces with arbitrary caps.
//
// Input format: a list of input pieces and a list of output caps
// (0 means unbounded). Each piece is fed once, then empty input is fed
// while the session still holds output, up to a fixed call budget.
//
// Asserts:
// - No call returns more than its cap
// - A session that asks for input holds no leftover input
fuzz_target!(|input: FuzzInput| {
    let Ok(session) = Decompressor::new(None, &DecompressOptions::default()) else {
        return;
    };
    let mut caps = input.caps.iter().cycle().map(|&c| usize::from(c));

    for piece in &input.pieces {
        let mut data: &[u8] = piece;
        for _ in 0..64 {
            let cap = caps.next().filter(|&c| c > 0);
            match session.decompress(data, cap) {
                Ok(out) => {
                    if let Some(cap) = cap {
                        assert!(out.len() <= cap);
                    }
                }
                Err(_) => {
                    assert!(session.needs_input());
                    assert_eq!(session.pending_input_len(), 0);
                    break;
                }
            }
            data = &[];
            if session.needs_input() {
                assert_eq!(session.pending_input_len(), 0);
                break;
            }
        }
    }
});
