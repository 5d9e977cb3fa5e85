#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zflow_compress::{CompressOptions, Compressor};
use zflow_decompress::{decompress, DecompressOptions};
use zflow_engine::Directive;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    level: i8,
    pieces: Vec<Vec<u8>>,
    flush_between: bool,
}

// Fuzz target: Compressor -> decompress roundtrip.
//
// Feeds the pieces with the continue directive (optionally flushing after
// each), ends the frame, and asserts the decoded output is the
// concatenation of the pieces.
fuzz_target!(|input: FuzzInput| {
    let options = CompressOptions::level(i32::from(input.level));
    let session = Compressor::new(&options, None).unwrap();

    let mut frame = Vec::new();
    for piece in &input.pieces {
        frame.extend(session.compress(piece, Directive::Continue).unwrap());
        if input.flush_between {
            frame.extend(session.flush(false).unwrap());
        }
    }
    frame.extend(session.flush(true).unwrap());

    let decoded = decompress(&frame, None, &DecompressOptions::default()).unwrap();
    assert_eq!(decoded, input.pieces.concat());
});
