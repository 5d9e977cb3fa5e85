//! Error messages and kinds as callers see them.
//!
//! Messages are pinned with inline snapshots; the bounds in them are the
//! engine's bounds on a 64-bit target.

use insta::assert_snapshot;
use zflow_compress::{CompressError, CompressOptions, Compressor, compress};
use zflow_decompress::{DecompressError, DecompressOptions, Decompressor, decompress};
use zflow_dict::{Dictionary, train_dictionary};
use zflow_engine::{CompressParameter, Directive, ErrorKind, frame_info};
use zflow_tests::{FaultyEngine, fox_text};

#[test]
fn out_of_bounds_compress_parameter() {
    let options = CompressOptions::builder()
        .set(CompressParameter::CompressionLevel, 3)
        .set(CompressParameter::ChecksumFlag, 5)
        .build();
    let err = Compressor::new(&options, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_snapshot!(
        err.to_string(),
        @r#"invalid zstd compress parameter "checksumFlag": should be 0 <= value <= 1, provided value is 5"#
    );
}

#[test]
fn unknown_compress_key_is_reported_by_position() {
    let options = CompressOptions::Parameters(vec![(9999, 1)]);
    let err = compress(b"data", &options, None).unwrap_err();
    assert_snapshot!(err.to_string(), @"compress parameter #1 (key 9999) is invalid");

    let options = CompressOptions::builder()
        .set(CompressParameter::CompressionLevel, 3)
        .set(CompressParameter::WindowLog, 20)
        .set_raw(-7, 0)
        .build();
    let err = compress(b"data", &options, None).unwrap_err();
    assert_snapshot!(err.to_string(), @"compress parameter #3 (key -7) is invalid");
}

#[test]
fn decompress_parameter_errors() {
    let err = Decompressor::new(None, &DecompressOptions::new().set_raw(4242, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_snapshot!(err.to_string(), @"decompress parameter #1 (key 4242) is invalid");

    let err = Decompressor::new(None, &DecompressOptions::new().window_log_max(5)).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @r#"invalid zstd decompress parameter "windowLogMax": should be 10 <= value <= 31, provided value is 5"#
    );
}

#[test]
fn invalid_dictionary_content() {
    let err = Dictionary::new(b"plain bytes, no magic".to_vec()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dictionary);
    assert_snapshot!(err.to_string(), @"not a valid zstd dictionary content");
}

#[test]
fn training_input_mismatch() {
    let err = train_dictionary(b"abcdef", &[2, 2], 1024).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().starts_with("invalid training input"), "{err}");
}

#[test]
fn truncated_frame() {
    let frame = compress(&fox_text(), &CompressOptions::Default, None).unwrap();
    let err = decompress(&frame[..frame.len() - 3], None, &DecompressOptions::default())
        .unwrap_err();
    assert!(matches!(err, DecompressError::Truncated));
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_snapshot!(
        err.to_string(),
        @"compressed data ended before the end-of-frame marker was reached"
    );
}

#[test]
fn bad_magic_is_a_codec_error() {
    let err = decompress(b"definitely not zstd", None, &DecompressOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(err.to_string().starts_with("zstd error: "), "{err}");
}

#[test]
fn directive_out_of_range() {
    let err = Directive::try_from(3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_snapshot!(
        err.to_string(),
        @"invalid end directive 3, expected 0 (continue), 1 (flush) or 2 (end)"
    );
    assert_eq!(Directive::try_from(2).unwrap(), Directive::End);
}

#[test]
fn frame_header_needs_a_frame() {
    let err = frame_info(b"zz").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_snapshot!(
        err.to_string(),
        @"cannot read frame header from 2 bytes: the buffer must start at a frame and be at least as long as the frame header"
    );
}

#[test]
fn compress_errors_keep_their_source_kind() {
    let err: CompressError = Compressor::new(&CompressOptions::Parameters(vec![(1, 1)]), None)
        .unwrap_err();
    assert!(matches!(err, CompressError::Engine(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn failed_compress_call_drops_the_unfinished_frame() {
    let engine = FaultyEngine::default();
    let c = Compressor::with_engine(engine.clone(), &CompressOptions::level(3), None).unwrap();
    let head = c.compress(b"start of a frame that never ends", Directive::Flush).unwrap();
    assert!(!head.is_empty());

    FaultyEngine::arm(&engine.faults.fail_next_compress_step);
    let err = c.compress(b"lost", Directive::Continue).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_eq!(FaultyEngine::count(&engine.faults.compress_session_resets), 1);

    // The next call opens a new frame with the session's options intact.
    let frame = c.compress(&fox_text(), Directive::End).unwrap();
    assert!(frame_info(&frame).is_ok());
    assert_eq!(decompress(&frame, None, &DecompressOptions::default()).unwrap(), fox_text());
    assert_eq!(c.level(), 3);
}

#[test]
fn failed_decompress_call_resets_the_session() {
    let options = CompressOptions::builder()
        .set(CompressParameter::ChecksumFlag, 1)
        .build();
    let frame = compress(&fox_text(), &options, None).unwrap();
    let mut bad = frame.clone();
    let last = bad.len() - 1;
    // Last byte of the checksum.
    bad[last] ^= 0xFF;

    let engine = FaultyEngine::default();
    let d = Decompressor::with_engine(engine.clone(), None, &DecompressOptions::default())
        .unwrap();
    let err = d.decompress(&bad, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_eq!(FaultyEngine::count(&engine.faults.decompress_session_resets), 1);
    assert_eq!(d.decompress(&frame, None).unwrap(), fox_text());
}
