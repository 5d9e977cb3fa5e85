//! Dictionary training, the shared handle cache and dictionary sessions.
//!
//! The build-once guarantee is checked with a counting engine that wraps
//! the zstd engine, slows its handle builds down and counts them while
//! many threads race for the same handle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use zflow_compress::{CompressOptions, Compressor, compress};
use zflow_decompress::{DecompressOptions, Decompressor, decompress};
use zflow_dict::{DictError, Dictionary, train_dictionary, train_from_samples};
use zflow_engine::{
    Bounds, CodecEngine, CompressParameter, DecompressParameter, Directive, EngineError,
    ErrorKind, StepOutcome, ZstdEngine, frame_info,
};
use zflow_tests::{FaultyEngine, log_record, log_samples};

fn trained_dictionary() -> Dictionary {
    let content = train_from_samples(log_samples(50), 4096).expect("training should succeed");
    assert!(content.len() <= 4096);
    Dictionary::new(content).expect("trained content is a dictionary")
}

// ── Training and end-to-end ───────────────────────────────────────────────────

#[test]
fn trained_dictionary_shrinks_a_held_out_sample() {
    let dict = Arc::new(trained_dictionary());
    let held_out = log_record(977);

    let options = CompressOptions::level(5);
    let with_dict = compress(&held_out, &options, Some(Arc::clone(&dict))).unwrap();
    let without = compress(&held_out, &options, None).unwrap();
    assert!(
        with_dict.len() < without.len(),
        "dictionary frame {} bytes, plain frame {} bytes",
        with_dict.len(),
        without.len()
    );

    let out = decompress(&with_dict, Some(Arc::clone(&dict)), &DecompressOptions::default())
        .unwrap();
    assert_eq!(out, held_out);

    assert_eq!(frame_info(&with_dict).unwrap().dict_id, dict.dict_id());
    assert_eq!(dict.cached_levels(), vec![5]);
    assert!(dict.has_decompression_handle());
}

#[test]
fn concatenated_corpus_trains_like_samples() {
    let samples = log_samples(50);
    let sizes: Vec<usize> = samples.iter().map(Vec::len).collect();
    let corpus = samples.concat();
    let a = train_dictionary(&corpus, &sizes, 4096).unwrap();
    let b = train_from_samples(&samples, 4096).unwrap();
    assert_eq!(a, b);
}

#[test]
fn dictionary_frames_need_the_dictionary() {
    let dict = Arc::new(trained_dictionary());
    let frame = compress(&log_record(3), &CompressOptions::Default, Some(dict)).unwrap();
    let err = decompress(&frame, None, &DecompressOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
}

#[test]
fn corrupted_header_is_never_a_dictionary() {
    let mut content = trained_dictionary().content().to_vec();
    content[0] ^= 0xFF;
    let err = Dictionary::new(content).unwrap_err();
    assert!(matches!(err, DictError::InvalidDictionary));
    assert_eq!(err.kind(), ErrorKind::Dictionary);
}

#[test]
fn display_shows_id_and_size() {
    let dict = trained_dictionary();
    assert_eq!(
        dict.to_string(),
        format!("<ZstdDict dict_id={} dict_size={}>", dict.dict_id(), dict.len())
    );
}

#[test]
fn reinitialize_swaps_the_dictionary() {
    let dict = Arc::new(trained_dictionary());
    let c = Compressor::new(&CompressOptions::level(3), Some(Arc::clone(&dict))).unwrap();
    assert_eq!(c.dictionary().map(|d| d.dict_id()), Some(dict.dict_id()));

    c.reinitialize(&CompressOptions::level(3), None).unwrap();
    assert!(c.dictionary().is_none());
    let frame = c.compress(&log_record(1), Directive::End).unwrap();
    assert_eq!(frame_info(&frame).unwrap().dict_id, 0);
}

#[test]
fn sessions_on_many_threads_share_one_dictionary() {
    let dict = Arc::new(trained_dictionary());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || {
                let level = if t % 2 == 0 { 3 } else { 9 };
                let c = Compressor::new(&CompressOptions::level(level), Some(Arc::clone(&dict)))
                    .unwrap();
                let d = Decompressor::new(Some(dict), &DecompressOptions::default()).unwrap();
                for i in 0..20 {
                    let record = log_record(t * 100 + i);
                    let frame = c.compress(&record, Directive::End).unwrap();
                    assert_eq!(d.decompress(&frame, None).unwrap(), record);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(dict.cached_levels(), vec![3, 9]);
}

// ── Build-once cache ──────────────────────────────────────────────────────────

/// Delegates to [`ZstdEngine`], counting and slowing down handle builds.
#[derive(Clone, Default)]
struct CountingEngine {
    compress_builds: Arc<AtomicUsize>,
    decompress_builds: Arc<AtomicUsize>,
}

impl CodecEngine for CountingEngine {
    type CompressContext = <ZstdEngine as CodecEngine>::CompressContext;
    type DecompressContext = <ZstdEngine as CodecEngine>::DecompressContext;
    type CompressDict = <ZstdEngine as CodecEngine>::CompressDict;
    type DecompressDict = <ZstdEngine as CodecEngine>::DecompressDict;

    fn create_compress_context(&self) -> Result<Self::CompressContext, EngineError> {
        ZstdEngine.create_compress_context()
    }

    fn create_decompress_context(&self) -> Result<Self::DecompressContext, EngineError> {
        ZstdEngine.create_decompress_context()
    }

    fn reset_compress_context(&self, ctx: &mut Self::CompressContext) -> Result<(), EngineError> {
        ZstdEngine.reset_compress_context(ctx)
    }

    fn reset_decompress_context(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError> {
        ZstdEngine.reset_decompress_context(ctx)
    }

    fn reset_compress_session(&self, ctx: &mut Self::CompressContext) -> Result<(), EngineError> {
        ZstdEngine.reset_compress_session(ctx)
    }

    fn reset_decompress_session(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError> {
        ZstdEngine.reset_decompress_session(ctx)
    }

    fn set_compress_parameter(
        &self,
        ctx: &mut Self::CompressContext,
        param: CompressParameter,
        value: i32,
    ) -> Result<(), EngineError> {
        ZstdEngine.set_compress_parameter(ctx, param, value)
    }

    fn set_decompress_parameter(
        &self,
        ctx: &mut Self::DecompressContext,
        param: DecompressParameter,
        value: i32,
    ) -> Result<(), EngineError> {
        ZstdEngine.set_decompress_parameter(ctx, param, value)
    }

    fn compress_parameter_bounds(&self, param: CompressParameter) -> Result<Bounds, EngineError> {
        ZstdEngine.compress_parameter_bounds(param)
    }

    fn decompress_parameter_bounds(
        &self,
        param: DecompressParameter,
    ) -> Result<Bounds, EngineError> {
        ZstdEngine.decompress_parameter_bounds(param)
    }

    fn build_compress_dict(
        &self,
        content: &[u8],
        level: i32,
    ) -> Result<Self::CompressDict, EngineError> {
        self.compress_builds.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        ZstdEngine.build_compress_dict(content, level)
    }

    fn build_decompress_dict(&self, content: &[u8]) -> Result<Self::DecompressDict, EngineError> {
        self.decompress_builds.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        ZstdEngine.build_decompress_dict(content)
    }

    fn attach_compress_dict(
        &self,
        ctx: &mut Self::CompressContext,
        dict: &Self::CompressDict,
    ) -> Result<(), EngineError> {
        ZstdEngine.attach_compress_dict(ctx, dict)
    }

    fn attach_decompress_dict(
        &self,
        ctx: &mut Self::DecompressContext,
        dict: &Self::DecompressDict,
    ) -> Result<(), EngineError> {
        ZstdEngine.attach_decompress_dict(ctx, dict)
    }

    fn compress_step(
        &self,
        ctx: &mut Self::CompressContext,
        output: &mut [u8],
        input: &[u8],
        directive: Directive,
    ) -> Result<StepOutcome, EngineError> {
        ZstdEngine.compress_step(ctx, output, input, directive)
    }

    fn decompress_step(
        &self,
        ctx: &mut Self::DecompressContext,
        output: &mut [u8],
        input: &[u8],
    ) -> Result<StepOutcome, EngineError> {
        ZstdEngine.decompress_step(ctx, output, input)
    }

    fn level_bounds(&self) -> (i32, i32) {
        ZstdEngine.level_bounds()
    }

    fn dictionary_id(&self, content: &[u8]) -> u32 {
        ZstdEngine.dictionary_id(content)
    }

    fn train_dictionary(
        &self,
        corpus: &[u8],
        chunk_sizes: &[usize],
        dict_size: usize,
    ) -> Result<Vec<u8>, EngineError> {
        ZstdEngine.train_dictionary(corpus, chunk_sizes, dict_size)
    }
}

fn counting_dictionary() -> (Arc<Dictionary<CountingEngine>>, CountingEngine) {
    let engine = CountingEngine::default();
    let content = trained_dictionary().content().to_vec();
    let dict = Dictionary::with_engine(content, engine.clone()).unwrap();
    (Arc::new(dict), engine)
}

#[test]
fn concurrent_requests_build_each_level_once() {
    let (dict, engine) = counting_dictionary();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let dict = Arc::clone(&dict);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                dict.compression_handle(5).unwrap()
            })
        })
        .collect();
    let built: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(engine.compress_builds.load(Ordering::SeqCst), 1);
    assert!(built.iter().all(|h| Arc::ptr_eq(h, &built[0])));

    dict.compression_handle(7).unwrap();
    dict.compression_handle(5).unwrap();
    assert_eq!(engine.compress_builds.load(Ordering::SeqCst), 2);
    assert_eq!(dict.cached_levels(), vec![5, 7]);
}

#[test]
fn concurrent_decompressors_build_the_handle_once() {
    let (dict, engine) = counting_dictionary();
    let frame = {
        let c = Compressor::with_engine(
            engine.clone(),
            &CompressOptions::level(4),
            Some(Arc::clone(&dict)),
        )
        .unwrap();
        c.compress(&log_record(42), Directive::End).unwrap()
    };

    let threads = 12;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let dict = Arc::clone(&dict);
            let barrier = Arc::clone(&barrier);
            let engine = engine.clone();
            let frame = frame.clone();
            thread::spawn(move || {
                barrier.wait();
                let d = Decompressor::with_engine(engine, Some(dict), &DecompressOptions::default())
                    .unwrap();
                d.decompress(&frame, None).unwrap()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), log_record(42));
    }
    assert_eq!(engine.decompress_builds.load(Ordering::SeqCst), 1);
}

#[test]
fn different_levels_build_in_parallel() {
    let (dict, engine) = counting_dictionary();
    let handles: Vec<_> = (1..=4)
        .map(|level| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || dict.compression_handle(level).map(|_| ()))
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }
    assert_eq!(engine.compress_builds.load(Ordering::SeqCst), 4);
    assert_eq!(dict.cached_levels(), vec![1, 2, 3, 4]);
    // The dictionary reports builds through the engine it owns.
    assert_eq!(dict.engine().compress_builds.load(Ordering::SeqCst), 4);
}

// ── Failed builds ─────────────────────────────────────────────────────────────

fn faulty_dictionary() -> (Arc<Dictionary<FaultyEngine>>, FaultyEngine) {
    let engine = FaultyEngine::default();
    let content = trained_dictionary().content().to_vec();
    let dict = Dictionary::with_engine(content, engine.clone()).unwrap();
    (Arc::new(dict), engine)
}

#[test]
fn failed_compression_build_is_not_cached() {
    let (dict, engine) = faulty_dictionary();
    FaultyEngine::arm(&engine.faults.fail_next_compress_dict);

    let err = dict.compression_handle(6).unwrap_err();
    assert!(matches!(err, DictError::Engine(_)));
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(dict.cached_levels().is_empty());

    let first = dict.compression_handle(6).unwrap();
    let again = dict.compression_handle(6).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(dict.cached_levels(), vec![6]);
    // One failed attempt, then exactly one successful build.
    assert_eq!(FaultyEngine::count(&engine.faults.compress_dict_attempts), 2);
}

#[test]
fn failed_decompression_build_is_not_cached() {
    let (dict, engine) = faulty_dictionary();
    FaultyEngine::arm(&engine.faults.fail_next_decompress_dict);

    let err = dict
        .decompression_handle()
        .err()
        .expect("decompression handle build should fail");
    assert!(matches!(err, DictError::Engine(_)));
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(!dict.has_decompression_handle());

    dict.decompression_handle().unwrap();
    dict.decompression_handle().unwrap();
    assert!(dict.has_decompression_handle());
    assert_eq!(FaultyEngine::count(&engine.faults.decompress_dict_attempts), 2);
}

#[test]
fn session_surfaces_a_failed_build_and_retries_on_reinitialize() {
    let (dict, engine) = faulty_dictionary();
    FaultyEngine::arm(&engine.faults.fail_next_compress_dict);
    let c = Compressor::with_engine(engine.clone(), &CompressOptions::level(3), None).unwrap();

    let err = c
        .reinitialize(&CompressOptions::level(3), Some(Arc::clone(&dict)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(c.dictionary().is_none());

    c.reinitialize(&CompressOptions::level(3), Some(Arc::clone(&dict)))
        .unwrap();
    let frame = c.compress(&log_record(8), Directive::End).unwrap();
    assert_eq!(frame_info(&frame).unwrap().dict_id, dict.dict_id());
}

// ── Rejected reinitialisation ─────────────────────────────────────────────────

#[test]
fn rejected_compress_options_keep_the_dictionary() {
    let dict = Arc::new(trained_dictionary());
    let c = Compressor::new(&CompressOptions::level(5), Some(Arc::clone(&dict))).unwrap();

    let bad = CompressOptions::Parameters(vec![(101, 20), (9999, 1)]);
    let err = c.reinitialize(&bad, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(c.dictionary().map(|d| d.dict_id()), Some(dict.dict_id()));
    assert_eq!(c.level(), 5);
    let record = log_record(31);
    let frame = c.compress(&record, Directive::End).unwrap();
    assert_eq!(frame_info(&frame).unwrap().dict_id, dict.dict_id());
    let out = decompress(&frame, Some(dict), &DecompressOptions::default()).unwrap();
    assert_eq!(out, record);
}

#[test]
fn rejected_decompress_options_keep_the_dictionary() {
    let dict = Arc::new(trained_dictionary());
    let frame = compress(&log_record(12), &CompressOptions::level(3), Some(Arc::clone(&dict)))
        .unwrap();
    let d = Decompressor::new(Some(Arc::clone(&dict)), &DecompressOptions::default()).unwrap();

    let err = d
        .reinitialize(None, &DecompressOptions::new().set_raw(4242, 1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(d.dictionary().map(|d| d.dict_id()), Some(dict.dict_id()));
    assert_eq!(d.decompress(&frame, None).unwrap(), log_record(12));
}
