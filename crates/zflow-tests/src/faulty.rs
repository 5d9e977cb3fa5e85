//! A zstd engine with switchable one-shot faults.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use zflow_engine::{
    Bounds, CodecEngine, CompressParameter, DecompressParameter, Directive, EngineError,
    StepOutcome, ZstdEngine,
};

/// Faults armed on a [`FaultyEngine`] and what it has done so far.
///
/// Each `fail_next_*` switch is cleared by the call it fails.
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_next_compress_dict: AtomicBool,
    pub fail_next_decompress_dict: AtomicBool,
    pub fail_next_compress_step: AtomicBool,
    /// Handle builds that reached the engine, failed ones included.
    pub compress_dict_attempts: AtomicUsize,
    pub decompress_dict_attempts: AtomicUsize,
    pub compress_session_resets: AtomicUsize,
    pub decompress_session_resets: AtomicUsize,
}

impl Faults {
    fn trip(flag: &AtomicBool) -> bool {
        flag.swap(false, Ordering::SeqCst)
    }
}

/// Delegates to [`ZstdEngine`] unless a fault is armed.
#[derive(Clone, Debug, Default)]
pub struct FaultyEngine {
    pub faults: Arc<Faults>,
}

impl FaultyEngine {
    #[must_use]
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn arm(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

impl CodecEngine for FaultyEngine {
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
        self.faults
            .compress_session_resets
            .fetch_add(1, Ordering::SeqCst);
        ZstdEngine.reset_compress_session(ctx)
    }

    fn reset_decompress_session(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError> {
        self.faults
            .decompress_session_resets
            .fetch_add(1, Ordering::SeqCst);
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
        self.faults
            .compress_dict_attempts
            .fetch_add(1, Ordering::SeqCst);
        if Faults::trip(&self.faults.fail_next_compress_dict) {
            return Err(EngineError::codec(format!(
                "failed to create compression dictionary at level {level}"
            )));
        }
        ZstdEngine.build_compress_dict(content, level)
    }

    fn build_decompress_dict(&self, content: &[u8]) -> Result<Self::DecompressDict, EngineError> {
        self.faults
            .decompress_dict_attempts
            .fetch_add(1, Ordering::SeqCst);
        if Faults::trip(&self.faults.fail_next_decompress_dict) {
            return Err(EngineError::codec("failed to create decompression dictionary"));
        }
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

    /// An armed fault fails after the real step has run, so the context is
    /// left mid-frame exactly as a genuine codec error would leave it.
    fn compress_step(
        &self,
        ctx: &mut Self::CompressContext,
        output: &mut [u8],
        input: &[u8],
        directive: Directive,
    ) -> Result<StepOutcome, EngineError> {
        let step = ZstdEngine.compress_step(ctx, output, input, directive)?;
        if Faults::trip(&self.faults.fail_next_compress_step) {
            return Err(EngineError::codec(
                "Operation not authorized at current processing stage",
            ));
        }
        Ok(step)
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
