use crate::error::EngineError;
use crate::params::{Bounds, CompressParameter, DecompressParameter};

/// How much of its internal buffering the compressor should emit.
///
/// ```text
/// ┌──────────┬────┬──────────────────────────────────────────────────┐
/// │ Variant  │ id │ Effect                                           │
/// ├──────────┼────┼──────────────────────────────────────────────────┤
/// │ Continue │ 0  │ Keep accumulating, emit only what is ready       │
/// │ Flush    │ 1  │ Flush every buffered block, leave the frame open │
/// │ End      │ 2  │ Flush and write the frame epilogue               │
/// └──────────┴────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Directive {
    #[default]
    Continue,
    Flush,
    End,
}

impl Directive {
    #[must_use]
    pub fn id(self) -> i32 {
        match self {
            Self::Continue => 0,
            Self::Flush => 1,
            Self::End => 2,
        }
    }
}

impl TryFrom<i32> for Directive {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Continue),
            1 => Ok(Self::Flush),
            2 => Ok(Self::End),
            _ => Err(EngineError::InvalidDirective { value }),
        }
    }
}

/// Result of one bounded transform step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Bytes taken from the front of the input view.
    pub consumed: usize,
    /// Bytes written to the front of the output view.
    pub produced: usize,
    /// Engine hint. For compression, bytes still buffered for the directive
    /// (0 = done). For decompression, 0 once a frame is fully decoded and
    /// flushed, otherwise a suggested next input size.
    pub remaining: usize,
}

/// The narrow surface the sessions need from a block/stream codec.
///
/// Contexts are exclusively owned and mutated by one session at a time.
/// Dictionary handles are immutable after construction and shared across
/// threads behind an `Arc`.
///
/// # Handle lifetime
///
/// `attach_*_dict` lets the context refer to the handle by reference
/// without taking ownership. The caller must keep the handle alive until
/// the context is reset or dropped; the sessions do this by storing the
/// `Arc` next to the context.
pub trait CodecEngine: Clone + Send + Sync + 'static {
    type CompressContext: Send;
    type DecompressContext: Send;
    type CompressDict: Send + Sync;
    type DecompressDict: Send + Sync;

    /// # Errors
    ///
    /// [`EngineError::ContextCreation`] if the engine cannot allocate one.
    fn create_compress_context(&self) -> Result<Self::CompressContext, EngineError>;

    /// # Errors
    ///
    /// [`EngineError::ContextCreation`] if the engine cannot allocate one.
    fn create_decompress_context(&self) -> Result<Self::DecompressContext, EngineError>;

    /// Drop all session state and parameters, including any attached
    /// dictionary.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine rejects the reset.
    fn reset_compress_context(&self, ctx: &mut Self::CompressContext) -> Result<(), EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine rejects the reset.
    fn reset_decompress_context(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError>;

    /// Abandon the frame in progress but keep parameters and the attached
    /// dictionary, so the next step starts a new frame.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine rejects the reset.
    fn reset_compress_session(&self, ctx: &mut Self::CompressContext) -> Result<(), EngineError>;

    /// Decompression counterpart of
    /// [`reset_compress_session`](Self::reset_compress_session).
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine rejects the reset.
    fn reset_decompress_session(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] when the engine refuses the value.
    fn set_compress_parameter(
        &self,
        ctx: &mut Self::CompressContext,
        param: CompressParameter,
        value: i32,
    ) -> Result<(), EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] when the engine refuses the value.
    fn set_decompress_parameter(
        &self,
        ctx: &mut Self::DecompressContext,
        param: DecompressParameter,
        value: i32,
    ) -> Result<(), EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine does not know the parameter.
    fn compress_parameter_bounds(&self, param: CompressParameter) -> Result<Bounds, EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine does not know the parameter.
    fn decompress_parameter_bounds(
        &self,
        param: DecompressParameter,
    ) -> Result<Bounds, EngineError>;

    /// Precompute a compression dictionary for one level. Pure; the result
    /// depends only on `content` and `level`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine cannot digest the content.
    fn build_compress_dict(&self, content: &[u8], level: i32)
    -> Result<Self::CompressDict, EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine cannot digest the content.
    fn build_decompress_dict(&self, content: &[u8]) -> Result<Self::DecompressDict, EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine rejects the handle.
    fn attach_compress_dict(
        &self,
        ctx: &mut Self::CompressContext,
        dict: &Self::CompressDict,
    ) -> Result<(), EngineError>;

    /// # Errors
    ///
    /// [`EngineError::Codec`] if the engine rejects the handle.
    fn attach_decompress_dict(
        &self,
        ctx: &mut Self::DecompressContext,
        dict: &Self::DecompressDict,
    ) -> Result<(), EngineError>;

    /// Run one compression step from `input` into `output`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] with the engine's diagnostic text.
    fn compress_step(
        &self,
        ctx: &mut Self::CompressContext,
        output: &mut [u8],
        input: &[u8],
        directive: Directive,
    ) -> Result<StepOutcome, EngineError>;

    /// Run one decompression step from `input` into `output`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] on corrupt or unsupported frames.
    fn decompress_step(
        &self,
        ctx: &mut Self::DecompressContext,
        output: &mut [u8],
        input: &[u8],
    ) -> Result<StepOutcome, EngineError>;

    /// `(min, max)` compression levels. Negative levels trade ratio for
    /// speed.
    fn level_bounds(&self) -> (i32, i32);

    /// Identifier stored in a dictionary's header, or 0 when the content
    /// is not a recognisable dictionary.
    fn dictionary_id(&self, content: &[u8]) -> u32;

    /// Train a dictionary of at most `dict_size` bytes from `corpus`,
    /// which is the concatenation of samples whose lengths are
    /// `chunk_sizes`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] when the corpus is too small or uniform to
    /// learn from.
    fn train_dictionary(
        &self,
        corpus: &[u8],
        chunk_sizes: &[usize],
        dict_size: usize,
    ) -> Result<Vec<u8>, EngineError>;
}
