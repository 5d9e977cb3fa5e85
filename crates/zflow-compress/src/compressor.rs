use std::sync::{Arc, Mutex};

use log::{debug, warn};
use zflow_dict::Dictionary;
use zflow_engine::{CodecEngine, Directive, EngineError, OutputBuffer, ZstdEngine};

use crate::error::CompressError;
use crate::options::{self, CompressOptions};

/// Everything the session lock guards.
///
/// Fields drop in declaration order: the context goes before the handle it
/// refers to.
struct State<E: CodecEngine> {
    ctx: E::CompressContext,
    handle: Option<Arc<E::CompressDict>>,
    dict: Option<Arc<Dictionary<E>>>,
    level: i32,
}

/// Incremental compression session.
///
/// Each call feeds input to one long-lived context and returns whatever
/// compressed bytes are ready for the requested [`Directive`]. Calls
/// serialise on an internal lock, so the session can be shared across
/// threads but never runs two operations at once.
///
/// ```text
///   new(options, dict) ──▶ ready ──┬── compress(data, Continue) ─┐
///                            ▲     ├── compress(data, Flush) ────┤
///                            │     ├── flush(end_frame) ─────────┤
///                            │     └── reinitialize(..) ──┐      │
///                            └────────────────────────────┴──────┘
/// ```
///
/// A codec error abandons the frame in progress: the context is reset to
/// a frame boundary with its options and dictionary kept, so the next
/// call starts a fresh frame.
///
/// # Example
///
/// ```rust
/// use zflow_compress::{CompressOptions, Compressor};
/// use zflow_engine::Directive;
///
/// let c = Compressor::new(&CompressOptions::level(3), None).unwrap();
/// let mut frame = c.compress(b"hello ", Directive::Continue).unwrap();
/// frame.extend(c.compress(b"world", Directive::Continue).unwrap());
/// frame.extend(c.flush(true).unwrap());
/// assert_eq!(zstd::decode_all(&frame[..]).unwrap(), b"hello world");
/// ```
pub struct Compressor<E: CodecEngine = ZstdEngine> {
    engine: E,
    state: Mutex<State<E>>,
}

impl<E: CodecEngine> std::fmt::Debug for Compressor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compressor").finish_non_exhaustive()
    }
}

impl Compressor {
    /// Create a session on the zstd engine.
    ///
    /// # Errors
    ///
    /// See [`with_engine`](Compressor::with_engine).
    pub fn new(
        options: &CompressOptions,
        dict: Option<Arc<Dictionary>>,
    ) -> Result<Self, CompressError> {
        Self::with_engine(ZstdEngine, options, dict)
    }
}

impl<E: CodecEngine> Compressor<E> {
    /// Create a session, apply `options` and attach `dict` at the
    /// effective level.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ContextCreation`] if no context can be allocated.
    /// - [`EngineError::InvalidParameter`] for a rejected option.
    /// - [`CompressError::Dict`] if the dictionary handle cannot be built.
    pub fn with_engine(
        engine: E,
        options: &CompressOptions,
        dict: Option<Arc<Dictionary<E>>>,
    ) -> Result<Self, CompressError> {
        let ctx = engine.create_compress_context()?;
        let mut state = State {
            ctx,
            handle: None,
            dict: None,
            level: 0,
        };
        initialize(&engine, &mut state, options, dict)?;
        Ok(Self {
            engine,
            state: Mutex::new(state),
        })
    }

    /// Reset the context, discard the previous dictionary and apply new
    /// options.
    ///
    /// # Errors
    ///
    /// Same as [`with_engine`](Self::with_engine).
    pub fn reinitialize(
        &self,
        options: &CompressOptions,
        dict: Option<Arc<Dictionary<E>>>,
    ) -> Result<(), CompressError> {
        let mut state = self.state.lock().expect("compressor lock poisoned");
        initialize(&self.engine, &mut state, options, dict)
    }

    /// Feed `data` and return the bytes the engine emits for `directive`.
    ///
    /// With [`Directive::Continue`] the result is often empty: the engine
    /// buffers input until it has a block's worth.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] or [`EngineError::OutputAllocation`]. The
    /// partial output and the unfinished frame are discarded.
    pub fn compress(&self, data: &[u8], directive: Directive) -> Result<Vec<u8>, CompressError> {
        let mut guard = self.state.lock().expect("compressor lock poisoned");
        let state = &mut *guard;
        drive(&self.engine, &mut state.ctx, data, directive).map_err(|e| {
            warn!("compress call failed, unfinished frame dropped: {e}");
            if let Err(reset) = self.engine.reset_compress_session(&mut state.ctx) {
                warn!("compression session reset failed: {reset}");
            }
            CompressError::from(e)
        })
    }

    /// Emit everything buffered. With `end_frame` the frame is closed and
    /// the next call starts a new one.
    ///
    /// # Errors
    ///
    /// Same as [`compress`](Self::compress).
    pub fn flush(&self, end_frame: bool) -> Result<Vec<u8>, CompressError> {
        let directive = if end_frame {
            Directive::End
        } else {
            Directive::Flush
        };
        self.compress(&[], directive)
    }

    /// Dictionary attached at the last (re)initialisation.
    #[must_use]
    pub fn dictionary(&self) -> Option<Arc<Dictionary<E>>> {
        self.state
            .lock()
            .expect("compressor lock poisoned")
            .dict
            .clone()
    }

    /// Effective compression level from the last (re)initialisation.
    #[must_use]
    pub fn level(&self) -> i32 {
        self.state.lock().expect("compressor lock poisoned").level
    }
}

/// Validate first and build the dictionary handle, then reset and rebind.
/// A rejected option or a failed handle build leaves `state` untouched.
fn initialize<E: CodecEngine>(
    engine: &E,
    state: &mut State<E>,
    options: &CompressOptions,
    dict: Option<Arc<Dictionary<E>>>,
) -> Result<(), CompressError> {
    let validated = options::validate(engine, options)?;
    let level = validated.level();
    let handle = match &dict {
        Some(dict) => Some(dict.compression_handle(level)?),
        None => None,
    };

    engine.reset_compress_context(&mut state.ctx)?;
    state.handle = None;
    state.dict = None;
    state.level = level;
    validated.apply(engine, &mut state.ctx)?;

    if let (Some(dict), Some(handle)) = (dict, handle) {
        engine.attach_compress_dict(&mut state.ctx, &handle)?;
        debug!(
            "compressor ready at level {level} with dict {}",
            dict.dict_id()
        );
        state.handle = Some(handle);
        state.dict = Some(dict);
    } else {
        debug!("compressor ready at level {level}");
    }
    Ok(())
}

/// Step the engine until it reports nothing pending for `directive` and
/// the whole input has been taken.
fn drive<E: CodecEngine>(
    engine: &E,
    ctx: &mut E::CompressContext,
    input: &[u8],
    directive: Directive,
) -> Result<Vec<u8>, EngineError> {
    let mut out = OutputBuffer::new(None)?;
    let mut consumed = 0;
    loop {
        let step = match engine.compress_step(ctx, out.spare_mut(), &input[consumed..], directive)
        {
            Ok(step) => step,
            Err(e) => {
                out.abort();
                return Err(e);
            }
        };
        consumed += step.consumed;
        out.advance(step.produced);

        if step.remaining == 0 && consumed == input.len() {
            return out.finish();
        }
        if out.is_full() {
            out.grow()?;
        }
    }
}
