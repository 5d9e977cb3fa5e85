use std::mem;
use std::sync::{Arc, Mutex};

use log::{debug, trace, warn};
use zflow_dict::Dictionary;
use zflow_engine::{CodecEngine, EngineError, OutputBuffer, ZstdEngine};

use crate::error::DecompressError;
use crate::options::{self, DecompressOptions};

/// Input carried between calls.
///
/// ```text
///   Drained { output_pending: false }   needs_input = true
///        ▲          │ call stops at max_length
///        │          ▼ with input left over
///        │     Buffered(rest)            needs_input = false
///        │          │ rest fully consumed
///        │          ▼ and output hit max_length exactly
///        └── Drained { output_pending: true }  needs_input = false
/// ```
enum InputState {
    /// No unconsumed input. `output_pending` is set when the last call
    /// filled `max_length` exactly, so the engine may still hold output.
    Drained { output_pending: bool },
    /// Unconsumed suffix of the last call's input. Never empty.
    Buffered(Vec<u8>),
}

impl InputState {
    const FRESH: Self = Self::Drained {
        output_pending: false,
    };
}

/// Fields drop in declaration order: the context goes before the handle it
/// refers to.
struct State<E: CodecEngine> {
    ctx: E::DecompressContext,
    handle: Option<Arc<E::DecompressDict>>,
    dict: Option<Arc<Dictionary<E>>>,
    input: InputState,
    at_frame_end: bool,
}

/// Incremental decompression session.
///
/// [`decompress`](Self::decompress) may stop early when `max_length` is
/// reached. Input the engine did not take is kept for the next call, and
/// [`needs_input`](Self::needs_input) tells the caller whether another
/// call with empty input can still produce output.
///
/// Calls serialise on an internal lock. A codec error drops the carried
/// input and resets the engine context to a frame boundary, keeping its
/// options and dictionary, so the next call can start a new frame.
///
/// # Example
///
/// ```rust
/// use zflow_decompress::{DecompressOptions, Decompressor};
///
/// let frame = zstd::bulk::compress(&[7u8; 10_000], 3).unwrap();
/// let d = Decompressor::new(None, &DecompressOptions::default()).unwrap();
///
/// let mut out = d.decompress(&frame, Some(4096)).unwrap();
/// while !d.needs_input() {
///     out.extend(d.decompress(&[], Some(4096)).unwrap());
/// }
/// assert_eq!(out, vec![7u8; 10_000]);
/// ```
pub struct Decompressor<E: CodecEngine = ZstdEngine> {
    engine: E,
    state: Mutex<State<E>>,
}

impl<E: CodecEngine> std::fmt::Debug for Decompressor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decompressor").finish_non_exhaustive()
    }
}

impl Decompressor {
    /// Create a session on the zstd engine.
    ///
    /// # Errors
    ///
    /// See [`with_engine`](Decompressor::with_engine).
    pub fn new(
        dict: Option<Arc<Dictionary>>,
        options: &DecompressOptions,
    ) -> Result<Self, DecompressError> {
        Self::with_engine(ZstdEngine, dict, options)
    }
}

impl<E: CodecEngine> Decompressor<E> {
    /// # Errors
    ///
    /// - [`EngineError::ContextCreation`] if no context can be allocated.
    /// - [`EngineError::InvalidParameter`] for a rejected option.
    /// - [`DecompressError::Dict`] if the dictionary handle cannot be built.
    pub fn with_engine(
        engine: E,
        dict: Option<Arc<Dictionary<E>>>,
        options: &DecompressOptions,
    ) -> Result<Self, DecompressError> {
        let ctx = engine.create_decompress_context()?;
        let mut state = State {
            ctx,
            handle: None,
            dict: None,
            input: InputState::FRESH,
            at_frame_end: false,
        };
        initialize(&engine, &mut state, dict, options)?;
        Ok(Self {
            engine,
            state: Mutex::new(state),
        })
    }

    /// Reset the context, drop carried input and rebind the dictionary and
    /// options.
    ///
    /// # Errors
    ///
    /// Same as [`with_engine`](Self::with_engine).
    pub fn reinitialize(
        &self,
        dict: Option<Arc<Dictionary<E>>>,
        options: &DecompressOptions,
    ) -> Result<(), DecompressError> {
        let mut state = self.state.lock().expect("decompressor lock poisoned");
        initialize(&self.engine, &mut state, dict, options)
    }

    /// Decompress carried input followed by `data`.
    ///
    /// Stops when the output reaches `max_length` (`None` for no limit) or
    /// when all input has been consumed. Afterwards:
    ///
    /// ```text
    /// ┌───────────────────────────┬────────────────────────┬─────────────┐
    /// │ Input left                │ Output                 │ needs_input │
    /// ├───────────────────────────┼────────────────────────┼─────────────┤
    /// │ yes (kept for next call)  │ == max_length          │ false       │
    /// │ no                        │ == max_length          │ false       │
    /// │ no                        │ < max_length / no cap  │ true        │
    /// └───────────────────────────┴────────────────────────┴─────────────┘
    /// ```
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] for corrupt input and
    /// [`EngineError::OutputAllocation`] when a chunk cannot be reserved.
    /// Carried input and the partly decoded frame are discarded and
    /// `needs_input` becomes true.
    pub fn decompress(
        &self,
        data: &[u8],
        max_length: Option<usize>,
    ) -> Result<Vec<u8>, DecompressError> {
        let mut guard = self.state.lock().expect("decompressor lock poisoned");
        let state = &mut *guard;

        let buffered = match mem::replace(&mut state.input, InputState::FRESH) {
            InputState::Buffered(mut rest) => {
                rest.extend_from_slice(data);
                Some(rest)
            }
            InputState::Drained { .. } => None,
        };
        let input = buffered.as_deref().unwrap_or(data);

        let run = match drive(
            &self.engine,
            &mut state.ctx,
            input,
            max_length,
            state.at_frame_end,
        ) {
            Ok(run) => run,
            Err(e) => {
                state.at_frame_end = false;
                warn!("decompress call failed, carried input discarded: {e}");
                if let Err(reset) = self.engine.reset_decompress_session(&mut state.ctx) {
                    warn!("decompression session reset failed: {reset}");
                }
                return Err(e.into());
            }
        };

        state.at_frame_end = run.frame_end;
        state.input = if run.consumed < input.len() {
            let rest = match buffered {
                Some(mut all) => {
                    all.drain(..run.consumed);
                    all
                }
                None => data[run.consumed..].to_vec(),
            };
            InputState::Buffered(rest)
        } else {
            InputState::Drained {
                output_pending: max_length == Some(run.output.len()),
            }
        };
        match &state.input {
            InputState::Buffered(rest) => trace!(
                "decompressed {} bytes, {} input bytes carried over",
                run.output.len(),
                rest.len()
            ),
            InputState::Drained { output_pending } => trace!(
                "decompressed {} bytes, input drained, output pending: {output_pending}",
                run.output.len()
            ),
        }
        Ok(run.output)
    }

    /// True when only new input can produce more output.
    #[must_use]
    pub fn needs_input(&self) -> bool {
        matches!(
            self.state.lock().expect("decompressor lock poisoned").input,
            InputState::Drained {
                output_pending: false
            }
        )
    }

    /// True when the last step that made progress completed a frame and
    /// flushed all of its output.
    #[must_use]
    pub fn at_frame_end(&self) -> bool {
        self.state
            .lock()
            .expect("decompressor lock poisoned")
            .at_frame_end
    }

    /// Bytes of input carried over to the next call.
    #[must_use]
    pub fn pending_input_len(&self) -> usize {
        match &self.state.lock().expect("decompressor lock poisoned").input {
            InputState::Buffered(rest) => rest.len(),
            InputState::Drained { .. } => 0,
        }
    }

    #[must_use]
    pub fn dictionary(&self) -> Option<Arc<Dictionary<E>>> {
        self.state
            .lock()
            .expect("decompressor lock poisoned")
            .dict
            .clone()
    }
}

/// Validate first and build the dictionary handle, then reset and rebind.
/// A rejected option or a failed handle build leaves `state` untouched.
fn initialize<E: CodecEngine>(
    engine: &E,
    state: &mut State<E>,
    dict: Option<Arc<Dictionary<E>>>,
    options: &DecompressOptions,
) -> Result<(), DecompressError> {
    let validated = options::validate(engine, options)?;
    let handle = match &dict {
        Some(dict) => Some(dict.decompression_handle()?),
        None => None,
    };

    state.input = InputState::FRESH;
    state.at_frame_end = false;
    engine.reset_decompress_context(&mut state.ctx)?;
    state.handle = None;
    state.dict = None;
    validated.apply(engine, &mut state.ctx)?;

    if let (Some(dict), Some(handle)) = (dict, handle) {
        engine.attach_decompress_dict(&mut state.ctx, &handle)?;
        debug!("decompressor ready with dict {}", dict.dict_id());
        state.handle = Some(handle);
        state.dict = Some(dict);
    } else {
        debug!("decompressor ready");
    }
    Ok(())
}

struct Run {
    output: Vec<u8>,
    consumed: usize,
    frame_end: bool,
}

/// Step the engine until the output reaches `max_length` or the input is
/// used up. A full chunk is checked before the input, because the engine
/// may still hold output after taking the last input byte.
fn drive<E: CodecEngine>(
    engine: &E,
    ctx: &mut E::DecompressContext,
    input: &[u8],
    max_length: Option<usize>,
    mut frame_end: bool,
) -> Result<Run, EngineError> {
    let mut out = OutputBuffer::new(max_length)?;
    let mut consumed = 0;
    loop {
        let step = match engine.decompress_step(ctx, out.spare_mut(), &input[consumed..]) {
            Ok(step) => step,
            Err(e) => {
                out.abort();
                return Err(e);
            }
        };
        consumed += step.consumed;
        out.advance(step.produced);
        if step.consumed > 0 || step.produced > 0 {
            frame_end = step.remaining == 0;
        }

        if out.is_full() {
            if out.max_length() == Some(out.len()) {
                break;
            }
            out.grow()?;
        } else if consumed == input.len() {
            break;
        }
    }
    Ok(Run {
        output: out.finish()?,
        consumed,
        frame_end,
    })
}
