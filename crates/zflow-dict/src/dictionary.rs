use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use log::debug;
use zflow_engine::{CodecEngine, EngineError, ZstdEngine};

use crate::error::DictError;

/// Build-once cell for one precomputed handle.
///
/// The slot's own lock is held across the build, so concurrent callers
/// asking for the same handle wait for the first build instead of starting
/// their own. Readers see either nothing or a finished handle.
struct HandleSlot<H> {
    handle: Mutex<Option<Arc<H>>>,
}

impl<H> HandleSlot<H> {
    fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    fn get_or_build(
        &self,
        build: impl FnOnce() -> Result<H, EngineError>,
    ) -> Result<Arc<H>, EngineError> {
        let mut slot = self.handle.lock().expect("dictionary handle lock poisoned");
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }
        // A failed build leaves the slot empty for the next caller.
        let handle = Arc::new(build()?);
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    fn is_built(&self) -> bool {
        self.handle
            .lock()
            .expect("dictionary handle lock poisoned")
            .is_some()
    }
}

/// Raw dictionary content plus its lazily built engine handles.
///
/// The content is immutable. Compression handles are built on first use,
/// one per distinct compression level; the decompression handle is built
/// once. Every handle is shared by all sessions that attach this
/// dictionary, so wrap the dictionary in an `Arc` and hand clones to
/// sessions on any number of threads.
///
/// # Concurrency
///
/// The level map is guarded by a short-lived lock that only finds or
/// inserts a per-level slot. The potentially slow build runs under that
/// slot's lock, so builds for different levels proceed in parallel and a
/// given level is built at most once.
///
/// # Example
///
/// ```rust,no_run
/// use zflow_dict::Dictionary;
///
/// let content = std::fs::read("samples.dict").unwrap();
/// let dict = Dictionary::new(content).unwrap();
/// println!("{dict}"); // <ZstdDict dict_id=... dict_size=...>
/// ```
pub struct Dictionary<E: CodecEngine = ZstdEngine> {
    content: Vec<u8>,
    dict_id: u32,
    engine: E,
    compress_handles: Mutex<HashMap<i32, Arc<HandleSlot<E::CompressDict>>>>,
    decompress_handle: HandleSlot<E::DecompressDict>,
}

impl Dictionary {
    /// Wrap dictionary content for the zstd engine.
    ///
    /// # Errors
    ///
    /// [`DictError::InvalidDictionary`] if the content does not carry a
    /// dictionary id.
    pub fn new(content: impl Into<Vec<u8>>) -> Result<Self, DictError> {
        Self::with_engine(content, ZstdEngine)
    }
}

impl<E: CodecEngine> Dictionary<E> {
    /// # Errors
    ///
    /// [`DictError::InvalidDictionary`] if `engine` finds no dictionary id
    /// in the content.
    pub fn with_engine(content: impl Into<Vec<u8>>, engine: E) -> Result<Self, DictError> {
        let content = content.into();
        let dict_id = engine.dictionary_id(&content);
        if dict_id == 0 {
            return Err(DictError::InvalidDictionary);
        }
        Ok(Self {
            content,
            dict_id,
            engine,
            compress_handles: Mutex::new(HashMap::new()),
            decompress_handle: HandleSlot::new(),
        })
    }

    #[must_use]
    pub fn dict_id(&self) -> u32 {
        self.dict_id
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Compression handle for `level`, built on first request.
    ///
    /// # Errors
    ///
    /// [`DictError::Engine`] if the engine fails to build the handle. The
    /// cache is left without an entry for `level`.
    pub fn compression_handle(&self, level: i32) -> Result<Arc<E::CompressDict>, DictError> {
        let slot = {
            let mut map = self
                .compress_handles
                .lock()
                .expect("dictionary level map lock poisoned");
            Arc::clone(map.entry(level).or_insert_with(|| Arc::new(HandleSlot::new())))
        };
        let handle = slot.get_or_build(|| {
            debug!(
                "building compression handle for dict {} at level {level}",
                self.dict_id
            );
            self.engine.build_compress_dict(&self.content, level)
        })?;
        Ok(handle)
    }

    /// Decompression handle, built on first request.
    ///
    /// # Errors
    ///
    /// [`DictError::Engine`] if the engine fails to build the handle.
    pub fn decompression_handle(&self) -> Result<Arc<E::DecompressDict>, DictError> {
        let handle = self.decompress_handle.get_or_build(|| {
            debug!("building decompression handle for dict {}", self.dict_id);
            self.engine.build_decompress_dict(&self.content)
        })?;
        Ok(handle)
    }

    /// Levels that currently have a built compression handle, ascending.
    #[must_use]
    pub fn cached_levels(&self) -> Vec<i32> {
        let slots: Vec<(i32, Arc<HandleSlot<E::CompressDict>>)> = self
            .compress_handles
            .lock()
            .expect("dictionary level map lock poisoned")
            .iter()
            .map(|(level, slot)| (*level, Arc::clone(slot)))
            .collect();
        let mut levels: Vec<i32> = slots
            .into_iter()
            .filter(|(_, slot)| slot.is_built())
            .map(|(level, _)| level)
            .collect();
        levels.sort_unstable();
        levels
    }

    #[must_use]
    pub fn has_decompression_handle(&self) -> bool {
        self.decompress_handle.is_built()
    }
}

impl<E: CodecEngine> fmt::Display for Dictionary<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<ZstdDict dict_id={} dict_size={}>",
            self.dict_id,
            self.content.len()
        )
    }
}

impl<E: CodecEngine> fmt::Debug for Dictionary<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("dict_id", &self.dict_id)
            .field("dict_size", &self.content.len())
            .field("cached_levels", &self.cached_levels())
            .finish_non_exhaustive()
    }
}
