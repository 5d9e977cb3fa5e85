use log::trace;

use crate::error::EngineError;

const KB: usize = 1024;
const MB: usize = 1024 * 1024;

/// Chunk size progression. Index `n` is the size of the chunk appended
/// when the buffer already holds `n` chunks; past the end the last entry
/// repeats.
///
/// ```text
///  chunk   size     cumulative
///  ─────   ──────   ──────────
///    1     32 KB       32 KB
///    2     64 KB       96 KB
///    3    256 KB      352 KB
///    4      1 MB     1.34 MB
///    5      4 MB     5.34 MB
///    6      8 MB    13.34 MB
///   7-8    16 MB    45.34 MB
///  9-12    32 MB   173.34 MB
/// 13-14    64 MB   301.34 MB
/// 15-16   128 MB   557.34 MB
///  17+    256 MB   +256 MB each
/// ```
const BLOCK_SIZES: [usize; 17] = [
    32 * KB,
    64 * KB,
    256 * KB,
    MB,
    4 * MB,
    8 * MB,
    16 * MB,
    16 * MB,
    32 * MB,
    32 * MB,
    32 * MB,
    32 * MB,
    64 * MB,
    64 * MB,
    128 * MB,
    128 * MB,
    256 * MB,
];

/// Size of the chunk that follows `index` existing chunks.
#[must_use]
pub fn block_size(index: usize) -> usize {
    BLOCK_SIZES[index.min(BLOCK_SIZES.len() - 1)]
}

/// Accumulates engine output of unknown final size.
///
/// Output goes into a list of chunks sized by [`block_size`]. Only the
/// last chunk is ever partially written; every earlier chunk is full. The
/// chunks are copied into one contiguous `Vec` exactly once, by
/// [`finish`](Self::finish).
///
/// With a `max_length` cap the cumulative allocation is clamped to the
/// cap, and [`grow`](Self::grow) becomes a no-op once the cap is reached.
///
/// ```text
///  chunks[0]            chunks[1]                 chunks[2]
///  ┌──────────────┐     ┌───────────────────┐     ┌──────────┬─────────┐
///  │ full         │ ──▶ │ full              │ ──▶ │ written  │ spare   │
///  └──────────────┘     └───────────────────┘     └──────────┴─────────┘
///                                                            ▲ pos
/// ```
#[derive(Debug)]
pub struct OutputBuffer {
    chunks: Vec<Vec<u8>>,
    allocated: usize,
    max_length: Option<usize>,
    pos: usize,
}

impl OutputBuffer {
    /// Reserve the first chunk, sized `min(32 KB, max_length)`.
    ///
    /// # Errors
    ///
    /// [`EngineError::OutputAllocation`] if the chunk cannot be reserved.
    pub fn new(max_length: Option<usize>) -> Result<Self, EngineError> {
        let size = max_length.map_or(BLOCK_SIZES[0], |max| max.min(BLOCK_SIZES[0]));
        let first = alloc_chunk(size)?;
        Ok(Self {
            chunks: vec![first],
            allocated: size,
            max_length,
            pos: 0,
        })
    }

    /// Unwritten tail of the current chunk. The engine writes here, then
    /// the caller reports how much it wrote with [`advance`](Self::advance).
    pub fn spare_mut(&mut self) -> &mut [u8] {
        let pos = self.pos;
        match self.chunks.last_mut() {
            Some(chunk) => &mut chunk[pos..],
            None => &mut [],
        }
    }

    /// Mark `written` more bytes of the current chunk as output.
    pub fn advance(&mut self, written: usize) {
        debug_assert!(written <= self.current_capacity() - self.pos);
        self.pos += written;
    }

    /// True when the current chunk has no spare room.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.pos == self.current_capacity()
    }

    /// True when a cap is set and the whole cap has been allocated.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        self.max_length.is_some_and(|max| self.allocated >= max)
    }

    /// Append the next chunk. Only valid when [`is_full`](Self::is_full).
    ///
    /// Does nothing when the cap is already allocated, so a capped buffer
    /// never accumulates empty chunks.
    ///
    /// # Errors
    ///
    /// [`EngineError::OutputAllocation`] if the chunk cannot be reserved.
    pub fn grow(&mut self) -> Result<(), EngineError> {
        debug_assert!(self.is_full(), "grow called with spare room left");

        let mut size = block_size(self.chunks.len());
        if let Some(max) = self.max_length {
            let left = max.saturating_sub(self.allocated);
            if left == 0 {
                return Ok(());
            }
            size = size.min(left);
        }

        let chunk = alloc_chunk(size)?;
        self.chunks.push(chunk);
        self.allocated += size;
        self.pos = 0;
        trace!(
            "output buffer grew to {} chunks, {} bytes allocated",
            self.chunks.len(),
            self.allocated
        );
        Ok(())
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allocated - (self.current_capacity() - self.pos)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all chunk sizes, written or not.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Join the written bytes into one `Vec` of exactly [`len`](Self::len)
    /// bytes and release the chunks.
    ///
    /// # Errors
    ///
    /// [`EngineError::OutputAllocation`] if the result cannot be reserved.
    pub fn finish(mut self) -> Result<Vec<u8>, EngineError> {
        let len = self.len();

        // A single chunk already is the contiguous result.
        if self.chunks.len() == 1 {
            let mut only = self.chunks.pop().unwrap_or_default();
            only.truncate(len);
            return Ok(only);
        }

        let mut out = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|source| EngineError::OutputAllocation { size: len, source })?;
        let last = self.chunks.len() - 1;
        for (i, chunk) in self.chunks.iter().enumerate() {
            if i == last {
                out.extend_from_slice(&chunk[..self.pos]);
            } else {
                out.extend_from_slice(chunk);
            }
        }
        Ok(out)
    }

    /// Release the chunks without producing a result.
    pub fn abort(self) {
        trace!("output buffer discarded with {} bytes written", self.len());
    }

    fn current_capacity(&self) -> usize {
        self.chunks.last().map_or(0, Vec::len)
    }
}

fn alloc_chunk(size: usize) -> Result<Vec<u8>, EngineError> {
    let mut chunk = Vec::new();
    chunk
        .try_reserve_exact(size)
        .map_err(|source| EngineError::OutputAllocation { size, source })?;
    chunk.resize(size, 0);
    Ok(chunk)
}
