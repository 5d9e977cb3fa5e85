use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use zflow_dict::Dictionary;

use crate::decompressor::Decompressor;
use crate::error::DecompressError;
use crate::options::DecompressOptions;

/// Buffer sizes for [`DecompressReader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Compressed bytes requested from the source per read.
    pub read_size: usize,
    /// Upper bound on the length of each yielded chunk. Zero is raised to
    /// one, as a reader that may yield nothing can never make progress.
    pub max_output: usize,
}

impl Default for StreamConfig {
    /// The engine's recommended stream buffer sizes (128 KiB each).
    fn default() -> Self {
        Self {
            read_size: 128 * 1024,
            max_output: 128 * 1024,
        }
    }
}

/// Asynchronous decompressor over any `AsyncRead` source.
///
/// Pulls compressed bytes only when the session needs them and yields
/// decompressed chunks of at most [`StreamConfig::max_output`] bytes, so a
/// large frame never has to fit in memory at once.
///
/// # Example
///
/// ```rust,no_run
/// use zflow_decompress::{DecompressReader, DecompressOptions, StreamConfig};
///
/// async fn inflate(src: impl tokio::io::AsyncRead + Unpin) -> Vec<u8> {
///     let mut reader =
///         DecompressReader::new(src, None, &DecompressOptions::default(), StreamConfig::default())
///             .unwrap();
///     let mut out = Vec::new();
///     while let Some(chunk) = reader.next().await {
///         out.extend(chunk.unwrap());
///     }
///     out
/// }
/// ```
pub struct DecompressReader<R> {
    reader: R,
    session: Decompressor,
    config: StreamConfig,
    buf: Vec<u8>,
    seen_input: bool,
    done: bool,
}

impl<R: AsyncRead + Unpin> DecompressReader<R> {
    /// # Errors
    ///
    /// Any error from [`Decompressor::new`].
    pub fn new(
        reader: R,
        dict: Option<Arc<Dictionary>>,
        options: &DecompressOptions,
        config: StreamConfig,
    ) -> Result<Self, DecompressError> {
        let config = StreamConfig {
            max_output: config.max_output.max(1),
            ..config
        };
        Ok(Self {
            reader,
            session: Decompressor::new(dict, options)?,
            config,
            buf: vec![0; config.read_size.max(1)],
            seen_input: false,
            done: false,
        })
    }

    /// Next decompressed chunk, `None` once the source is exhausted at a
    /// frame boundary.
    ///
    /// Reaching the end of the source inside a frame yields
    /// [`DecompressError::Truncated`]. After any error the reader is
    /// finished.
    pub async fn next(&mut self) -> Option<Result<Vec<u8>, DecompressError>> {
        loop {
            if self.done {
                return None;
            }

            let input: &[u8] = if self.session.needs_input() {
                let n = match self.reader.read(&mut self.buf).await {
                    Ok(n) => n,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e.into()));
                    }
                };
                if n == 0 {
                    self.done = true;
                    if self.seen_input && !self.session.at_frame_end() {
                        return Some(Err(DecompressError::Truncated));
                    }
                    return None;
                }
                self.seen_input = true;
                &self.buf[..n]
            } else {
                &[]
            };

            match self.session.decompress(input, Some(self.config.max_output)) {
                Ok(chunk) if chunk.is_empty() => {}
                Ok(chunk) => return Some(Ok(chunk)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }

    /// The underlying session, for inspecting its state.
    #[must_use]
    pub fn session(&self) -> &Decompressor {
        &self.session
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
