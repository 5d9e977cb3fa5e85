use zflow_dict::DictError;
use zflow_engine::{EngineError, ErrorKind};

/// Errors from decompression sessions, one-shot decompression and the
/// async reader.
///
/// Error hierarchy:
///
/// ```text
///   DecompressError
///   ├── Truncated            ← input ended inside a frame
///   ├── Engine(EngineError)  ← bad option, corrupt frame, allocation
///   ├── Dict(DictError)      ← dictionary handle could not be built
///   └── Io(std::io::Error)   ← the async source failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    /// All input was consumed but the last frame is incomplete.
    #[error("compressed data ended before the end-of-frame marker was reached")]
    Truncated,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Dict(#[from] DictError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecompressError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Truncated | Self::Io(_) => ErrorKind::Codec,
            Self::Engine(e) => e.kind(),
            Self::Dict(e) => e.kind(),
        }
    }
}
