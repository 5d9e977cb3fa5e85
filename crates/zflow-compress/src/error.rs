use zflow_dict::DictError;
use zflow_engine::{EngineError, ErrorKind};

/// Errors from compression sessions and one-shot compression.
///
/// Error hierarchy:
///
/// ```text
///   CompressError
///   ├── Engine(EngineError)  ← bad option, codec failure, allocation
///   └── Dict(DictError)      ← dictionary handle could not be built
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Dict(#[from] DictError),
}

impl CompressError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Engine(e) => e.kind(),
            Self::Dict(e) => e.kind(),
        }
    }
}
