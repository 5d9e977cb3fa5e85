use zflow_engine::{EngineError, ErrorKind};

/// Errors from dictionary construction, handle builds and training.
///
/// Error hierarchy:
///
/// ```text
///   DictError
///   ├── InvalidDictionary      ← content has no recognisable dictionary id
///   ├── InvalidTrainingInput   ← chunk table does not describe the corpus
///   └── Engine(EngineError)    ← handle build or trainer failure
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    /// Identifier extraction returned 0. Such content is never usable as a
    /// dictionary.
    #[error("not a valid zstd dictionary content")]
    InvalidDictionary,

    #[error("invalid training input: {reason}")]
    InvalidTrainingInput { reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DictError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDictionary => ErrorKind::Dictionary,
            Self::InvalidTrainingInput { .. } => ErrorKind::Validation,
            Self::Engine(e) => e.kind(),
        }
    }
}
