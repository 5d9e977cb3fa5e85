use std::collections::TryReserveError;

use crate::params::Bounds;

/// Coarse failure category shared by every zflow error type.
///
/// Callers that only care about *what kind* of thing went wrong (retry
/// with other options, give up on the input, report a bad dictionary)
/// can branch on this instead of matching each variant.
///
/// ```text
/// ┌────────────┬──────────────────────────────────────────────────────┐
/// │ Kind       │ Meaning                                              │
/// ├────────────┼──────────────────────────────────────────────────────┤
/// │ Validation │ Caller input rejected before the engine ran          │
/// │ Codec      │ The engine reported a failure mid-operation          │
/// │ Allocation │ An output chunk or a context could not be allocated  │
/// │ Dictionary │ Dictionary content failed identifier extraction      │
/// └────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Codec,
    Allocation,
    Dictionary,
}

/// Errors raised by the codec engine layer.
///
/// Error hierarchy:
///
/// ```text
///   EngineError
///   ├── Codec               ← engine diagnostic text (bad frame, corrupt data)
///   ├── InvalidParameter    ← option key/value rejected (named when known)
///   ├── InvalidDirective    ← end directive id outside 0..=2
///   ├── InvalidFrameHeader  ← bytes do not start a zstd frame
///   ├── OutputAllocation    ← output chunk reservation failed
///   └── ContextCreation     ← engine returned no context
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine reported a failure. `message` is the engine's own text.
    #[error("zstd error: {message}")]
    Codec { message: String },

    /// A parameter key or value was rejected. The message names the
    /// parameter and its bounds whenever the key is in the known table.
    #[error("{message}")]
    InvalidParameter { message: String },

    #[error("invalid end directive {value}, expected 0 (continue), 1 (flush) or 2 (end)")]
    InvalidDirective { value: i32 },

    /// The header bytes are not the start of a frame, or too few were
    /// supplied to parse it.
    #[error(
        "cannot read frame header from {len} bytes: the buffer must start at a \
         frame and be at least as long as the frame header"
    )]
    InvalidFrameHeader { len: usize },

    #[error("unable to allocate {size} bytes for the output buffer")]
    OutputAllocation {
        size: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("unable to create a zstd {kind} context")]
    ContextCreation { kind: &'static str },
}

impl EngineError {
    /// Build a codec error from any displayable engine diagnostic.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Option entry whose key is not in the parameter table. `direction`
    /// is `"compress"` or `"decompress"`, `position` is 1-based.
    #[must_use]
    pub fn unknown_parameter(direction: &str, position: usize, key: i32) -> Self {
        Self::InvalidParameter {
            message: format!("{direction} parameter #{position} (key {key}) is invalid"),
        }
    }

    /// Known parameter given a value outside its bounds.
    #[must_use]
    pub fn parameter_out_of_bounds(
        direction: &str,
        name: &str,
        bounds: Bounds,
        value: i32,
    ) -> Self {
        Self::InvalidParameter {
            message: format!(
                "invalid zstd {direction} parameter \"{name}\": should be {} <= value <= {}, \
                 provided value is {value}",
                bounds.lower, bounds.upper
            ),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Codec { .. } | Self::InvalidFrameHeader { .. } => ErrorKind::Codec,
            Self::InvalidParameter { .. } | Self::InvalidDirective { .. } => ErrorKind::Validation,
            Self::OutputAllocation { .. } | Self::ContextCreation { .. } => ErrorKind::Allocation,
        }
    }
}
