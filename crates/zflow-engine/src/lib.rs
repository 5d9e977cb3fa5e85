#![warn(clippy::pedantic)]

pub mod engine;
pub mod error;
pub mod frame;
pub mod output_buffer;
pub mod params;
mod raw;
pub mod zstd_engine;

pub use engine::{CodecEngine, Directive, StepOutcome};
pub use error::{EngineError, ErrorKind};
pub use frame::{FrameInfo, frame_info, frame_size};
pub use output_buffer::OutputBuffer;
pub use params::{Bounds, CompressParameter, DecompressParameter, Strategy};
pub use raw::{ZstdCCtx, ZstdCDict};
pub use zstd_engine::{DEFAULT_LEVEL, ZstdEngine};
