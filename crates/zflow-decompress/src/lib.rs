#![warn(clippy::pedantic)]

pub mod decompressor;
pub mod error;
pub mod oneshot;
pub mod options;
pub mod streaming;

pub use decompressor::Decompressor;
pub use error::DecompressError;
pub use oneshot::decompress;
pub use options::DecompressOptions;
pub use streaming::{DecompressReader, StreamConfig};
