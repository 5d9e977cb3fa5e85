#![warn(clippy::pedantic)]

pub mod compressor;
pub mod error;
pub mod oneshot;
pub mod options;

pub use compressor::Compressor;
pub use error::CompressError;
pub use oneshot::compress;
pub use options::{CompressOptions, CompressOptionsBuilder};
