use std::sync::Arc;

use zflow_dict::Dictionary;
use zflow_engine::Directive;

use crate::compressor::Compressor;
use crate::error::CompressError;
use crate::options::CompressOptions;

/// Compress `data` into one complete frame.
///
/// Runs a throwaway session with [`Directive::End`]; the output is the
/// same as feeding `data` to a [`Compressor`] in pieces and ending the
/// frame.
///
/// # Errors
///
/// Any error from [`Compressor::new`] or [`Compressor::compress`].
///
/// # Example
///
/// ```rust
/// use zflow_compress::{compress, CompressOptions};
///
/// let text = "the quick brown fox ".repeat(50);
/// let frame = compress(text.as_bytes(), &CompressOptions::level(3), None).unwrap();
/// assert!(frame.len() < text.len());
/// ```
pub fn compress(
    data: &[u8],
    options: &CompressOptions,
    dict: Option<Arc<Dictionary>>,
) -> Result<Vec<u8>, CompressError> {
    let session = Compressor::new(options, dict)?;
    session.compress(data, Directive::End)
}
