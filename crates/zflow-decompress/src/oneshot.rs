use std::sync::Arc;

use zflow_dict::Dictionary;

use crate::decompressor::Decompressor;
use crate::error::DecompressError;
use crate::options::DecompressOptions;

/// Decompress every frame in `data` and return the concatenated output.
///
/// Empty input decodes to empty output. Skippable frames contribute
/// nothing.
///
/// # Errors
///
/// - [`DecompressError::Truncated`] if `data` ends inside a frame.
/// - [`DecompressError::Engine`] for corrupt frames or rejected options.
/// - [`DecompressError::Dict`] if the dictionary handle cannot be built.
///
/// # Example
///
/// ```rust
/// use zflow_decompress::{decompress, DecompressOptions};
///
/// let mut data = zstd::bulk::compress(b"first ", 3).unwrap();
/// data.extend(zstd::bulk::compress(b"second", 3).unwrap());
/// let out = decompress(&data, None, &DecompressOptions::default()).unwrap();
/// assert_eq!(out, b"first second");
/// ```
pub fn decompress(
    data: &[u8],
    dict: Option<Arc<Dictionary>>,
    options: &DecompressOptions,
) -> Result<Vec<u8>, DecompressError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let session = Decompressor::new(dict, options)?;
    let out = session.decompress(data, None)?;
    if !session.at_frame_end() {
        return Err(DecompressError::Truncated);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_output() {
        assert!(decompress(b"", None, &DecompressOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn cut_frame_is_truncated() {
        let frame = zstd::bulk::compress(&[42u8; 4096], 3).unwrap();
        let err = decompress(&frame[..frame.len() - 2], None, &DecompressOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecompressError::Truncated));
    }

    #[test]
    fn unknown_magic_is_a_codec_error() {
        let err = decompress(b"0123456789abcdef", None, &DecompressOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecompressError::Engine(_)));
    }

    #[test]
    fn small_window_limit_rejects_large_frames() {
        let data = vec![1u8; 1 << 20];
        let frame = zstd::bulk::compress(&data, 3).unwrap();

        let options = DecompressOptions::new().window_log_max(10);
        assert!(decompress(&frame, None, &options).is_err());
        assert_eq!(decompress(&frame, None, &DecompressOptions::default()).unwrap(), data);
    }
}
