//! Read-only queries over a raw frame header.

use std::ffi::c_void;

use crate::error::EngineError;

const CONTENTSIZE_UNKNOWN: u64 = u64::MAX;
const CONTENTSIZE_ERROR: u64 = u64::MAX - 1;

/// What a frame header declares about its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// Decompressed size, `None` when the header omits it (streamed frames).
    pub content_size: Option<u64>,
    /// Dictionary the frame was compressed with, 0 for none or not recorded.
    pub dict_id: u32,
}

/// Parse the header at the start of `header`.
///
/// # Errors
///
/// [`EngineError::InvalidFrameHeader`] if `header` does not begin with a
/// frame or is shorter than the frame header.
pub fn frame_info(header: &[u8]) -> Result<FrameInfo, EngineError> {
    // SAFETY: the pointer and length describe a live, initialised slice
    // that the engine only reads.
    let size = unsafe {
        zstd_sys::ZSTD_getFrameContentSize(header.as_ptr().cast::<c_void>(), header.len())
    };
    let content_size = match size {
        CONTENTSIZE_ERROR => return Err(EngineError::InvalidFrameHeader { len: header.len() }),
        CONTENTSIZE_UNKNOWN => None,
        n => Some(n),
    };

    // SAFETY: as above.
    let dict_id = unsafe {
        zstd_sys::ZSTD_getDictID_fromFrame(header.as_ptr().cast::<c_void>(), header.len())
    };

    Ok(FrameInfo {
        content_size,
        dict_id,
    })
}

/// Compressed size of the first complete frame in `data`, including any
/// skippable frame.
///
/// # Errors
///
/// [`EngineError::Codec`] if `data` does not hold a whole frame.
pub fn frame_size(data: &[u8]) -> Result<usize, EngineError> {
    // SAFETY: the pointer and length describe a live, initialised slice
    // that the engine only reads.
    let code = unsafe {
        zstd_sys::ZSTD_findFrameCompressedSize(data.as_ptr().cast::<c_void>(), data.len())
    };
    crate::zstd_engine::check(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_frames_record_their_size() {
        let frame = zstd::bulk::compress(b"hello hello hello", 3).unwrap();
        let info = frame_info(&frame).unwrap();
        assert_eq!(info.content_size, Some(17));
        assert_eq!(info.dict_id, 0);
        assert_eq!(frame_size(&frame).unwrap(), frame.len());
    }

    #[test]
    fn frame_size_stops_at_the_first_frame() {
        let mut data = zstd::bulk::compress(b"first", 1).unwrap();
        let first = data.len();
        data.extend(zstd::bulk::compress(b"second", 1).unwrap());
        assert_eq!(frame_size(&data).unwrap(), first);
    }

    #[test]
    fn garbage_is_not_a_frame() {
        let err = frame_info(b"definitely not zstd").unwrap_err();
        assert!(matches!(err, EngineError::InvalidFrameHeader { len: 19 }));
        assert!(frame_size(b"nope").is_err());
    }
}
