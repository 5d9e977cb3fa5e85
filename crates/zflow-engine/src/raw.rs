//! Compression context and dictionary held through the raw zstd API.
//!
//! Parameters go to the engine as the caller's integer, so tri-state
//! values such as `enableLongDistanceMatching = 2` (disable) reach it
//! unchanged.

use std::ffi::c_void;
use std::ptr::NonNull;

use zstd_sys::{
    ZSTD_CCtx, ZSTD_CDict, ZSTD_EndDirective, ZSTD_ResetDirective, ZSTD_cParameter,
    ZSTD_inBuffer, ZSTD_outBuffer,
};

use crate::error::EngineError;
use crate::zstd_engine::check;

/// Owned `ZSTD_CCtx`.
pub struct ZstdCCtx(NonNull<ZSTD_CCtx>);

// SAFETY: a compression context has no thread affinity, and every call
// that touches it goes through `&mut self`.
unsafe impl Send for ZstdCCtx {}

impl ZstdCCtx {
    pub(crate) fn create() -> Option<Self> {
        // SAFETY: plain allocation; a null return is handled.
        NonNull::new(unsafe { zstd_sys::ZSTD_createCCtx() }).map(Self)
    }

    pub(crate) fn reset(&mut self, directive: ZSTD_ResetDirective) -> Result<(), EngineError> {
        // SAFETY: the pointer stays valid for the lifetime of `self`.
        check(unsafe { zstd_sys::ZSTD_CCtx_reset(self.0.as_ptr(), directive) })?;
        Ok(())
    }

    pub(crate) fn set_parameter(
        &mut self,
        param: ZSTD_cParameter,
        value: i32,
    ) -> Result<(), EngineError> {
        // SAFETY: as above; the engine range-checks `value` itself.
        check(unsafe { zstd_sys::ZSTD_CCtx_setParameter(self.0.as_ptr(), param, value) })?;
        Ok(())
    }

    /// Reference `dict` for the following frames. The context keeps the
    /// pointer until the next reset, so `dict` must outlive that.
    pub(crate) fn ref_dict(&mut self, dict: &ZstdCDict) -> Result<(), EngineError> {
        // SAFETY: both pointers are live; the caller keeps `dict` alive.
        check(unsafe { zstd_sys::ZSTD_CCtx_refCDict(self.0.as_ptr(), dict.0.as_ptr()) })?;
        Ok(())
    }

    /// One `ZSTD_compressStream2` call, returning
    /// `(consumed, produced, remaining)`.
    pub(crate) fn stream(
        &mut self,
        output: &mut [u8],
        input: &[u8],
        end: ZSTD_EndDirective,
    ) -> Result<(usize, usize, usize), EngineError> {
        let mut out = ZSTD_outBuffer {
            dst: output.as_mut_ptr().cast::<c_void>(),
            size: output.len(),
            pos: 0,
        };
        let mut inp = ZSTD_inBuffer {
            src: input.as_ptr().cast::<c_void>(),
            size: input.len(),
            pos: 0,
        };
        // SAFETY: the buffers describe slices borrowed for this call; the
        // engine writes at most `output.len()` bytes and reads at most
        // `input.len()`.
        let remaining = check(unsafe {
            zstd_sys::ZSTD_compressStream2(self.0.as_ptr(), &mut out, &mut inp, end)
        })?;
        Ok((inp.pos, out.pos, remaining))
    }
}

impl Drop for ZstdCCtx {
    fn drop(&mut self) {
        // SAFETY: created by ZSTD_createCCtx and freed once.
        unsafe {
            zstd_sys::ZSTD_freeCCtx(self.0.as_ptr());
        }
    }
}

/// Owned `ZSTD_CDict`, digested for one compression level.
pub struct ZstdCDict(NonNull<ZSTD_CDict>);

// SAFETY: a CDict is read-only once created and zstd allows many
// contexts to reference it from different threads.
unsafe impl Send for ZstdCDict {}
unsafe impl Sync for ZstdCDict {}

impl std::fmt::Debug for ZstdCDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ZstdCDict").field(&self.0).finish()
    }
}

impl ZstdCDict {
    pub(crate) fn create(content: &[u8], level: i32) -> Option<Self> {
        // SAFETY: zstd copies `content` into the dictionary.
        let ptr = unsafe {
            zstd_sys::ZSTD_createCDict(content.as_ptr().cast::<c_void>(), content.len(), level)
        };
        NonNull::new(ptr).map(Self)
    }
}

impl Drop for ZstdCDict {
    fn drop(&mut self) {
        // SAFETY: created by ZSTD_createCDict and freed once.
        unsafe {
            zstd_sys::ZSTD_freeCDict(self.0.as_ptr());
        }
    }
}
