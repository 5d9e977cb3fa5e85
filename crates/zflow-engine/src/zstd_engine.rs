use zstd_safe::{DCtx, DDict, DParameter, InBuffer, OutBuffer, ResetDirective};
use zstd_sys::{ZSTD_EndDirective, ZSTD_ResetDirective, ZSTD_cParameter, ZSTD_dParameter};

use crate::engine::{CodecEngine, Directive, StepOutcome};
use crate::error::EngineError;
use crate::params::{Bounds, CompressParameter, DecompressParameter};
use crate::raw::{ZstdCCtx, ZstdCDict};

/// Level the engine picks when asked for level 0.
pub const DEFAULT_LEVEL: i32 = 3;

/// [`CodecEngine`] backed by the reference zstd library.
///
/// Stateless: every piece of codec state lives in the contexts and
/// dictionary handles it creates, so the engine itself is a zero-sized
/// `Copy` value.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZstdEngine;

impl ZstdEngine {
    /// Library version as text, e.g. `"1.5.6"`.
    #[must_use]
    pub fn version() -> &'static str {
        zstd_safe::version_string()
    }

    /// Library version as `(major, minor, release)`.
    #[must_use]
    pub fn version_info() -> (u32, u32, u32) {
        let n = zstd_safe::version_number();
        (n / 10_000, n / 100 % 100, n % 100)
    }

    #[must_use]
    pub fn default_level() -> i32 {
        DEFAULT_LEVEL
    }

    /// Bounds of the compression parameter with raw id `key`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] when `key` names no compression parameter.
    pub fn compress_bounds_by_id(self, key: i32) -> Result<Bounds, EngineError> {
        let param = CompressParameter::from_id(key).ok_or_else(|| unsupported(key))?;
        self.compress_parameter_bounds(param)
    }

    /// Bounds of the decompression parameter with raw id `key`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Codec`] when `key` names no decompression parameter.
    pub fn decompress_bounds_by_id(self, key: i32) -> Result<Bounds, EngineError> {
        let param = DecompressParameter::from_id(key).ok_or_else(|| unsupported(key))?;
        self.decompress_parameter_bounds(param)
    }
}

fn codec_error(code: usize) -> EngineError {
    EngineError::codec(zstd_safe::get_error_name(code))
}

/// Turn a raw engine return code into a `Result`.
pub(crate) fn check(code: usize) -> Result<usize, EngineError> {
    // SAFETY: ZSTD_isError only inspects the integer.
    if unsafe { zstd_sys::ZSTD_isError(code) } == 0 {
        Ok(code)
    } else {
        Err(codec_error(code))
    }
}

fn unsupported(key: i32) -> EngineError {
    EngineError::codec(format!("Unsupported parameter (key {key})"))
}

fn out_of_bound(param: impl std::fmt::Display, value: i32) -> EngineError {
    EngineError::codec(format!("Parameter is out of bound ({param} = {value})"))
}

fn raw_cparameter(param: CompressParameter) -> ZSTD_cParameter {
    use CompressParameter as P;
    match param {
        P::CompressionLevel => ZSTD_cParameter::ZSTD_c_compressionLevel,
        P::WindowLog => ZSTD_cParameter::ZSTD_c_windowLog,
        P::HashLog => ZSTD_cParameter::ZSTD_c_hashLog,
        P::ChainLog => ZSTD_cParameter::ZSTD_c_chainLog,
        P::SearchLog => ZSTD_cParameter::ZSTD_c_searchLog,
        P::MinMatch => ZSTD_cParameter::ZSTD_c_minMatch,
        P::TargetLength => ZSTD_cParameter::ZSTD_c_targetLength,
        P::Strategy => ZSTD_cParameter::ZSTD_c_strategy,
        P::EnableLongDistanceMatching => ZSTD_cParameter::ZSTD_c_enableLongDistanceMatching,
        P::LdmHashLog => ZSTD_cParameter::ZSTD_c_ldmHashLog,
        P::LdmMinMatch => ZSTD_cParameter::ZSTD_c_ldmMinMatch,
        P::LdmBucketSizeLog => ZSTD_cParameter::ZSTD_c_ldmBucketSizeLog,
        P::LdmHashRateLog => ZSTD_cParameter::ZSTD_c_ldmHashRateLog,
        P::ContentSizeFlag => ZSTD_cParameter::ZSTD_c_contentSizeFlag,
        P::ChecksumFlag => ZSTD_cParameter::ZSTD_c_checksumFlag,
        P::DictIdFlag => ZSTD_cParameter::ZSTD_c_dictIDFlag,
    }
}

fn end_directive(directive: Directive) -> ZSTD_EndDirective {
    match directive {
        Directive::Continue => ZSTD_EndDirective::ZSTD_e_continue,
        Directive::Flush => ZSTD_EndDirective::ZSTD_e_flush,
        Directive::End => ZSTD_EndDirective::ZSTD_e_end,
    }
}

impl CodecEngine for ZstdEngine {
    type CompressContext = ZstdCCtx;
    type DecompressContext = DCtx<'static>;
    type CompressDict = ZstdCDict;
    type DecompressDict = DDict<'static>;

    fn create_compress_context(&self) -> Result<Self::CompressContext, EngineError> {
        ZstdCCtx::create().ok_or(EngineError::ContextCreation {
            kind: "compression",
        })
    }

    fn create_decompress_context(&self) -> Result<Self::DecompressContext, EngineError> {
        DCtx::try_create().ok_or(EngineError::ContextCreation {
            kind: "decompression",
        })
    }

    fn reset_compress_context(&self, ctx: &mut Self::CompressContext) -> Result<(), EngineError> {
        ctx.reset(ZSTD_ResetDirective::ZSTD_reset_session_and_parameters)
    }

    fn reset_decompress_context(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError> {
        ctx.reset(ResetDirective::SessionAndParameters)
            .map_err(codec_error)?;
        Ok(())
    }

    fn reset_compress_session(&self, ctx: &mut Self::CompressContext) -> Result<(), EngineError> {
        ctx.reset(ZSTD_ResetDirective::ZSTD_reset_session_only)
    }

    fn reset_decompress_session(
        &self,
        ctx: &mut Self::DecompressContext,
    ) -> Result<(), EngineError> {
        ctx.reset(ResetDirective::SessionOnly).map_err(codec_error)?;
        Ok(())
    }

    fn set_compress_parameter(
        &self,
        ctx: &mut Self::CompressContext,
        param: CompressParameter,
        value: i32,
    ) -> Result<(), EngineError> {
        ctx.set_parameter(raw_cparameter(param), value)
    }

    fn set_decompress_parameter(
        &self,
        ctx: &mut Self::DecompressContext,
        param: DecompressParameter,
        value: i32,
    ) -> Result<(), EngineError> {
        let p = match param {
            DecompressParameter::WindowLogMax => DParameter::WindowLogMax(
                u32::try_from(value).map_err(|_| out_of_bound(param, value))?,
            ),
        };
        ctx.set_parameter(p).map_err(codec_error)?;
        Ok(())
    }

    fn compress_parameter_bounds(&self, param: CompressParameter) -> Result<Bounds, EngineError> {
        // SAFETY: the argument is a valid enum value; the call is pure.
        let b = unsafe { zstd_sys::ZSTD_cParam_getBounds(raw_cparameter(param)) };
        check(b.error)?;
        Ok(Bounds {
            lower: b.lowerBound,
            upper: b.upperBound,
        })
    }

    fn decompress_parameter_bounds(
        &self,
        param: DecompressParameter,
    ) -> Result<Bounds, EngineError> {
        let raw = match param {
            DecompressParameter::WindowLogMax => ZSTD_dParameter::ZSTD_d_windowLogMax,
        };
        // SAFETY: the argument is a valid enum value; the call is pure.
        let b = unsafe { zstd_sys::ZSTD_dParam_getBounds(raw) };
        check(b.error)?;
        Ok(Bounds {
            lower: b.lowerBound,
            upper: b.upperBound,
        })
    }

    fn build_compress_dict(
        &self,
        content: &[u8],
        level: i32,
    ) -> Result<Self::CompressDict, EngineError> {
        ZstdCDict::create(content, level).ok_or_else(|| {
            EngineError::codec(format!(
                "failed to create compression dictionary at level {level}"
            ))
        })
    }

    fn build_decompress_dict(&self, content: &[u8]) -> Result<Self::DecompressDict, EngineError> {
        DDict::try_create(content)
            .ok_or_else(|| EngineError::codec("failed to create decompression dictionary"))
    }

    fn attach_compress_dict(
        &self,
        ctx: &mut Self::CompressContext,
        dict: &Self::CompressDict,
    ) -> Result<(), EngineError> {
        ctx.ref_dict(dict)
    }

    fn attach_decompress_dict(
        &self,
        ctx: &mut Self::DecompressContext,
        dict: &Self::DecompressDict,
    ) -> Result<(), EngineError> {
        ctx.ref_ddict(dict).map_err(codec_error)?;
        Ok(())
    }

    fn compress_step(
        &self,
        ctx: &mut Self::CompressContext,
        output: &mut [u8],
        input: &[u8],
        directive: Directive,
    ) -> Result<StepOutcome, EngineError> {
        let (consumed, produced, remaining) =
            ctx.stream(output, input, end_directive(directive))?;
        Ok(StepOutcome {
            consumed,
            produced,
            remaining,
        })
    }

    fn decompress_step(
        &self,
        ctx: &mut Self::DecompressContext,
        output: &mut [u8],
        input: &[u8],
    ) -> Result<StepOutcome, EngineError> {
        let mut out = OutBuffer::around(output);
        let mut inp = InBuffer::around(input);
        let remaining = ctx
            .decompress_stream(&mut out, &mut inp)
            .map_err(codec_error)?;
        Ok(StepOutcome {
            consumed: inp.pos(),
            produced: out.pos(),
            remaining,
        })
    }

    fn level_bounds(&self) -> (i32, i32) {
        (zstd_safe::min_c_level(), zstd_safe::max_c_level())
    }

    fn dictionary_id(&self, content: &[u8]) -> u32 {
        // SAFETY: the pointer and length describe a live slice that the
        // engine only reads.
        unsafe {
            zstd_sys::ZSTD_getDictID_fromDict(content.as_ptr().cast(), content.len())
        }
    }

    fn train_dictionary(
        &self,
        corpus: &[u8],
        chunk_sizes: &[usize],
        dict_size: usize,
    ) -> Result<Vec<u8>, EngineError> {
        zstd::dict::from_continuous(corpus, chunk_sizes, dict_size)
            .map_err(|e| EngineError::codec(e.to_string()))
    }
}
