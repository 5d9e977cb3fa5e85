use zflow_engine::{CodecEngine, CompressParameter, EngineError};

/// How a compression session is configured.
///
/// `Parameters` keeps raw `(key, value)` pairs so that keys outside the
/// known table still reach validation and are reported by position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CompressOptions {
    /// Engine defaults (level 0, which the engine treats as level 3).
    #[default]
    Default,
    /// A single compression level. The engine clamps it to its range.
    Level(i32),
    /// Advanced parameters applied in order.
    Parameters(Vec<(i32, i32)>),
}

impl CompressOptions {
    #[must_use]
    pub fn level(level: i32) -> Self {
        Self::Level(level)
    }

    #[must_use]
    pub fn builder() -> CompressOptionsBuilder {
        CompressOptionsBuilder::default()
    }
}

/// Typed builder for [`CompressOptions::Parameters`].
///
/// ```rust
/// use zflow_compress::CompressOptions;
/// use zflow_engine::CompressParameter;
///
/// let options = CompressOptions::builder()
///     .set(CompressParameter::CompressionLevel, 9)
///     .set(CompressParameter::ChecksumFlag, 1)
///     .build();
/// assert_eq!(options, CompressOptions::Parameters(vec![(100, 9), (201, 1)]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CompressOptionsBuilder {
    params: Vec<(i32, i32)>,
}

impl CompressOptionsBuilder {
    #[must_use]
    pub fn set(mut self, param: CompressParameter, value: i32) -> Self {
        self.params.push((param.id(), value));
        self
    }

    /// Add a pair by raw key, for ids the typed table does not cover.
    #[must_use]
    pub fn set_raw(mut self, key: i32, value: i32) -> Self {
        self.params.push((key, value));
        self
    }

    #[must_use]
    pub fn build(self) -> CompressOptions {
        CompressOptions::Parameters(self.params)
    }
}

/// Options that passed the table and bounds checks, ready to apply.
///
/// Checking happens before the session touches its context, so a rejected
/// option leaves the session exactly as it was.
#[derive(Debug)]
pub(crate) struct Validated {
    params: Vec<(CompressParameter, i32)>,
    level: i32,
}

impl Validated {
    /// Effective compression level, which selects the dictionary handle.
    pub(crate) fn level(&self) -> i32 {
        self.level
    }

    /// Apply every parameter, in order, to a freshly reset context.
    pub(crate) fn apply<E: CodecEngine>(
        &self,
        engine: &E,
        ctx: &mut E::CompressContext,
    ) -> Result<(), EngineError> {
        for &(param, value) in &self.params {
            engine.set_compress_parameter(ctx, param, value)?;
        }
        Ok(())
    }
}

/// Check `options` without touching any context.
///
/// Each parameter pair is checked against the table and the engine's
/// bounds. The last `compressionLevel` pair wins; without one the level
/// is 0. A bare level is left for the engine to clamp.
pub(crate) fn validate<E: CodecEngine>(
    engine: &E,
    options: &CompressOptions,
) -> Result<Validated, EngineError> {
    match options {
        CompressOptions::Default => Ok(Validated {
            params: Vec::new(),
            level: 0,
        }),
        CompressOptions::Level(level) => Ok(Validated {
            params: vec![(CompressParameter::CompressionLevel, *level)],
            level: *level,
        }),
        CompressOptions::Parameters(pairs) => {
            let mut params = Vec::with_capacity(pairs.len());
            let mut level = 0;
            for (i, &(key, value)) in pairs.iter().enumerate() {
                let param = CompressParameter::from_id(key)
                    .ok_or_else(|| EngineError::unknown_parameter("compress", i + 1, key))?;
                let bounds = engine.compress_parameter_bounds(param)?;
                if !bounds.contains(value) {
                    return Err(EngineError::parameter_out_of_bounds(
                        "compress",
                        param.name(),
                        bounds,
                        value,
                    ));
                }
                if param == CompressParameter::CompressionLevel {
                    level = value;
                }
                params.push((param, value));
            }
            Ok(Validated { params, level })
        }
    }
}
