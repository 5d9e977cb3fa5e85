use zflow_engine::{CodecEngine, DecompressParameter, EngineError};

/// Advanced decompression parameters, applied in order.
///
/// Keys are raw ids so that unknown ones are reported by position rather
/// than dropped.
///
/// ```rust
/// use zflow_decompress::DecompressOptions;
///
/// let options = DecompressOptions::new().window_log_max(27);
/// assert_eq!(options.params(), &[(100, 27)]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecompressOptions {
    params: Vec<(i32, i32)>,
}

impl DecompressOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse frames whose window is larger than `2^log` bytes.
    #[must_use]
    pub fn window_log_max(self, log: i32) -> Self {
        self.set(DecompressParameter::WindowLogMax, log)
    }

    #[must_use]
    pub fn set(mut self, param: DecompressParameter, value: i32) -> Self {
        self.params.push((param.id(), value));
        self
    }

    #[must_use]
    pub fn set_raw(mut self, key: i32, value: i32) -> Self {
        self.params.push((key, value));
        self
    }

    #[must_use]
    pub fn params(&self) -> &[(i32, i32)] {
        &self.params
    }
}

impl From<Vec<(i32, i32)>> for DecompressOptions {
    fn from(params: Vec<(i32, i32)>) -> Self {
        Self { params }
    }
}

/// Options that passed the table and bounds checks, ready to apply.
#[derive(Debug)]
pub(crate) struct Validated {
    params: Vec<(DecompressParameter, i32)>,
}

impl Validated {
    /// Apply every parameter, in order, to a freshly reset context.
    pub(crate) fn apply<E: CodecEngine>(
        &self,
        engine: &E,
        ctx: &mut E::DecompressContext,
    ) -> Result<(), EngineError> {
        for &(param, value) in &self.params {
            engine.set_decompress_parameter(ctx, param, value)?;
        }
        Ok(())
    }
}

/// Check every pair against the table and the engine's bounds without
/// touching any context.
pub(crate) fn validate<E: CodecEngine>(
    engine: &E,
    options: &DecompressOptions,
) -> Result<Validated, EngineError> {
    let mut params = Vec::with_capacity(options.params.len());
    for (i, &(key, value)) in options.params.iter().enumerate() {
        let param = DecompressParameter::from_id(key)
            .ok_or_else(|| EngineError::unknown_parameter("decompress", i + 1, key))?;
        let bounds = engine.decompress_parameter_bounds(param)?;
        if !bounds.contains(value) {
            return Err(EngineError::parameter_out_of_bounds(
                "decompress",
                param.name(),
                bounds,
                value,
            ));
        }
        params.push((param, value));
    }
    Ok(Validated { params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zflow_engine::ZstdEngine;

    fn apply_fresh(options: &DecompressOptions) -> Result<(), EngineError> {
        let engine = ZstdEngine;
        let validated = validate(&engine, options)?;
        let mut ctx = engine.create_decompress_context().unwrap();
        validated.apply(&engine, &mut ctx)
    }

    #[test]
    fn window_log_max_in_range_is_accepted() {
        apply_fresh(&DecompressOptions::new().window_log_max(20)).unwrap();
    }

    #[test]
    fn tiny_window_is_out_of_bounds() {
        let err = apply_fresh(&DecompressOptions::new().window_log_max(3)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("invalid zstd decompress parameter \"windowLogMax\": should be 10 <= value <= "));
        assert!(msg.ends_with("provided value is 3"));
    }

    #[test]
    fn compression_keys_are_unknown_here() {
        let options = DecompressOptions::from(vec![(100, 20), (201, 1)]);
        let err = apply_fresh(&options).unwrap_err();
        assert_eq!(err.to_string(), "decompress parameter #2 (key 201) is invalid");
    }
}
