use log::debug;
use zflow_engine::{CodecEngine, ZstdEngine};

use crate::error::DictError;

/// Dictionary size used when the caller does not pick one (110 KiB).
pub const DEFAULT_DICT_SIZE: usize = 112_640;

/// Train a dictionary with the zstd engine.
///
/// `corpus` is the concatenation of all samples and `chunk_sizes` lists
/// each sample's length in order.
///
/// # Errors
///
/// - [`DictError::InvalidTrainingInput`] if the chunk table does not add
///   up to `corpus.len()`, has more than `u32::MAX` entries, or
///   `dict_size` is 0.
/// - [`DictError::Engine`] if the trainer cannot learn from the corpus
///   (too few or too uniform samples).
pub fn train_dictionary(
    corpus: &[u8],
    chunk_sizes: &[usize],
    dict_size: usize,
) -> Result<Vec<u8>, DictError> {
    train_dictionary_with(&ZstdEngine, corpus, chunk_sizes, dict_size)
}

/// [`train_dictionary`] with an explicit engine.
///
/// # Errors
///
/// See [`train_dictionary`].
pub fn train_dictionary_with<E: CodecEngine>(
    engine: &E,
    corpus: &[u8],
    chunk_sizes: &[usize],
    dict_size: usize,
) -> Result<Vec<u8>, DictError> {
    if u32::try_from(chunk_sizes.len()).is_err() {
        return Err(DictError::InvalidTrainingInput {
            reason: format!(
                "{} samples exceed the trainer limit of {}",
                chunk_sizes.len(),
                u32::MAX
            ),
        });
    }
    if dict_size == 0 {
        return Err(DictError::InvalidTrainingInput {
            reason: "dictionary size must be positive".to_string(),
        });
    }
    let total = chunk_sizes
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))
        .ok_or_else(|| DictError::InvalidTrainingInput {
            reason: "sample sizes overflow".to_string(),
        })?;
    if total != corpus.len() {
        return Err(DictError::InvalidTrainingInput {
            reason: format!(
                "sample sizes add up to {total} bytes but the corpus has {}",
                corpus.len()
            ),
        });
    }

    debug!(
        "training {dict_size}-byte dictionary from {} samples ({total} bytes)",
        chunk_sizes.len()
    );
    let dict = engine.train_dictionary(corpus, chunk_sizes, dict_size)?;
    debug!("trained dictionary of {} bytes", dict.len());
    Ok(dict)
}

/// Train from individual samples, concatenating them first.
///
/// # Errors
///
/// See [`train_dictionary`].
pub fn train_from_samples<I, S>(samples: I, dict_size: usize) -> Result<Vec<u8>, DictError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut corpus = Vec::new();
    let mut sizes = Vec::new();
    for sample in samples {
        let sample = sample.as_ref();
        corpus.extend_from_slice(sample);
        sizes.push(sample.len());
    }
    train_dictionary(&corpus, &sizes, dict_size)
}
