/// Implementation of `zflow train`.
use std::fs;

use anyhow::{Context, Result};
use zflow_dict::{Dictionary, train_from_samples};

use crate::TrainArgs;

/// Run the `zflow train` command.
///
/// # Errors
///
/// Returns an error if a sample cannot be read, the trainer cannot learn
/// from the samples, or the output cannot be written.
pub fn run(args: &TrainArgs) -> Result<()> {
    let samples = args
        .samples
        .iter()
        .map(|path| fs::read(path).with_context(|| format!("cannot read {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    let total: usize = samples.iter().map(Vec::len).sum();

    let content = train_from_samples(&samples, args.size)
        .with_context(|| format!("training on {} samples failed", samples.len()))?;
    let dict = Dictionary::new(content).context("trainer produced an invalid dictionary")?;

    fs::write(&args.output, dict.content())
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    println!(
        "{dict}  from {} samples ({total} bytes) -> {}",
        samples.len(),
        args.output.display()
    );
    Ok(())
}
