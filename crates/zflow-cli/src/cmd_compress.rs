/// Implementation of `zflow compress`.
///
/// Reads the input in fixed-size pieces, feeds each to one [`Compressor`]
/// with the continue directive, and ends the frame after the last piece.
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::debug;
use zflow_compress::{CompressOptions, Compressor};
use zflow_dict::Dictionary;
use zflow_engine::{CompressParameter, Directive, Strategy};

use crate::CompressArgs;

const READ_SIZE: usize = 128 * 1024;

/// Run the `zflow compress` command.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, a `--param`
/// entry is malformed or out of bounds, or the dictionary is invalid.
pub fn run(args: &CompressArgs) -> Result<()> {
    let options = build_options(args.level, &args.params)?;
    let dict = args
        .dict
        .as_ref()
        .map(|path| -> Result<Arc<Dictionary>> {
            let content =
                fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
            let dict = Dictionary::new(content)
                .with_context(|| format!("invalid dictionary {}", path.display()))?;
            Ok(Arc::new(dict))
        })
        .transpose()?;

    let session = Compressor::new(&options, dict).context("cannot start compression")?;

    let mut input = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let out_file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(out_file);

    let mut buf = vec![0u8; READ_SIZE];
    let mut read_total = 0usize;
    let mut written_total = 0usize;
    loop {
        let n = input
            .read(&mut buf)
            .with_context(|| format!("cannot read {}", args.input.display()))?;
        if n == 0 {
            break;
        }
        read_total += n;
        let chunk = session.compress(&buf[..n], Directive::Continue)?;
        written_total += chunk.len();
        out.write_all(&chunk)?;
    }
    let tail = session.flush(true)?;
    written_total += tail.len();
    out.write_all(&tail)?;
    out.flush()?;

    debug!("compressed {read_total} bytes into {written_total}");
    println!(
        "{} -> {}  ({read_total} -> {written_total} bytes)",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

/// Turn `--level` and `--param name=value` flags into session options.
fn build_options(level: Option<i32>, params: &[String]) -> Result<CompressOptions> {
    if params.is_empty() {
        return Ok(level.map_or(CompressOptions::Default, CompressOptions::Level));
    }

    let mut builder = CompressOptions::builder();
    if let Some(level) = level {
        builder = builder.set(CompressParameter::CompressionLevel, level);
    }
    for entry in params {
        let Some((name, value)) = entry.split_once('=') else {
            bail!("expected NAME=VALUE, got {entry:?}");
        };
        let param = CompressParameter::from_name(name.trim())
            .with_context(|| format!("unknown compression parameter {name:?}"))?;
        let value = value.trim();
        let value: i32 = match Strategy::from_name(value) {
            Some(strategy) if param == CompressParameter::Strategy => strategy as i32,
            _ => value
                .parse()
                .with_context(|| format!("value for {name} is not an integer"))?,
        };
        builder = builder.set(param, value);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_alone_stays_a_level() {
        assert_eq!(build_options(Some(7), &[]).unwrap(), CompressOptions::Level(7));
        assert_eq!(build_options(None, &[]).unwrap(), CompressOptions::Default);
    }

    #[test]
    fn params_are_resolved_by_name() {
        let params = vec!["windowLog=22".to_string(), "checksumflag = 1".to_string()];
        let options = build_options(Some(5), &params).unwrap();
        assert_eq!(
            options,
            CompressOptions::Parameters(vec![(100, 5), (101, 22), (201, 1)])
        );
    }

    #[test]
    fn strategy_accepts_a_name() {
        let params = vec![
            "strategy=btultra2".to_string(),
            "enableLongDistanceMatching=2".to_string(),
        ];
        assert_eq!(
            build_options(None, &params).unwrap(),
            CompressOptions::Parameters(vec![(107, 9), (160, 2)])
        );
        assert!(build_options(None, &["windowLog=btopt".to_string()]).is_err());
    }

    #[test]
    fn malformed_params_are_rejected() {
        assert!(build_options(None, &["windowLog".to_string()]).is_err());
        assert!(build_options(None, &["bogus=1".to_string()]).is_err());
        assert!(build_options(None, &["hashLog=x".to_string()]).is_err());
    }
}
