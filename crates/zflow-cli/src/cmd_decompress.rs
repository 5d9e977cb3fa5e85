/// Implementation of `zflow decompress`.
///
/// Streams the input through one [`Decompressor`], capping each call's
/// output so that a highly compressed file never expands in memory all
/// at once.
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::debug;
use zflow_decompress::{DecompressOptions, Decompressor};
use zflow_dict::Dictionary;

use crate::DecompressArgs;

const READ_SIZE: usize = 128 * 1024;
const MAX_OUTPUT: usize = 1024 * 1024;

/// Run the `zflow decompress` command.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, the input is
/// corrupt or truncated, or the dictionary is invalid or does not match.
pub fn run(args: &DecompressArgs) -> Result<()> {
    let mut options = DecompressOptions::new();
    if let Some(log) = args.window_log_max {
        options = options.window_log_max(log);
    }
    let dict = match &args.dict {
        Some(path) => {
            let content =
                fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
            let dict = Dictionary::new(content)
                .with_context(|| format!("invalid dictionary {}", path.display()))?;
            Some(Arc::new(dict))
        }
        None => None,
    };

    let session = Decompressor::new(dict, &options).context("cannot start decompression")?;

    let mut input = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let out_file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(out_file);

    let mut buf = vec![0u8; READ_SIZE];
    let mut read_total = 0usize;
    let mut written_total = 0usize;
    loop {
        let n = if session.needs_input() {
            let n = input
                .read(&mut buf)
                .with_context(|| format!("cannot read {}", args.input.display()))?;
            if n == 0 {
                break;
            }
            n
        } else {
            0
        };
        read_total += n;
        let chunk = session
            .decompress(&buf[..n], Some(MAX_OUTPUT))
            .with_context(|| format!("corrupt input after {read_total} bytes"))?;
        written_total += chunk.len();
        out.write_all(&chunk)?;
    }
    out.flush()?;

    if read_total > 0 && !session.at_frame_end() {
        bail!("{} ends inside a frame", args.input.display());
    }

    debug!("decompressed {read_total} bytes into {written_total}");
    println!(
        "{} -> {}  ({read_total} -> {written_total} bytes)",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
