/// Implementation of `zflow params`.
///
/// # Example output
///
/// ```text
/// zstd 1.5.6  (levels -131072..=22, default 3)
///
/// Compression parameters
///   id   name                          lower     upper
/// ──────────────────────────────────────────────────────
///  100   compressionLevel            -131072        22
///  101   windowLog                        10        31
///  ...
/// ```
use anyhow::Result;
use zflow_engine::{Bounds, CodecEngine, CompressParameter, DecompressParameter, ZstdEngine};

/// Run the `zflow params` command.
///
/// # Errors
///
/// Returns an error if the engine does not report bounds for a parameter
/// in the table.
pub fn run() -> Result<()> {
    let engine = ZstdEngine;
    let (min, max) = engine.level_bounds();
    println!(
        "zstd {}  (levels {min}..={max}, default {})",
        ZstdEngine::version(),
        ZstdEngine::default_level()
    );

    println!();
    println!("Compression parameters");
    print_header();
    for param in CompressParameter::ALL {
        print_row(param.id(), param.name(), engine.compress_parameter_bounds(param)?);
    }

    println!();
    println!("Decompression parameters");
    print_header();
    for param in DecompressParameter::ALL {
        print_row(param.id(), param.name(), engine.decompress_parameter_bounds(param)?);
    }
    Ok(())
}

fn print_header() {
    println!("  id   name                          lower     upper");
    println!("{}", "─".repeat(54));
}

fn print_row(id: i32, name: &str, bounds: Bounds) {
    let (lower, upper) = bounds.into();
    println!("{id:>4}   {name:<26} {lower:>9} {upper:>9}");
}
