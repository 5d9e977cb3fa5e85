/// Implementation of `zflow info`.
///
/// Walks the frames of a compressed file and reports each frame's header.
///
/// # Example output
///
/// ```text
/// File:    /tmp/logs.zst  (48213 bytes, 2 frames)
///
/// Frame   Offset   Compressed   Content size   Dict id
/// ───────────────────────────────────────────────────────
///     0        0        40110         812345         0
///     1    40110         8103        unknown    311025
/// ```
use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use zflow_engine::{frame_info, frame_size};

use crate::InfoArgs;

#[derive(Serialize)]
struct FrameReport {
    index: usize,
    offset: usize,
    compressed_size: usize,
    content_size: Option<u64>,
    dict_id: u32,
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    size: usize,
    frames: Vec<FrameReport>,
}

/// Run the `zflow info` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not consist of
/// complete frames.
pub fn run(args: &InfoArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let frames = scan_frames(&bytes)?;
    let report = FileReport {
        file: args.file.display().to_string(),
        size: bytes.len(),
        frames,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "File:    {}  ({} bytes, {} frames)",
        report.file,
        report.size,
        report.frames.len()
    );
    println!();
    println!("Frame   Offset   Compressed   Content size   Dict id");
    println!("{}", "─".repeat(55));
    for f in &report.frames {
        let content = f
            .content_size
            .map_or_else(|| "unknown".to_string(), |n| n.to_string());
        println!(
            "{:>5} {:>8} {:>12} {:>14} {:>9}",
            f.index, f.offset, f.compressed_size, content, f.dict_id
        );
    }
    Ok(())
}

fn scan_frames(bytes: &[u8]) -> Result<Vec<FrameReport>> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let compressed_size =
            frame_size(rest).with_context(|| format!("incomplete frame at offset {offset}"))?;
        // Skippable frames have no regular header; report them with no size.
        let info = frame_info(rest).ok();
        frames.push(FrameReport {
            index: frames.len(),
            offset,
            compressed_size,
            content_size: info.and_then(|i| i.content_size),
            dict_id: info.map_or(0, |i| i.dict_id),
        });
        offset += compressed_size;
    }
    Ok(frames)
}
