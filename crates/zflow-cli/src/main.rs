/// zflow command-line tool: compress, decompress, train dictionaries and
/// inspect zstd frames through the zflow session stack.
///
/// # Command overview
///
/// ```text
/// zflow <COMMAND> [OPTIONS]
///
/// Commands:
///   compress    Compress a file into one zstd frame
///   decompress  Decompress a file of one or more zstd frames
///   train       Train a dictionary from sample files
///   info        Print frame header details of a compressed file
///   params      Print parameter bounds, level range and engine version
///   help        Print help information
///
/// Global options:
///   -v, --verbose    Log session and dictionary activity to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// `RUST_LOG` overrides the log filter chosen by `--verbose`.
///
/// # Exit codes
///
/// | Code | Meaning                                      |
/// |------|----------------------------------------------|
/// | 0    | Success                                      |
/// | 1    | Error (I/O failure, corrupt frame, bad flag) |
use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::LevelFilter;

mod cmd_compress;
mod cmd_decompress;
mod cmd_info;
mod cmd_params;
mod cmd_train;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Streaming zstd compression with dictionaries and advanced parameters.
#[derive(Parser)]
#[command(name = "zflow", version, about = "zstd streaming compression CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log session and dictionary activity (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into one zstd frame.
    Compress(CompressArgs),
    /// Decompress a file of one or more zstd frames.
    Decompress(DecompressArgs),
    /// Train a dictionary from sample files.
    Train(TrainArgs),
    /// Print frame header details of a compressed file.
    Info(InfoArgs),
    /// Print parameter bounds, level range and engine version.
    Params,
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `zflow compress`.
///
/// The input is streamed through one compression session in fixed-size
/// reads, so memory use does not depend on the file size.
///
/// ```text
/// ┌───────────────────┬──────────────────────────────────────────────────┐
/// │ Flag              │ Effect                                           │
/// ├───────────────────┼──────────────────────────────────────────────────┤
/// │ --level N         │ Compression level (negative = faster)            │
/// │ --param name=val  │ Advanced parameter, repeatable, applied in order │
/// │ --dict FILE       │ Compress with a trained dictionary               │
/// └───────────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// `--level` and `--param` may be combined; the level is applied first.
#[derive(clap::Args)]
pub struct CompressArgs {
    /// File to compress.
    pub input: PathBuf,

    /// Output file path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Compression level.
    #[arg(short, long, allow_hyphen_values = true)]
    pub level: Option<i32>,

    /// Advanced parameter as `name=value`, e.g. `windowLog=24`. `strategy`
    /// also takes a name such as `btultra2`.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Dictionary file produced by `zflow train`.
    #[arg(long)]
    pub dict: Option<PathBuf>,
}

/// Arguments for `zflow decompress`.
#[derive(clap::Args)]
pub struct DecompressArgs {
    /// File to decompress.
    pub input: PathBuf,

    /// Output file path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Dictionary the input was compressed with.
    #[arg(long)]
    pub dict: Option<PathBuf>,

    /// Refuse frames whose window exceeds `2^N` bytes.
    #[arg(long)]
    pub window_log_max: Option<i32>,
}

/// Arguments for `zflow train`.
///
/// Each sample file is one training sample. Many small, similar samples
/// train better than a few large ones.
#[derive(clap::Args)]
pub struct TrainArgs {
    /// Sample files.
    #[arg(required = true)]
    pub samples: Vec<PathBuf>,

    /// Output dictionary path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Maximum dictionary size in bytes.
    #[arg(long, default_value_t = zflow_dict::DEFAULT_DICT_SIZE)]
    pub size: usize,
}

/// Arguments for `zflow info`.
#[derive(clap::Args)]
pub struct InfoArgs {
    /// Compressed file to inspect.
    pub file: PathBuf,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    builder.parse_env("RUST_LOG");
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    let _ = builder.try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compress(args) => cmd_compress::run(&args),
        Commands::Decompress(args) => cmd_decompress::run(&args),
        Commands::Train(args) => cmd_train::run(&args),
        Commands::Info(args) => cmd_info::run(&args),
        Commands::Params => cmd_params::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
