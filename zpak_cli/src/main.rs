use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgAction, ArgGroup, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use zpak_codecs::{DeflateCodec, BEST_LEVEL, DEFAULT_CHUNK_SIZE};
use zpak_core::{Codec, Mode, Report, TranscodeConfig};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zpak",
    about = "Compress or decompress a single file into a size-prefixed zlib container",
    version
)]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "decompress"])))]
struct Cli {
    /// Input file
    #[arg(short = 'i', value_name = "FILE", allow_hyphen_values = true)]
    input: PathBuf,
    /// Output file
    #[arg(short = 'o', value_name = "FILE", allow_hyphen_values = true)]
    output: PathBuf,
    /// Compress the input file
    #[arg(short = 'c', long)]
    compress: bool,
    /// Decompress the input file
    #[arg(short = 'd', long)]
    decompress: bool,
    /// Compression level (0 = store, 9 = smallest)
    #[arg(
        short,
        long,
        default_value_t = BEST_LEVEL,
        value_parser = clap::value_parser!(u32).range(0..=9)
    )]
    level: u32,
    /// Scratch chunk drained from the codec per step, in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Do not print the summary
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> TranscodeConfig {
        let mode = if self.compress {
            Mode::Compress
        } else {
            Mode::Decompress
        };
        TranscodeConfig::new(&self.input, &self.output, mode)
    }

    fn codec(&self) -> anyhow::Result<DeflateCodec> {
        DeflateCodec::new(self.level)
            .with_chunk_size(self.chunk_size)
            .context("invalid --chunk-size")
    }
}

/// Options whose next token is a value, never a flag.
const VALUE_FLAGS: &[&str] = &["-i", "-o", "-l", "--level", "--chunk-size"];

/// Accept the single-dash `-help` spelling alongside `-h` / `--help`.
///
/// Only a `-help` in flag position is rewritten; `-i -help` names a file.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut value_next = false;
    args.into_iter()
        .map(|a| {
            let is_value = value_next;
            value_next = !is_value && VALUE_FLAGS.iter().any(|f| a == *f);
            if !is_value && a == "-help" {
                OsString::from("--help")
            } else {
                a
            }
        })
        .collect()
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {} ({} bytes)", v, UNITS[unit], n)
    }
}

// ── Run ────────────────────────────────────────────────────────────────────

fn execute(cli: &Cli) -> anyhow::Result<Report> {
    let config = cli.config();
    let codec = cli.codec()?;
    debug!(
        ?config,
        level = codec.level(),
        chunk_size = codec.chunk_size(),
        "parsed arguments"
    );

    let t0 = Instant::now();
    let report = zpak_core::run(&config, &codec).with_context(|| {
        format!(
            "{} {:?} -> {:?} failed",
            config.mode, config.input, config.output
        )
    })?;
    let elapsed = t0.elapsed();

    if !cli.quiet {
        eprintln!("  input       : {:?}", config.input);
        eprintln!("  output      : {:?}", config.output);
        eprintln!("  mode        : {} ({})", config.mode, codec.name());
        match report {
            Report::Compressed(stats) => {
                eprintln!("  level       : {}", codec.level());
                eprintln!("  original    : {}", human_bytes(stats.original_size));
                eprintln!("  compressed  : {}", human_bytes(stats.compressed_size));
                eprintln!("  ratio       : {:.2} %", stats.ratio());
            }
            Report::Decompressed(stats) => {
                eprintln!("  compressed  : {}", human_bytes(stats.compressed_size));
                eprintln!("  restored    : {}", human_bytes(stats.original_size));
            }
        }
        eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    }
    Ok(report)
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                // Asking for help is still a run that did no work.
                ErrorKind::DisplayHelp => ExitCode::FAILURE,
                _ => ExitCode::from(e.exit_code() as u8),
            };
        }
    };
    init_tracing(cli.verbose);

    match execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let argv = std::iter::once("zpak").chain(args.iter().copied()).map(OsString::from);
        Cli::try_parse_from(normalize_args(argv))
    }

    #[test]
    fn compress_flags_build_config() {
        let cli = parse(&["-i", "in.txt", "-o", "out.zpk", "-c"]).unwrap();
        let config = cli.config();
        assert_eq!(config, TranscodeConfig::new("in.txt", "out.zpk", Mode::Compress));
        assert_eq!(cli.level, 9);
        assert_eq!(cli.chunk_size, 1024);
    }

    #[test]
    fn decompress_flag_selects_decompress() {
        let cli = parse(&["-d", "-o", "out.txt", "-i", "in.zpk"]).unwrap();
        assert_eq!(cli.config().mode, Mode::Decompress);
    }

    #[test]
    fn missing_mode_is_a_usage_error() {
        let err = parse(&["-i", "a", "-o", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn both_modes_is_a_usage_error() {
        let err = parse(&["-i", "a", "-o", "b", "-c", "-d"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn missing_paths_are_usage_errors() {
        let err = parse(&["-c", "-o", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        let err = parse(&["-c", "-i", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn single_dash_help_shows_help() {
        let err = parse(&["-help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn help_spelled_as_a_path_is_a_path() {
        let cli = parse(&["-i", "-help", "-o", "x", "-c"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("-help"));
        assert_eq!(cli.output, PathBuf::from("x"));

        let cli = parse(&["-c", "-o", "-help", "-i", "in.txt"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("-help"));
    }

    #[test]
    fn help_after_a_path_still_shows_help() {
        let err = parse(&["-i", "in.txt", "-help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn level_out_of_range_is_rejected() {
        let err = parse(&["-i", "a", "-o", "b", "-c", "--level", "10"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn zero_chunk_size_fails_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.zpk");
        let cli = parse(&[
            "-i",
            "missing.txt",
            "-o",
            out.to_str().unwrap(),
            "-c",
            "-q",
            "--chunk-size",
            "0",
        ])
        .unwrap();
        let err = execute(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("chunk"), "got {err:#}");
        assert!(!out.exists());
    }

    #[test]
    fn usage_error_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("out.zpk");
        std::fs::write(&input, b"hello world").unwrap();

        assert!(parse(&["-i", input.to_str().unwrap(), "-o", out.to_str().unwrap()]).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn compress_then_decompress_through_cli() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let packed = dir.path().join("in.zpk");
        let restored = dir.path().join("restored.txt");
        std::fs::write(&input, b"hello world").unwrap();

        let cli = parse(&["-i", input.to_str().unwrap(), "-o", packed.to_str().unwrap(), "-c", "-q"])
            .unwrap();
        match execute(&cli).unwrap() {
            Report::Compressed(stats) => assert_eq!(stats.original_size, 11),
            other => panic!("unexpected report {other:?}"),
        }

        let cli = parse(&["-i", packed.to_str().unwrap(), "-o", restored.to_str().unwrap(), "-d", "-q"])
            .unwrap();
        execute(&cli).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), b"hello world");
    }

    #[test]
    fn human_bytes_formats_units() {
        assert_eq!(human_bytes(11), "11 B");
        assert_eq!(human_bytes(2048), "2.00 KB (2048 bytes)");
    }
}
