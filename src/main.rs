use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gocover_cobertura::config::{Config, Ignore};
use gocover_cobertura::convert;
use gocover_cobertura::sources::SourceRoots;

/// gocover-cobertura — read a Go coverage profile on stdin, write a
/// Cobertura XML report on stdout.
#[derive(Parser)]
#[command(name = "gocover-cobertura", version, about)]
struct Cli {
    /// Directory that package-relative file names resolve under. Repeat to
    /// probe several, in order (default: $GOROOT/src and $GOPATH/src).
    #[arg(long = "source-root", value_name = "DIR")]
    source_roots: Vec<PathBuf>,

    /// Leave out packages whose directory matches this regex.
    #[arg(long, value_name = "REGEX")]
    ignore_dirs: Option<String>,

    /// Leave out files whose name matches this regex.
    #[arg(long, value_name = "REGEX")]
    ignore_files: Option<String>,

    /// Leave out files marked "Code generated ... DO NOT EDIT."
    #[arg(long)]
    ignore_gen_files: bool,

    /// Log each file as it is processed.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let sources = if cli.source_roots.is_empty() {
        SourceRoots::from_env()
    } else {
        SourceRoots::new(cli.source_roots)
    };
    let ignore = Ignore::new(
        cli.ignore_dirs.as_deref(),
        cli.ignore_files.as_deref(),
        cli.ignore_gen_files,
    )
    .context("Invalid ignore pattern")?;

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    convert::convert(stdin, stdout, Config { sources, ignore })
        .context("Failed to convert coverage profile")?;
    Ok(())
}

/// Logs go to stderr; stdout carries the report. `RUST_LOG` overrides the
/// level picked by the flags.
fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
