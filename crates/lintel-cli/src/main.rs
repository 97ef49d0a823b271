//! Lintel CLI - Command line interface for the policy toolchain

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lintel_ast::Module;
use lintel_config::{filter_ignored_paths, Config, ConfigError};
use lintel_encoding::{to_writer, to_writer_pretty, EncodeError};
use lintel_parser::{parse, ParseError};

/// Environment variable holding the log filter, e.g. `LINTEL_LOG=debug`
const LOG_ENV: &str = "LINTEL_LOG";

#[derive(Parser)]
#[command(name = "lintel")]
#[command(about = "Policy source tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a policy file and print its AST as JSON
    Parse {
        /// Policy file (exactly one)
        paths: Vec<PathBuf>,
        /// Print on a single line instead of indenting
        #[arg(long)]
        compact: bool,
    },
    /// List the policy files under the given paths, minus ignored ones
    Files {
        /// Files or directories to search
        #[arg(required = true)]
        paths: Vec<String>,
        /// Extra `.gitignore`-style pattern to skip (repeatable)
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,
        /// Config file to use instead of the nearest `.lintel.toml`
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory anchored patterns are relative to
        #[arg(long)]
        root: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(&'static str),

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { paths, compact } => cmd_parse(&paths, compact),
        Commands::Files {
            paths,
            ignore,
            config,
            root,
        } => cmd_files(&paths, &ignore, config.as_deref(), root.as_deref()),
    };

    if let Err(e) = result {
        // parse errors were already rendered as a diagnostic
        if !matches!(e, CliError::Parse(_)) {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `LINTEL_LOG` (default `warn`)
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn cmd_parse(paths: &[PathBuf], compact: bool) -> Result<(), CliError> {
    let path = match paths {
        [] => return Err(CliError::Usage("no file to parse provided")),
        [path] => path,
        _ => return Err(CliError::Usage("only one file can be parsed at a time")),
    };

    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), bytes = source.len(), "parsing");
    let module = match parse(&source) {
        Ok(module) => module,
        Err(e) => {
            report_parse_error(&source, path, &e)?;
            return Err(e.into());
        }
    };

    print_module(&module, compact)
}

fn print_module(module: &Module, compact: bool) -> Result<(), CliError> {
    let mut out = BufWriter::new(io::stdout().lock());
    if compact {
        to_writer(&mut out, module)?;
    } else {
        to_writer_pretty(&mut out, module)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn cmd_files(
    paths: &[String],
    ignore: &[String],
    config: Option<&Path>,
    root: Option<&str>,
) -> Result<(), CliError> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => match Config::find(&env::current_dir()?) {
            Some(found) => {
                debug!(config = %found.display(), "using config file");
                Config::load(found)?
            }
            None => Config::default(),
        },
    };

    let patterns = config.ignore_patterns(ignore);
    let files = filter_ignored_paths(paths, &patterns, true, root.unwrap_or(""))?;
    debug!(count = files.len(), "collected policy files");

    let mut out = BufWriter::new(io::stdout().lock());
    for file in files {
        writeln!(out, "{}", file)?;
    }
    out.flush()?;
    Ok(())
}

fn report_parse_error(source: &str, file: &Path, error: &ParseError) -> io::Result<()> {
    let name = file.to_string_lossy().to_string();
    let span = error.span();
    // ariadne counts characters, spans count bytes
    let start = char_offset(source, span.start);
    let end = char_offset(source, span.end);

    Report::build(ReportKind::Error, name.clone(), start)
        .with_message(error.to_string())
        .with_label(
            Label::new((name.clone(), start..end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)))
}

fn char_offset(source: &str, byte: usize) -> usize {
    source
        .get(..byte.min(source.len()))
        .map_or(byte, |prefix| prefix.chars().count())
}
