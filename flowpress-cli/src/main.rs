//! FlowPress CLI - bounded-memory streaming compression
//!
//! Compresses and decompresses files or pipes with zlib or Zstandard while
//! holding only two fixed-size buffers per stream.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use commands::{StreamOptions, cmd_compress, cmd_decompress, cmd_info, cmd_test};
use flowpress_codec::Format;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flowpress")]
#[command(author, version, about = "Bounded-memory streaming compression")]
#[command(long_about = "
FlowPress streams data through zlib or Zstandard in fixed-size chunks, so
memory use does not depend on input size. `-` reads standard input.

Examples:
  flowpress compress access.log
  flowpress compress -f zstd -l 19 *.csv
  flowpress decompress access.log.zz
  cat dump.sql | flowpress compress > dump.sql.zz
  flowpress test backups/*.zst
  flowpress info
")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files (or standard input)
    #[command(alias = "c")]
    Compress {
        /// Files to compress
        files: Vec<PathBuf>,

        /// Stream format
        #[arg(short, long, value_enum, default_value = "zlib")]
        format: FormatArg,

        /// Compression level (zlib 0-9, zstd 1-22)
        #[arg(short, long)]
        level: Option<u8>,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Decompress files (or standard input)
    #[command(alias = "d")]
    Decompress {
        /// Files to decompress
        files: Vec<PathBuf>,

        /// Stream format (detected from the header if not given)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Check that compressed files decode cleanly
    #[command(alias = "t")]
    Test {
        /// Files to test
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Stream format (detected from the header if not given)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Show available backends, or inspect files
    #[command(alias = "i")]
    Info {
        /// Files to inspect
        files: Vec<PathBuf>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by compress and decompress.
#[derive(clap::Args)]
struct StreamArgs {
    /// Output file (single input only; `-` for standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write to standard output
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Overwrite existing files without asking
    #[arg(short = 'F', long)]
    force: bool,

    /// Buffer capacity in bytes for both input and output chunks
    #[arg(long)]
    chunk_size: Option<usize>,

    /// JSON file with stream settings (input_capacity, output_capacity, level)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output as JSON (machine-readable)
    #[arg(short, long)]
    json: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

/// Stream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// zlib (.zz)
    Zlib,
    /// Zstandard (.zst)
    Zstd,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Zlib => Format::Zlib,
            FormatArg::Zstd => Format::Zstd,
        }
    }
}

impl StreamArgs {
    fn options(
        &self,
        format: Option<Format>,
        level: Option<u8>,
        verbose: bool,
    ) -> StreamOptions<'_> {
        StreamOptions {
            format,
            level,
            chunk_size: self.chunk_size,
            config: self.config.as_deref(),
            output: self.output.as_deref(),
            stdout: self.stdout,
            force: self.force,
            json: self.json,
            progress: !self.no_progress,
            verbose,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    flowpress_codec::init();

    let result = match &cli.command {
        Commands::Compress {
            files,
            format,
            level,
            stream,
        } => cmd_compress(
            files,
            &stream.options(Some((*format).into()), *level, cli.verbose),
        ),
        Commands::Decompress {
            files,
            format,
            stream,
        } => cmd_decompress(
            files,
            &stream.options(format.map(Into::into), None, cli.verbose),
        ),
        Commands::Test {
            files,
            format,
            json,
        } => cmd_test(files, format.map(Into::into), *json, cli.verbose),
        Commands::Info { files, json } => cmd_info(files, *json),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "flowpress", &mut std::io::stdout());
            Ok(())
        }
    };

    flowpress_codec::shutdown();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
