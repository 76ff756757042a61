use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use seqmini::index_info::IndexInfo;
use seqmini::{IndexConfig, IndexFormat, InputFormat};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_KMER_LENGTH: u8 = seqmini::DEFAULT_KMER_LENGTH as u8;
const DEFAULT_WINDOW_SIZE: u16 = seqmini::DEFAULT_WINDOW_SIZE as u16;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate minimizer indexes for FASTA, FASTQ and GFA files",
    long_about = None,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Args)]
struct BuildArgs {
    /// Path to input sequence file (or - for stdin)
    #[arg(required = true)]
    input: Option<PathBuf>,

    #[command(flatten)]
    format: FormatArgs,

    /// Only index GFA segment (S) lines, ignoring graph topology
    #[arg(short = 's', long = "seqs-only", default_value_t = false)]
    seqs_only: bool,

    /// Write a binary index rather than text
    #[arg(short = 'b', long = "binary", default_value_t = false, conflicts_with = "stream")]
    binary: bool,

    /// Minimizer k-mer length (1-32)
    #[arg(short = 'k', long = "kmer", default_value_t = DEFAULT_KMER_LENGTH, value_parser = clap::value_parser!(u8).range(1..=32))]
    kmer_length: u8,

    /// Minimizer window size
    #[arg(short = 'w', long = "window", default_value_t = DEFAULT_WINDOW_SIZE, value_parser = clap::value_parser!(u16).range(1..))]
    window_size: u16,

    /// Path to output file (- for stdout; detects .gz, .zst and .xz)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Write each pair as a text line as soon as it is found, without collecting
    #[arg(long = "stream", default_value_t = false)]
    stream: bool,

    /// Keep discovery order instead of sorting pairs by hash
    #[arg(long = "unsorted", default_value_t = false)]
    unsorted: bool,

    /// Path to JSON summary file
    #[arg(long = "summary")]
    summary: Option<PathBuf>,

    /// Suppress progress reporting
    #[arg(long = "quiet", default_value_t = false)]
    quiet: bool,
}

#[derive(Args)]
#[group(multiple = false)]
struct FormatArgs {
    /// Input is FASTA (default)
    #[arg(short = 'f', long = "fasta", default_value_t = false)]
    fasta: bool,

    /// Input is FASTQ
    #[arg(short = 'q', long = "fastq", default_value_t = false)]
    fastq: bool,

    /// Input is GFA
    #[arg(short = 'g', long = "gfa", default_value_t = false)]
    gfa: bool,
}

impl FormatArgs {
    fn input_format(&self) -> InputFormat {
        if self.gfa {
            InputFormat::Gfa
        } else if self.fastq {
            InputFormat::Fastq
        } else {
            InputFormat::Fasta
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show summary statistics of an index
    Info {
        /// Path to index file
        index: PathBuf,

        /// Index is binary rather than text
        #[arg(short = 'b', long = "binary", default_value_t = false)]
        binary: bool,

        /// Print the summary as JSON
        #[arg(long = "json", default_value_t = false)]
        json: bool,
    },

    /// Write one line per sequence id listing its minimizer hashes
    Group {
        /// Path to index file
        index: PathBuf,

        /// Index is binary rather than text
        #[arg(short = 'b', long = "binary", default_value_t = false)]
        binary: bool,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Write the Jaccard similarity of every pair of sequence ids
    Similarity {
        /// Path to index file
        index: PathBuf,

        /// Index is binary rather than text
        #[arg(short = 'b', long = "binary", default_value_t = false)]
        binary: bool,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_info(index_info: &IndexInfo, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, index_info)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Index information:")?;
        writeln!(out, "  Format: {}", index_info.format)?;
        writeln!(out, "  Pairs: {}", index_info.pairs)?;
        writeln!(out, "  Distinct minimizers: {}", index_info.distinct_hashes)?;
        writeln!(out, "  Distinct sequence ids: {}", index_info.distinct_ids)?;
        writeln!(out, "  Sorted by hash: {}", index_info.sorted)?;
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<()> {
    let Some(input) = args.input else {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "the input file path is required",
            )
            .exit();
    };

    let input_format = args.format.input_format();
    let mut config = IndexConfig::new(&input)
        .with_input_format(input_format)
        .with_segments_only(args.seqs_only)
        .with_kmer_length(args.kmer_length as usize)
        .with_window_size(args.window_size as usize)
        .with_output_format(IndexFormat::from_binary_flag(args.binary))
        .with_streaming(args.stream)
        .with_sort(!args.unsorted)
        .with_quiet(args.quiet);
    if let Some(output) = &args.output {
        config = config.with_output(output);
    }
    if let Some(summary) = &args.summary {
        config = config.with_summary(summary);
    }

    config
        .execute()
        .with_context(|| format!("Failed to index {}", input.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none() && cli.build.quiet);

    match cli.command {
        Some(Commands::Info {
            index,
            binary,
            json,
        }) => {
            let index_info = seqmini::index_info(&index, IndexFormat::from_binary_flag(binary))?;
            print_info(&index_info, json)?;
        }
        Some(Commands::Group {
            index,
            binary,
            output,
        }) => {
            seqmini::group_index(
                &index,
                IndexFormat::from_binary_flag(binary),
                output.as_deref(),
            )?;
        }
        Some(Commands::Similarity {
            index,
            binary,
            output,
        }) => {
            seqmini::index_similarity(
                &index,
                IndexFormat::from_binary_flag(binary),
                output.as_deref(),
            )?;
        }
        None => run_build(cli.build)?,
    }

    Ok(())
}
