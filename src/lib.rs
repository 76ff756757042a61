//! # Seqmini
//!
//! Index minimizer hashes to the identifiers of the sequences that contain
//! them. Sequences come from FASTA, FASTQ or GFA (segment) files; the index is
//! a list of `(hash, sequence id)` pairs written as tab-delimited text or as
//! length-prefixed binary records.
//!
//! This crate provides both a library and a binary.
//!
#![doc = include_str!("../README.md")]

pub mod binary;
pub mod error;
pub mod index;
pub mod index_build;
pub mod index_format;
pub mod index_group;
pub mod index_info;
pub mod index_similarity;
pub mod minimizers;
pub mod pairs;
pub mod sink;
pub mod sources;
pub mod text;

// Re-export the important structures and functions for library users
pub use error::{SeqminiError, StreamPosition};
pub use index::{
    build as build_index, group as group_index, info as index_info, load_pairs,
    similarity as index_similarity, write_pairs,
};
pub use index_build::BuildSummary;
pub use index_format::IndexFormat;
pub use minimizers::{
    DEFAULT_KMER_LENGTH, DEFAULT_WINDOW_SIZE, compute_minimizer_hashes, fill_minimizer_hashes,
};
pub use pairs::{MinimizerPair, PairList, SequenceId};
pub use sink::{LineSink, PairSink};
pub use sources::{InputFormat, SourceOptions, SourceStats};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Configuration for index building
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Path to input sequence file (or - for stdin)
    pub input_path: PathBuf,

    /// Declared format of the input
    pub input_format: InputFormat,

    /// K-mer length used for indexing
    pub kmer_length: usize,

    /// Minimizer window size used for indexing
    pub window_size: usize,

    /// GFA only: index segments independently of graph topology
    pub segments_only: bool,

    /// Write each pair as a text line as soon as it is found
    pub streaming: bool,

    /// Record encoding of the output index
    pub output_format: IndexFormat,

    /// Path to output file (None for stdout; detects .gz, .zst and .xz)
    pub output_path: Option<PathBuf>,

    /// Sort collected pairs by hash before writing (batch mode only)
    pub sort: bool,

    /// Path to JSON summary file
    pub summary_path: Option<PathBuf>,

    /// Suppress the progress spinner
    pub quiet: bool,
}

impl IndexConfig {
    /// Create a new index configuration with the specified input path
    pub fn new<P: AsRef<Path>>(input_path: P) -> Self {
        Self {
            input_path: input_path.as_ref().to_path_buf(),
            input_format: InputFormat::Fasta,
            kmer_length: DEFAULT_KMER_LENGTH,
            window_size: DEFAULT_WINDOW_SIZE,
            segments_only: false,
            streaming: false,
            output_format: IndexFormat::Text,
            output_path: None,
            sort: true,
            summary_path: None,
            quiet: false,
        }
    }

    /// Set the input format
    pub fn with_input_format(mut self, input_format: InputFormat) -> Self {
        self.input_format = input_format;
        self
    }

    /// Set k-mer length
    pub fn with_kmer_length(mut self, kmer_length: usize) -> Self {
        self.kmer_length = kmer_length;
        self
    }

    /// Set window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set GFA segments-only mode
    pub fn with_segments_only(mut self, segments_only: bool) -> Self {
        self.segments_only = segments_only;
        self
    }

    /// Set streaming mode
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Set the output encoding
    pub fn with_output_format(mut self, output_format: IndexFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Set output path
    pub fn with_output<P: AsRef<Path>>(mut self, output_path: P) -> Self {
        self.output_path = Some(output_path.as_ref().to_path_buf());
        self
    }

    /// Set whether batch output is sorted by hash
    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Set the summary path
    pub fn with_summary<P: AsRef<Path>>(mut self, summary_path: P) -> Self {
        self.summary_path = Some(summary_path.as_ref().to_path_buf());
        self
    }

    /// Set quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Minimizer options handed to the sequence sources
    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            kmer_length: self.kmer_length,
            window_size: self.window_size,
            segments_only: self.segments_only,
        }
    }

    /// Reject option combinations that cannot produce a valid index
    pub fn validate(&self) -> std::result::Result<(), SeqminiError> {
        minimizers::validate_parameters(self.kmer_length, self.window_size)?;
        if self.streaming && self.output_format == IndexFormat::Binary {
            return Err(SeqminiError::usage(
                "streaming mode writes text lines and cannot produce a binary index",
            ));
        }
        Ok(())
    }

    /// Execute index build with this configuration
    pub fn execute(&self) -> Result<BuildSummary> {
        build_index(self)
    }
}
