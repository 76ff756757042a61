//! Sequence sources: walk FASTA/FASTQ or GFA records, extract minimizers and
//! feed `(hash, id)` pairs to a [`PairSink`].
//!
//! Records are visited in the order the parser yields them, and each record's
//! hashes are delivered in the order they occur along the sequence.

use crate::index_format::open_sequence_reader;
use crate::minimizers::{fill_minimizer_hashes, validate_parameters};
use crate::pairs::SequenceId;
use crate::sink::PairSink;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use needletail::parser::Format;
use needletail::{parse_fastx_file, parse_fastx_stdin};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Records between spinner refreshes
const PROGRESS_INTERVAL: u64 = 1024;

/// Declared input format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Fasta,
    Fastq,
    Gfa,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputFormat::Fasta => "fasta",
            InputFormat::Fastq => "fastq",
            InputFormat::Gfa => "gfa",
        };
        f.write_str(name)
    }
}

/// Minimizer parameters shared by all sources
#[derive(Debug, Clone, Copy)]
pub struct SourceOptions {
    pub kmer_length: usize,
    pub window_size: usize,
    /// GFA only: index each segment on its own, ignoring graph topology
    pub segments_only: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub records: u64,
    pub bp: u64,
    pub pairs: u64,
}

/// Turns records into pairs and tracks counters
struct RecordIndexer<'a, S: PairSink> {
    options: SourceOptions,
    sink: &'a mut S,
    hashes: Vec<u64>,
    stats: SourceStats,
    progress: Option<&'a ProgressBar>,
}

impl<'a, S: PairSink> RecordIndexer<'a, S> {
    fn new(
        options: SourceOptions,
        sink: &'a mut S,
        progress: Option<&'a ProgressBar>,
    ) -> Result<Self> {
        validate_parameters(options.kmer_length, options.window_size)?;
        Ok(Self {
            options,
            sink,
            hashes: Vec::new(),
            stats: SourceStats::default(),
            progress,
        })
    }

    fn index_record(&mut self, id: &str, seq: &[u8]) -> Result<()> {
        fill_minimizer_hashes(
            seq,
            self.options.kmer_length,
            self.options.window_size,
            &mut self.hashes,
        )?;

        let id: SequenceId = Arc::from(id);
        for &hash in &self.hashes {
            self.sink.accept(hash, &id)?;
        }

        self.stats.records += 1;
        self.stats.bp += seq.len() as u64;
        self.stats.pairs += self.hashes.len() as u64;
        debug!("{} ({}bp): {} minimizers", id, seq.len(), self.hashes.len());

        if self.stats.records % PROGRESS_INTERVAL == 0 {
            self.update_progress();
        }
        Ok(())
    }

    fn update_progress(&self) {
        if let Some(pb) = self.progress {
            pb.set_message(format!(
                "Indexing: {} records ({}bp), {} pairs",
                self.stats.records, self.stats.bp, self.stats.pairs
            ));
        }
    }

    fn finish(self) -> SourceStats {
        self.update_progress();
        self.stats
    }
}

/// Index every record of the input into `sink`
///
/// `(k, w)` must pass [`validate_parameters`] and every sequence id must be
/// UTF-8; a record with a non-UTF-8 id fails the run.
pub fn index_input<S: PairSink>(
    input: &Path,
    format: InputFormat,
    options: SourceOptions,
    sink: &mut S,
    progress: Option<&ProgressBar>,
) -> Result<SourceStats> {
    match format {
        InputFormat::Fasta | InputFormat::Fastq => {
            if options.segments_only {
                warn!("--seqs-only only applies to GFA input; ignoring");
            }
            index_fastx(input, format, options, sink, progress)
        }
        InputFormat::Gfa => {
            validate_parameters(options.kmer_length, options.window_size)?;
            let reader = open_sequence_reader(input)
                .with_context(|| format!("Failed to open input file {}", input.display()))?;
            index_gfa(reader, options, sink, progress)
                .with_context(|| format!("Failed to index GFA input {}", input.display()))
        }
    }
}

/// The identifier of a FASTA/FASTQ record: its header up to the first whitespace
fn header_token(header: &[u8]) -> Result<&str> {
    let end = header
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(header.len());
    utf8_id(&header[..end])
}

fn utf8_id(id: &[u8]) -> Result<&str> {
    std::str::from_utf8(id).map_err(|_| {
        anyhow::anyhow!(
            "Sequence id {:?} is not valid UTF-8",
            String::from_utf8_lossy(id)
        )
    })
}

/// Index FASTA or FASTQ records, compressed or not
pub fn index_fastx<S: PairSink>(
    input: &Path,
    declared: InputFormat,
    options: SourceOptions,
    sink: &mut S,
    progress: Option<&ProgressBar>,
) -> Result<SourceStats> {
    let mut indexer = RecordIndexer::new(options, sink, progress)?;
    let mut reader = if input.to_string_lossy() == "-" {
        parse_fastx_stdin().context("Failed to read sequences from stdin")?
    } else {
        parse_fastx_file(input)
            .with_context(|| format!("Failed to open input file {}", input.display()))?
    };

    let mut warned = false;

    while let Some(record) = reader.next() {
        let record = record
            .with_context(|| format!("Error reading record from {}", input.display()))?;

        if !warned {
            let detected = match record.format() {
                Format::Fasta => InputFormat::Fasta,
                Format::Fastq => InputFormat::Fastq,
            };
            if detected != declared {
                warn!(
                    "Input declared as {} but records look like {}; indexing anyway",
                    declared, detected
                );
            }
            warned = true;
        }

        let id = header_token(record.id())
            .with_context(|| format!("Error reading record from {}", input.display()))?;
        let seq = record.seq();
        indexer.index_record(id, &seq)?;
    }

    Ok(indexer.finish())
}

/// Index the segments of a GFA graph
///
/// Each `S` line is one record: field 2 is the id, field 3 the sequence.
/// Without `segments_only` no pairs are produced, since topology-aware
/// indexing is not supported.
pub fn index_gfa<R: BufRead, S: PairSink>(
    reader: R,
    options: SourceOptions,
    sink: &mut S,
    progress: Option<&ProgressBar>,
) -> Result<SourceStats> {
    let mut indexer = RecordIndexer::new(options, sink, progress)?;

    if !options.segments_only {
        warn!("Whole-graph GFA indexing is not supported; use --seqs-only to index segments");
        return Ok(indexer.finish());
    }

    for (line_number, line) in reader.split(b'\n').enumerate() {
        let line = line.with_context(|| format!("Failed to read GFA line {}", line_number + 1))?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
        if !line.starts_with(b"S\t") {
            continue;
        }

        let mut fields = line.split(|&b| b == b'\t').skip(1);
        let name = fields.next().unwrap_or_default();
        let seq = fields.next().ok_or_else(|| {
            anyhow::anyhow!("GFA line {}: segment without a sequence field", line_number + 1)
        })?;
        if name.is_empty() {
            return Err(anyhow::anyhow!(
                "GFA line {}: segment without a name",
                line_number + 1
            ));
        }
        let name = utf8_id(name).with_context(|| format!("GFA line {}", line_number + 1))?;
        if seq == b"*" {
            debug!("Skipping segment {} with no stored sequence", name);
            continue;
        }

        indexer.index_record(name, seq)?;
    }

    Ok(indexer.finish())
}
