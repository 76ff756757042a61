use crate::IndexConfig;
use crate::index::encode_pairs;
use crate::index_format::{IndexFormat, IndexWriter};
use crate::pairs::PairList;
use crate::sink::LineSink;
use crate::sources::{SourceStats, index_input};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;
use tracing::info;

/// JSON summary of an indexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    pub version: String,
    pub input: String,
    pub input_format: String,
    pub output: String,
    pub output_format: IndexFormat,
    pub k: usize,
    pub w: usize,
    pub segments_only: bool,
    pub streaming: bool,
    pub sorted: bool,
    pub records: u64,
    pub bp: u64,
    pub pairs: u64,
    pub time: f64,
}

fn spinner(enabled: bool) -> Result<Option<ProgressBar>> {
    if !enabled {
        return Ok(None);
    }
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{msg}")?,
    );
    pb.set_message("Indexing: 0 records (0bp)");
    Ok(Some(pb))
}

/// Build a minimizer pair index from a FASTA, FASTQ or GFA file
///
/// The destination is opened before any input is read, so an unwritable
/// output fails fast without doing the indexing work. File output is only
/// moved into place once the whole index is written; a failed run leaves an
/// existing file at the output path as it was.
pub fn build(config: &IndexConfig) -> Result<BuildSummary> {
    let start_time = Instant::now();
    config.validate()?;

    info!(
        "Indexing {} ({}, k={}, w={}, {} output{})",
        config.input_path.display(),
        config.input_format,
        config.kmer_length,
        config.window_size,
        config.output_format,
        if config.streaming { ", streaming" } else { "" }
    );

    let mut writer = IndexWriter::create(config.output_path.as_deref())?;

    // A spinner would interleave with pairs streamed to the terminal
    let to_stdout = config
        .output_path
        .as_ref()
        .is_none_or(|p| p.to_string_lossy() == "-");
    let progress = spinner(!config.quiet && !(config.streaming && to_stdout))?;

    let options = config.source_options();
    let (stats, sorted) = if config.streaming {
        let mut sink = LineSink::new(writer);
        let stats = index_input(
            &config.input_path,
            config.input_format,
            options,
            &mut sink,
            progress.as_ref(),
        )?;
        sink.finish()?.finish()?;
        (stats, false)
    } else {
        let mut pairs = PairList::new();
        let stats = index_input(
            &config.input_path,
            config.input_format,
            options,
            &mut pairs,
            progress.as_ref(),
        )?;
        if config.sort {
            pairs.sort();
        }
        encode_pairs(&pairs, config.output_format, &mut writer)
            .context("Failed to write index")?;
        writer.finish().context("Failed to finish index output")?;
        (stats, config.sort)
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let total_time = start_time.elapsed();
    info!(
        "Indexed {} pairs from {} sequence(s) ({}bp) in {:.2?}",
        stats.pairs, stats.records, stats.bp, total_time
    );

    let summary = summarise(config, stats, sorted, total_time.as_secs_f64());
    if let Some(path) = &config.summary_path {
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &summary).context("Failed to write summary")?;
        writer.flush().context("Failed to write summary")?;
        info!("Summary saved to {}", path.display());
    }

    Ok(summary)
}

fn summarise(config: &IndexConfig, stats: SourceStats, sorted: bool, time: f64) -> BuildSummary {
    BuildSummary {
        version: env!("CARGO_PKG_VERSION").to_string(),
        input: config.input_path.to_string_lossy().into_owned(),
        input_format: config.input_format.to_string(),
        output: config
            .output_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "-".to_string()),
        output_format: config.output_format,
        k: config.kmer_length,
        w: config.window_size,
        segments_only: config.segments_only,
        streaming: config.streaming,
        sorted,
        records: stats.records,
        bp: stats.bp,
        pairs: stats.pairs,
        time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeqminiError;
    use crate::index::load_pairs;
    use crate::minimizers::compute_minimizer_hashes;
    use crate::sources::InputFormat;
    use std::fs;
    use tempfile::tempdir;

    const SEQ_A: &str = "ACGTTGCATGCAAGTCCGATAGCTAGGCTAACGTTAGCAGTCAGTACGATCAGT";
    const SEQ_B: &str = "TTGACCGATGCATCGATCGGCTAGCTAGCATCGACTAGCTACGACTACGGCATA";

    fn write_fasta(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("in.fa");
        fs::write(&path, format!(">a first\n{}\n>b\n{}\n", SEQ_A, SEQ_B)).unwrap();
        path
    }

    fn expected_pairs() -> Vec<(u64, String)> {
        compute_minimizer_hashes(SEQ_A.as_bytes(), 7, 5).unwrap()
            .into_iter()
            .map(|h| (h, "a".to_string()))
            .chain(
                compute_minimizer_hashes(SEQ_B.as_bytes(), 7, 5).unwrap()
                    .into_iter()
                    .map(|h| (h, "b".to_string())),
            )
            .collect()
    }

    fn as_tuples(pairs: &PairList) -> Vec<(u64, String)> {
        pairs.iter().map(|p| (p.hash, p.id.to_string())).collect()
    }

    #[test]
    fn test_build_unsorted_text_keeps_record_order() {
        let dir = tempdir().unwrap();
        let input = write_fasta(dir.path());
        let output = dir.path().join("out.txt");

        let summary = IndexConfig::new(&input)
            .with_kmer_length(7)
            .with_window_size(5)
            .with_output(&output)
            .with_sort(false)
            .with_quiet(true)
            .execute()
            .unwrap();

        let pairs = load_pairs(&output, IndexFormat::Text).unwrap();
        assert_eq!(as_tuples(&pairs), expected_pairs());
        assert_eq!(summary.records, 2);
        assert_eq!(summary.pairs as usize, pairs.len());
        assert!(!summary.sorted);
    }

    #[test]
    fn test_build_sorted_binary() {
        let dir = tempdir().unwrap();
        let input = write_fasta(dir.path());
        let output = dir.path().join("out.bin");

        IndexConfig::new(&input)
            .with_kmer_length(7)
            .with_window_size(5)
            .with_output_format(IndexFormat::Binary)
            .with_output(&output)
            .with_quiet(true)
            .execute()
            .unwrap();

        let pairs = load_pairs(&output, IndexFormat::Binary).unwrap();
        assert!(pairs.is_sorted());
        let mut got = as_tuples(&pairs);
        let mut expected = expected_pairs();
        got.sort();
        expected.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_streaming_matches_unsorted_batch() {
        let dir = tempdir().unwrap();
        let input = write_fasta(dir.path());
        let streamed = dir.path().join("streamed.txt");
        let batched = dir.path().join("batched.txt");

        let base = IndexConfig::new(&input)
            .with_kmer_length(7)
            .with_window_size(5)
            .with_quiet(true);
        base.clone()
            .with_streaming(true)
            .with_output(&streamed)
            .execute()
            .unwrap();
        base.with_sort(false).with_output(&batched).execute().unwrap();

        assert_eq!(
            fs::read_to_string(&streamed).unwrap(),
            fs::read_to_string(&batched).unwrap()
        );
    }

    #[test]
    fn test_summary_file() {
        let dir = tempdir().unwrap();
        let input = write_fasta(dir.path());
        let summary_path = dir.path().join("summary.json");

        IndexConfig::new(&input)
            .with_kmer_length(7)
            .with_window_size(5)
            .with_output(dir.path().join("out.txt"))
            .with_summary(&summary_path)
            .with_quiet(true)
            .execute()
            .unwrap();

        let summary: BuildSummary =
            serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.bp, 108);
        assert_eq!(summary.k, 7);
        assert_eq!(summary.output_format, IndexFormat::Text);
    }

    #[test]
    fn test_unwritable_output_fails_before_indexing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("does_not_exist.fa");
        let output = dir.path().join("missing_dir").join("out.txt");

        let err = IndexConfig::new(&input)
            .with_output(&output)
            .with_quiet(true)
            .execute()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeqminiError>(),
            Some(SeqminiError::SinkOpen { .. })
        ));
    }

    #[test]
    fn test_failed_build_keeps_existing_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("keep.idx");
        fs::write(&output, "5\tprecious\n").unwrap();

        let missing = IndexConfig::new(dir.path().join("absent.fa"))
            .with_output(&output)
            .with_quiet(true)
            .execute();
        assert!(missing.is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "5\tprecious\n");

        let bad_gfa = dir.path().join("bad.gfa");
        fs::write(&bad_gfa, format!("S\ta\t{}\nS\tno_sequence\n", SEQ_A)).unwrap();
        for streaming in [false, true] {
            let result = IndexConfig::new(&bad_gfa)
                .with_input_format(InputFormat::Gfa)
                .with_segments_only(true)
                .with_kmer_length(7)
                .with_window_size(5)
                .with_streaming(streaming)
                .with_output(&output)
                .with_quiet(true)
                .execute();
            assert!(result.is_err());
            assert_eq!(fs::read_to_string(&output).unwrap(), "5\tprecious\n");
        }

        // Only the original file remains
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_gfa_segments_build() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("graph.gfa");
        fs::write(
            &input,
            format!("H\tVN:Z:1.0\nS\ta\t{}\nS\tb\t{}\nL\ta\t+\tb\t+\t0M\n", SEQ_A, SEQ_B),
        )
        .unwrap();
        let output = dir.path().join("out.txt");

        IndexConfig::new(&input)
            .with_input_format(InputFormat::Gfa)
            .with_segments_only(true)
            .with_kmer_length(7)
            .with_window_size(5)
            .with_output(&output)
            .with_sort(false)
            .with_quiet(true)
            .execute()
            .unwrap();

        let pairs = load_pairs(&output, IndexFormat::Text).unwrap();
        assert_eq!(as_tuples(&pairs), expected_pairs());
    }
}
