use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::index::load_pairs;
use crate::index_format::{IndexFormat, IndexWriter};
use crate::pairs::{PairList, SequenceId};

/// Hashes of one sequence, in stored order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSketch {
    pub id: SequenceId,
    pub hashes: Vec<u64>,
}

/// Group pairs by sequence id, ids in first-appearance order
pub fn group_by_id(pairs: &PairList) -> Vec<SequenceSketch> {
    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
    let mut sketches: Vec<SequenceSketch> = Vec::new();

    for pair in pairs {
        let slot = *slots.entry(&*pair.id).or_insert_with(|| {
            sketches.push(SequenceSketch {
                id: pair.id.clone(),
                hashes: Vec::new(),
            });
            sketches.len() - 1
        });
        sketches[slot].hashes.push(pair.hash);
    }

    sketches
}

/// Write one `<id>\t<h1>,<h2>,...` line per sketch
pub fn write_sketches<W: Write>(sketches: &[SequenceSketch], writer: &mut W) -> Result<()> {
    for sketch in sketches {
        write!(writer, "{}\t", sketch.id)?;
        for (i, hash) in sketch.hashes.iter().enumerate() {
            if i > 0 {
                writer.write_all(b",")?;
            }
            write!(writer, "{}", hash)?;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Rewrite an index as one line of hashes per sequence
pub fn group<P: AsRef<Path>>(
    index_path: P,
    format: IndexFormat,
    output: Option<&Path>,
) -> Result<()> {
    let start_time = Instant::now();
    let path = index_path.as_ref();

    let pairs = load_pairs(path, format)
        .with_context(|| format!("Failed to load index {}", path.display()))?;
    let sketches = group_by_id(&pairs);

    let mut writer = IndexWriter::create(output)?;
    write_sketches(&sketches, &mut writer)?;
    writer.finish()?;

    info!(
        "Grouped {} pairs into {} sequence(s) in {:.2?}",
        pairs.len(),
        sketches.len(),
        start_time.elapsed()
    );
    Ok(())
}
