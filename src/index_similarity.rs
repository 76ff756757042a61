use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::index::load_pairs;
use crate::index_format::{IndexFormat, IndexWriter};
use crate::index_group::group_by_id;
use crate::pairs::{PairList, SequenceId};

/// Jaccard similarity of two sequences' distinct minimizer sets
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub first: SequenceId,
    pub second: SequenceId,
    pub jaccard: f64,
}

/// |A ∩ B| / |A ∪ B|, zero when both sets are empty
pub fn jaccard(a: &FxHashSet<u64>, b: &FxHashSet<u64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let shared = small.iter().filter(|h| large.contains(h)).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Similarity of every unordered pair of distinct sequence ids
///
/// Ids are taken in first-appearance order and each pair is reported once,
/// earlier id first.
pub fn pairwise_similarities(pairs: &PairList) -> Vec<Similarity> {
    let sets: Vec<(SequenceId, FxHashSet<u64>)> = group_by_id(pairs)
        .into_iter()
        .map(|sketch| (sketch.id, sketch.hashes.into_iter().collect()))
        .collect();

    let mut results = Vec::with_capacity(sets.len() * sets.len().saturating_sub(1) / 2);
    for (i, (first, first_set)) in sets.iter().enumerate() {
        for (second, second_set) in &sets[i + 1..] {
            results.push(Similarity {
                first: first.clone(),
                second: second.clone(),
                jaccard: jaccard(first_set, second_set),
            });
        }
    }
    results
}

pub fn write_similarities<W: Write>(similarities: &[Similarity], writer: &mut W) -> Result<()> {
    for s in similarities {
        writeln!(writer, "{}\t{}\t{:.6}", s.first, s.second, s.jaccard)?;
    }
    Ok(())
}

/// Compare every pair of sequences in an index
pub fn similarity<P: AsRef<Path>>(
    index_path: P,
    format: IndexFormat,
    output: Option<&Path>,
) -> Result<()> {
    let start_time = Instant::now();
    let path = index_path.as_ref();

    let pairs = load_pairs(path, format)
        .with_context(|| format!("Failed to load index {}", path.display()))?;
    let similarities = pairwise_similarities(&pairs);

    let mut writer = IndexWriter::create(output)?;
    write_similarities(&similarities, &mut writer)?;
    writer.finish()?;

    info!(
        "Compared {} sequence pair(s) in {:.2?}",
        similarities.len(),
        start_time.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::MinimizerPair;

    fn set(hashes: &[u64]) -> FxHashSet<u64> {
        hashes.iter().copied().collect()
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&set(&[1, 2, 3]), &set(&[2, 3, 4])), 0.5);
        assert_eq!(jaccard(&set(&[1, 2]), &set(&[1, 2])), 1.0);
        assert_eq!(jaccard(&set(&[1]), &set(&[2])), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_pairwise_similarities() {
        let mut pairs = PairList::new();
        for (hash, id) in [(1, "a"), (2, "a"), (3, "a"), (2, "b"), (3, "b"), (4, "b"), (9, "c")] {
            pairs.push(MinimizerPair::new(hash, id));
        }
        // Duplicate hashes within one sequence count once
        pairs.push(MinimizerPair::new(2, "a"));

        let sims = pairwise_similarities(&pairs);
        let got: Vec<(&str, &str, f64)> = sims
            .iter()
            .map(|s| (&*s.first, &*s.second, s.jaccard))
            .collect();
        assert_eq!(
            got,
            vec![("a", "b", 0.5), ("a", "c", 0.0), ("b", "c", 0.0)]
        );

        let mut out = Vec::new();
        write_similarities(&sims, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a\tb\t0.500000\na\tc\t0.000000\nb\tc\t0.000000\n"
        );
    }

    #[test]
    fn test_single_sequence_has_no_pairs() {
        let mut pairs = PairList::new();
        pairs.push(MinimizerPair::new(1, "only"));
        assert!(pairwise_similarities(&pairs).is_empty());
    }
}
