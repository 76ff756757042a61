use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::index::load_pairs;
use crate::index_format::IndexFormat;
use crate::pairs::PairList;

/// Summary statistics of an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub format: IndexFormat,
    pub pairs: usize,
    pub distinct_hashes: usize,
    pub distinct_ids: usize,
    pub sorted: bool,
}

impl IndexInfo {
    pub fn from_pairs(pairs: &PairList, format: IndexFormat) -> Self {
        let hashes: FxHashSet<u64> = pairs.iter().map(|p| p.hash).collect();
        let ids: FxHashSet<&str> = pairs.iter().map(|p| &*p.id).collect();
        Self {
            format,
            pairs: pairs.len(),
            distinct_hashes: hashes.len(),
            distinct_ids: ids.len(),
            sorted: pairs.is_sorted(),
        }
    }
}

/// Show info about an index
pub fn info<P: AsRef<Path>>(index_path: P, format: IndexFormat) -> Result<IndexInfo> {
    let start_time = Instant::now();
    let path = index_path.as_ref();

    let pairs = load_pairs(path, format)
        .with_context(|| format!("Failed to load index {}", path.display()))?;
    let index_info = IndexInfo::from_pairs(&pairs, format);

    info!("Retrieved index info in {:.2?}", start_time.elapsed());
    Ok(index_info)
}
