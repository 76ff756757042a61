use crate::binary;
use crate::error::Result;
use crate::index_format::{IndexFormat, IndexWriter, open_index_reader};
use crate::pairs::PairList;
use crate::text;
use std::io::Write;
use std::path::Path;

// Re-export index operations
pub use crate::index_build::build;
pub use crate::index_group::group;
pub use crate::index_info::info;
pub use crate::index_similarity::similarity;

/// Load every pair of an index file (or `-` for stdin)
pub fn load_pairs<P: AsRef<Path>>(path: P, format: IndexFormat) -> Result<PairList> {
    let mut reader = open_index_reader(path.as_ref())?;
    match format {
        IndexFormat::Binary => binary::decode(&mut reader),
        IndexFormat::Text => text::decode(&mut reader),
    }
}

/// Write pairs in their current order to a file, or stdout when `output_path` is `None`
///
/// The destination is flushed (and any compression finished) before returning.
pub fn write_pairs(
    pairs: &PairList,
    format: IndexFormat,
    output_path: Option<&Path>,
) -> Result<()> {
    let mut writer = IndexWriter::create(output_path)?;
    encode_pairs(pairs, format, &mut writer)?;
    writer.finish()
}

/// Encode pairs into an already opened destination
pub fn encode_pairs<W: Write>(pairs: &PairList, format: IndexFormat, writer: &mut W) -> Result<()> {
    match format {
        IndexFormat::Binary => binary::encode(pairs, writer),
        IndexFormat::Text => text::encode(pairs, writer),
    }
}
