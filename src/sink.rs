use crate::error::Result;
use crate::pairs::{MinimizerPair, PairList, SequenceId};
use crate::text;
use std::io::Write;

/// Destination for pairs as a source discovers them
pub trait PairSink {
    fn accept(&mut self, hash: u64, id: &SequenceId) -> Result<()>;
}

/// Batch mode: collect for later sorting and encoding
impl PairSink for PairList {
    #[inline]
    fn accept(&mut self, hash: u64, id: &SequenceId) -> Result<()> {
        self.push(MinimizerPair {
            hash,
            id: id.clone(),
        });
        Ok(())
    }
}

/// Streaming mode: write each pair as a text index line immediately
pub struct LineSink<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and hand back the writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> PairSink for LineSink<W> {
    #[inline]
    fn accept(&mut self, hash: u64, id: &SequenceId) -> Result<()> {
        text::write_line(&mut self.writer, hash, id)?;
        self.lines += 1;
        Ok(())
    }
}
