//! Length-prefixed binary index records.
//!
//! Each record is, little-endian and back to back:
//!
//! | bytes | field |
//! |-------|-------|
//! | 8     | minimizer hash (`u64`) |
//! | 4     | id length `L` (`i32`, must be >= 0) |
//! | `L`   | raw id bytes, no terminator |
//!
//! There is no header, footer or record count; end of stream terminates.

use crate::error::{Result, SeqminiError};
use crate::pairs::{MinimizerPair, PairList, SequenceId};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::sync::Arc;

const HASH_BYTES: usize = 8;
const LENGTH_BYTES: u64 = 4;

/// Write every pair in current iteration order
pub fn encode<W: Write>(pairs: &PairList, writer: &mut W) -> Result<()> {
    for pair in pairs {
        write_record(writer, pair)?;
    }
    Ok(())
}

pub fn write_record<W: Write>(writer: &mut W, pair: &MinimizerPair) -> Result<()> {
    let id = pair.id.as_bytes();
    let length = i32::try_from(id.len()).map_err(|_| {
        SeqminiError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("sequence id of {} bytes does not fit the length field", id.len()),
        ))
    })?;
    writer.write_u64::<LittleEndian>(pair.hash)?;
    writer.write_i32::<LittleEndian>(length)?;
    writer.write_all(id)?;
    Ok(())
}

/// Read records until end of stream
///
/// A stream that ends inside a record, a negative length, or an id that is
/// not UTF-8 fails with [`SeqminiError::CorruptStream`].
pub fn decode<R: Read>(reader: &mut R) -> Result<PairList> {
    let mut pairs = PairList::new();
    let mut offset = 0u64;
    // Consecutive records of one sequence share a single id allocation
    let mut previous: Option<SequenceId> = None;

    while let Some(hash) = read_hash(reader, offset)? {
        let length = reader
            .read_i32::<LittleEndian>()
            .map_err(|e| eof_as_corrupt(e, offset, "stream ends inside id length"))?;
        if length < 0 {
            return Err(SeqminiError::corrupt_at_byte(
                offset,
                format!("negative id length {}", length),
            ));
        }

        // Bounded read: a corrupt length must not trigger a huge allocation
        let mut id_bytes = Vec::new();
        reader
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut id_bytes)?;
        if id_bytes.len() != length as usize {
            return Err(SeqminiError::corrupt_at_byte(
                offset,
                format!(
                    "stream ends inside id: expected {} bytes, found {}",
                    length,
                    id_bytes.len()
                ),
            ));
        }

        let id = match previous {
            Some(ref prev) if prev.as_bytes() == id_bytes.as_slice() => prev.clone(),
            _ => {
                let text = String::from_utf8(id_bytes).map_err(|_| {
                    SeqminiError::corrupt_at_byte(offset, "sequence id is not valid UTF-8")
                })?;
                let id: SequenceId = Arc::from(text);
                previous = Some(id.clone());
                id
            }
        };

        pairs.push(MinimizerPair { hash, id });
        offset += HASH_BYTES as u64 + LENGTH_BYTES + length as u64;
    }

    Ok(pairs)
}

/// Read a record's hash, or `None` on a clean end of stream
fn read_hash<R: Read>(reader: &mut R, offset: u64) -> Result<Option<u64>> {
    let mut buf = [0u8; HASH_BYTES];
    let mut filled = 0;
    while filled < HASH_BYTES {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        HASH_BYTES => Ok(Some(u64::from_le_bytes(buf))),
        n => Err(SeqminiError::corrupt_at_byte(
            offset,
            format!("stream ends inside hash after {} bytes", n),
        )),
    }
}

fn eof_as_corrupt(err: io::Error, offset: u64, message: &str) -> SeqminiError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SeqminiError::corrupt_at_byte(offset, message)
    } else {
        SeqminiError::Io(err)
    }
}
