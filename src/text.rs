//! Tab-delimited text index: one `<hash>\t<id>\n` line per pair.
//!
//! Ids must not contain tabs or newlines for the text form to round-trip;
//! use the binary form for arbitrary ids.

use crate::error::{Result, SeqminiError};
use crate::pairs::{MinimizerPair, PairList, SequenceId};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Write every pair in current iteration order
pub fn encode<W: Write>(pairs: &PairList, writer: &mut W) -> Result<()> {
    for pair in pairs {
        write_line(writer, pair.hash, &pair.id)?;
    }
    Ok(())
}

#[inline]
pub fn write_line<W: Write>(writer: &mut W, hash: u64, id: &str) -> Result<()> {
    writeln!(writer, "{}\t{}", hash, id)?;
    Ok(())
}

/// Read lines until end of stream
///
/// Each line is split on its first tab. The left part must be a non-empty run
/// of ASCII digits fitting in a `u64`; the right part is the id, verbatim.
pub fn decode<R: BufRead>(reader: &mut R) -> Result<PairList> {
    let mut pairs = PairList::new();
    let mut line = Vec::new();
    let mut line_number = 0;
    let mut previous: Option<SequenceId> = None;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_number += 1;
        if line.last() == Some(&b'\n') {
            line.pop();
        }

        let (hash, id) = parse_line(&line, line_number)?;
        let id = match previous {
            Some(ref prev) if &**prev == id => prev.clone(),
            _ => {
                let id: SequenceId = Arc::from(id);
                previous = Some(id.clone());
                id
            }
        };
        pairs.push(MinimizerPair { hash, id });
    }

    Ok(pairs)
}

fn parse_line(line: &[u8], line_number: usize) -> Result<(u64, &str)> {
    let line = std::str::from_utf8(line)
        .map_err(|_| SeqminiError::corrupt_at_line(line_number, "line is not valid UTF-8"))?;
    let (hash, id) = line
        .split_once('\t')
        .ok_or_else(|| SeqminiError::corrupt_at_line(line_number, "missing tab delimiter"))?;

    // u64::from_str also accepts a leading '+', which is not a valid hash here
    if hash.is_empty() || !hash.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SeqminiError::corrupt_at_line(
            line_number,
            format!("invalid hash {:?}", hash),
        ));
    }
    let hash = hash.parse::<u64>().map_err(|_| {
        SeqminiError::corrupt_at_line(line_number, format!("hash {:?} overflows u64", hash))
    })?;

    Ok((hash, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded(pairs: &PairList) -> String {
        let mut buf = Vec::new();
        encode(pairs, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn decode_str(text: &str) -> Result<PairList> {
        decode(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn test_line_format() {
        let mut pairs = PairList::new();
        pairs.push(MinimizerPair::new(100, "seqA"));
        pairs.push(MinimizerPair::new(5, "seqB"));
        assert_eq!(encoded(&pairs), "100\tseqA\n5\tseqB\n");
    }

    #[test]
    fn test_roundtrip_scenario() {
        let mut pairs = PairList::new();
        pairs.push(MinimizerPair::new(100, "seqA"));
        pairs.push(MinimizerPair::new(5, "seqB"));
        pairs.push(MinimizerPair::new(100, "seqA"));

        let mut decoded = decode_str(&encoded(&pairs)).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded, pairs);

        decoded.sort();
        let order: Vec<(u64, &str)> = decoded.iter().map(|p| (p.hash, &*p.id)).collect();
        assert_eq!(order, vec![(5, "seqB"), (100, "seqA"), (100, "seqA")]);
    }

    #[test]
    fn test_roundtrip_edge_ids() {
        let mut pairs = PairList::new();
        pairs.push(MinimizerPair::new(u64::MAX, ""));
        pairs.push(MinimizerPair::new(0, "with space"));
        pairs.push(MinimizerPair::new(1, "ünïcødé"));
        pairs.push(MinimizerPair::new(2, "carriage\r"));
        assert_eq!(decode_str(&encoded(&pairs)).unwrap(), pairs);
    }

    #[test]
    fn test_empty() {
        assert_eq!(encoded(&PairList::new()), "");
        assert!(decode_str("").unwrap().is_empty());
    }

    #[test]
    fn test_last_line_without_newline() {
        let pairs = decode_str("1\ta\n2\tb").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(&*pairs.as_slice()[1].id, "b");
    }

    #[test]
    fn test_id_split_on_first_tab_only() {
        let pairs = decode_str("7\tname\twith\ttabs\n").unwrap();
        assert_eq!(&*pairs.as_slice()[0].id, "name\twith\ttabs");
    }

    #[test]
    fn test_missing_tab() {
        let err = decode_str("1\ta\n2 b\n").unwrap_err();
        assert!(err.is_corrupt_stream());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_blank_line_is_corrupt() {
        assert!(decode_str("1\ta\n\n2\tb\n").unwrap_err().is_corrupt_stream());
    }

    #[test]
    fn test_bad_hashes() {
        for bad in ["-1\ta\n", "+1\ta\n", "x\ta\n", "\ta\n", " 1\ta\n", "1.5\ta\n"] {
            let err = decode_str(bad).unwrap_err();
            assert!(err.is_corrupt_stream(), "{:?} should be corrupt", bad);
        }
        let overflow = format!("{}0\ta\n", u64::MAX);
        assert!(decode_str(&overflow).unwrap_err().is_corrupt_stream());
    }

    #[test]
    fn test_max_hash_parses() {
        let text = format!("{}\tz\n", u64::MAX);
        assert_eq!(decode_str(&text).unwrap().as_slice()[0].hash, u64::MAX);
    }
}
