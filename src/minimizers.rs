use crate::error::{Result, SeqminiError};
use packed_seq::AsciiSeq;
use xxhash_rust::xxh3;

pub const DEFAULT_KMER_LENGTH: usize = 16;
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Largest k-mer whose 2-bit encoding fits a u64 minimizer value
pub const MAX_KMER_LENGTH: usize = 32;

/// Check if nucleotide is valid ACGT (case insensitive)
#[inline]
fn is_valid_acgt(nucleotide: u8) -> bool {
    matches!(
        nucleotide,
        b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't'
    )
}

/// Check if k-mer contains only ACGT nucleotides
#[inline]
fn kmer_contains_only_acgt(kmer: &[u8]) -> bool {
    kmer.iter().all(|&b| is_valid_acgt(b))
}

/// Canonicalise IUPAC ambiguous nucleotides to ACGT
#[inline]
fn canonicalise_nucleotide(nucleotide: u8) -> u8 {
    match nucleotide {
        b'A' | b'a' => b'A',
        b'C' | b'c' => b'C',
        b'G' | b'g' => b'G',
        b'T' | b't' => b'T',
        b'R' | b'r' => b'G',
        b'Y' | b'y' => b'C',
        b'S' | b's' => b'G',
        b'W' | b'w' => b'A',
        b'K' | b'k' => b'G',
        b'M' | b'm' => b'C',
        b'B' | b'b' => b'C',
        b'D' | b'd' => b'G',
        b'H' | b'h' => b'C',
        b'V' | b'v' => b'G',
        _ => b'C',
    }
}

fn canonicalise_sequence(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&nucleotide| canonicalise_nucleotide(nucleotide))
        .collect()
}

/// Check that (k, w) is usable by the canonical minimizer scheme
///
/// Canonical minimizers need an odd window span `k + w - 1`, so `k + w` must
/// be even.
pub fn validate_parameters(kmer_length: usize, window_size: usize) -> Result<()> {
    if kmer_length == 0 || window_size == 0 {
        return Err(SeqminiError::usage(format!(
            "k-mer length and window size must be positive (k={}, w={})",
            kmer_length, window_size
        )));
    }
    if kmer_length > MAX_KMER_LENGTH || (kmer_length + window_size) % 2 != 0 {
        return Err(SeqminiError::usage(format!(
            "Invalid k-w combination: k={}, w={}, k+w={} (constraints: k<={}, k+w even)",
            kmer_length,
            window_size,
            kmer_length + window_size,
            MAX_KMER_LENGTH
        )));
    }
    Ok(())
}

/// Returns all minimizer hashes of a sequence, in order along the sequence
pub fn compute_minimizer_hashes(
    seq: &[u8],
    kmer_length: usize,
    window_size: usize,
) -> Result<Vec<u64>> {
    let mut hashes = Vec::new();
    fill_minimizer_hashes(seq, kmer_length, window_size, &mut hashes)?;
    Ok(hashes)
}

/// Fill a vector with minimizer hashes, skipping k-mers with non-ACGT bases
///
/// Fails with [`SeqminiError::Usage`] when `(k, w)` is rejected by
/// [`validate_parameters`]; `hashes` is left empty in that case.
pub fn fill_minimizer_hashes(
    seq: &[u8],
    kmer_length: usize,
    window_size: usize,
    hashes: &mut Vec<u64>,
) -> Result<()> {
    hashes.clear();
    validate_parameters(kmer_length, window_size)?;

    // No complete window
    if seq.len() < kmer_length + window_size - 1 {
        return Ok(());
    }

    let canonical_seq = canonicalise_sequence(seq);

    let mut positions = Vec::new();
    simd_minimizers::canonical_minimizer_positions(
        AsciiSeq(&canonical_seq),
        kmer_length,
        window_size,
        &mut positions,
    );

    // Ambiguous bases were rewritten for the SIMD pass; drop the k-mers they touch
    positions.retain(|&pos| {
        let pos = pos as usize;
        kmer_contains_only_acgt(&seq[pos..pos + kmer_length])
    });

    hashes.extend(
        simd_minimizers::iter_canonical_minimizer_values(
            AsciiSeq(&canonical_seq),
            kmer_length,
            &positions,
        )
        .map(|kmer| xxh3::xxh3_64(&kmer.to_le_bytes())),
    );
    Ok(())
}
