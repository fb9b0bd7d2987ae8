//! Input file readers: GWAS summary statistics, the reference variant
//! list, and UCSC chain files.

pub mod chain;
pub mod gwas;
pub mod snplist;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub use chain::{ChainSet, LiftCandidate};
pub use gwas::GwasTable;
pub use snplist::ReferenceSet;

/// Open a file for buffered reading, transparently decoding `.gz`.
pub fn open_file(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false)
    {
        let decoder: Box<dyn Read> = Box::new(GzDecoder::new(file));
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Normalize a chromosome name to the bare form used as a join key:
/// strip a leading "chr"/"Chr"/"CHR" prefix and surrounding whitespace.
pub fn normalize_chromosome(raw: &str) -> String {
    let trimmed = raw.trim();
    // get(..3) is None when byte 3 is not a char boundary, so arbitrary
    // multi-byte names pass through instead of panicking.
    let bare = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &trimmed[3..],
        _ => trimmed,
    };
    bare.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_chr_prefix() {
        assert_eq!(normalize_chromosome("chr1"), "1");
        assert_eq!(normalize_chromosome("Chr22"), "22");
        assert_eq!(normalize_chromosome("CHRX"), "X");
        assert_eq!(normalize_chromosome(" 7 "), "7");
        assert_eq!(normalize_chromosome("12"), "12");
    }

    #[test]
    fn normalize_keeps_short_names() {
        assert_eq!(normalize_chromosome("X"), "X");
        assert_eq!(normalize_chromosome("MT"), "MT");
    }

    #[test]
    fn normalize_handles_multibyte_names() {
        // Chromosome is an arbitrary user-supplied string; odd names must
        // pass through rather than abort the run.
        assert_eq!(normalize_chromosome("αβ"), "αβ");
        assert_eq!(normalize_chromosome("ひと"), "ひと");
        assert_eq!(normalize_chromosome("chrαβ"), "αβ");
    }
}
