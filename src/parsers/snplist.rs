//! Reference variant list loader.
//!
//! The reference list is a tab-separated, headerless file with exactly
//! five columns: chromosome, position (hg38), id, ref, alt.

use crate::error::HarmonizeError;
use crate::parsers::{normalize_chromosome, open_file};
use crate::types::ReferenceVariant;
use std::collections::HashMap;
use std::path::Path;

/// The reference variant set, loaded once and read-only thereafter.
///
/// Lookup is keyed by (normalized chromosome, hg38 position). Duplicate
/// keys are preserved in file order; each duplicate is a separate join
/// candidate.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    variants: HashMap<(String, u64), Vec<ReferenceVariant>>,
    len: usize,
}

impl ReferenceSet {
    pub fn from_path(path: &Path) -> Result<Self, HarmonizeError> {
        let ref_err = |msg: String| HarmonizeError::ReferenceLoad {
            path: path.to_path_buf(),
            msg,
        };

        let reader = open_file(path).map_err(|e| ref_err(e.to_string()))?;
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut set = ReferenceSet::default();
        for (idx, row) in csv.records().enumerate() {
            let line = idx + 1;
            let row = row.map_err(|e| ref_err(format!("line {}: {}", line, e)))?;
            if row.len() != 5 {
                return Err(ref_err(format!(
                    "line {}: expected 5 columns (chromosome, position, id, ref, alt), got {}",
                    line,
                    row.len()
                )));
            }
            let position: u64 = row[1].trim().parse().map_err(|_| {
                ref_err(format!("line {}: invalid position '{}'", line, &row[1]))
            })?;
            set.insert(ReferenceVariant {
                chromosome: row[0].trim().to_string(),
                position,
                id: row[2].trim().to_string(),
                ref_allele: row[3].trim().to_string(),
                alt_allele: row[4].trim().to_string(),
            });
        }
        Ok(set)
    }

    fn insert(&mut self, variant: ReferenceVariant) {
        let key = (normalize_chromosome(&variant.chromosome), variant.position);
        self.variants.entry(key).or_default().push(variant);
        self.len += 1;
    }

    /// All reference variants at a position. Chromosome is normalized on
    /// both sides, so "chr1" and "1" address the same key.
    pub fn find(&self, chromosome: &str, position: u64) -> &[ReferenceVariant] {
        self.variants
            .get(&(normalize_chromosome(chromosome), position))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of variants loaded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
