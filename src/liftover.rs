//! Coordinate liftover to hg38.
//!
//! GWAS positions are 1-based; chain arithmetic is 0-based. Conversion
//! happens here, at the boundary, in both directions.

use crate::parsers::ChainSet;
use crate::types::{GenomeBuild, GwasRecord, LiftedRecord};
use std::sync::Arc;

/// Tie-break policy when a position has multiple liftover candidates.
///
/// The chain resource orders candidates deterministically; the policy
/// names which one wins. Ambiguous mappings materially affect downstream
/// row survival, so the choice is explicit rather than an accident of
/// iteration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidatePolicy {
    /// Take the candidate from the highest-scoring chain (ties broken by
    /// ascending chain id).
    #[default]
    HighestScore,
}

/// Translates GWAS record coordinates from the source build to hg38.
///
/// For an hg38 source the lifter is an identity pass-through and holds no
/// chain set at all, so no chain lookup can occur. Otherwise it shares a
/// read-only [`ChainSet`], which batches can query concurrently.
#[derive(Debug, Clone)]
pub struct CoordinateLifter {
    chains: Option<Arc<ChainSet>>,
    policy: CandidatePolicy,
}

impl CoordinateLifter {
    /// Build a lifter for the given source build. `chains` must be
    /// `Some` when the source build is not hg38; it is ignored (and may
    /// be `None`) for hg38 input.
    pub fn new(source_build: GenomeBuild, chains: Option<Arc<ChainSet>>) -> Self {
        let chains = match source_build {
            GenomeBuild::Hg38 => None,
            GenomeBuild::Hg19 => chains,
        };
        Self {
            chains,
            policy: CandidatePolicy::default(),
        }
    }

    /// Override the candidate tie-break policy.
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lift one batch of records. Infallible by contract: a position with
    /// no chain mapping yields `hg38_position == None` for that record
    /// only. Output order matches input order, so batches concatenate
    /// without bookkeeping, and the result is identical for any batching
    /// of the same input.
    pub fn lift_batch(&self, records: &[GwasRecord]) -> Vec<LiftedRecord> {
        records
            .iter()
            .map(|record| LiftedRecord {
                record: record.clone(),
                hg38_position: self.lift_position(record),
            })
            .collect()
    }

    fn lift_position(&self, record: &GwasRecord) -> Option<u64> {
        let Some(chains) = &self.chains else {
            // Identity: source already in hg38 coordinates.
            return Some(record.base_pair_location);
        };

        // Chain resources key chromosomes with a "chr" prefix.
        let contig = format!("chr{}", crate::parsers::normalize_chromosome(&record.chromosome));
        let pos0 = record.base_pair_location.checked_sub(1)?;

        let candidates = chains.map_position(&contig, pos0);
        let winner = match self.policy {
            // map_position returns candidates ordered by descending
            // score, ascending chain id; first is the policy's pick.
            CandidatePolicy::HighestScore => candidates.first()?,
        };
        Some(winner.position + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(chromosome: &str, pos: u64) -> GwasRecord {
        GwasRecord {
            chromosome: chromosome.to_string(),
            base_pair_location: pos,
            effect_allele: "A".to_string(),
            other_allele: "G".to_string(),
            beta: 0.5,
            standard_error: 0.1,
            effect_allele_frequency: 0.3,
            p_value: 1e-8,
            variant_id: String::new(),
            rs_id: String::new(),
            sample_size: None,
            chisq: None,
            extra: Vec::new(),
        }
    }

    fn shifted_chain() -> Arc<ChainSet> {
        // Source 0..1000 maps to destination 100..1100 on chr1.
        let data = "chain 1000 chr1 2000 + 0 1000 chr1 2000 + 100 1100 1\n1000\n\n";
        Arc::new(ChainSet::parse(Cursor::new(data)).unwrap())
    }

    #[test]
    fn hg38_input_is_identity() {
        let lifter = CoordinateLifter::new(GenomeBuild::Hg38, None);
        let lifted = lifter.lift_batch(&[record("1", 1000), record("X", 42)]);
        assert_eq!(lifted[0].hg38_position, Some(1000));
        assert_eq!(lifted[1].hg38_position, Some(42));
    }

    #[test]
    fn hg38_input_ignores_chain_set() {
        // Chain would shift by +100; identity must win for hg38 input.
        let lifter = CoordinateLifter::new(GenomeBuild::Hg38, Some(shifted_chain()));
        let lifted = lifter.lift_batch(&[record("1", 500)]);
        assert_eq!(lifted[0].hg38_position, Some(500));
    }

    #[test]
    fn hg19_input_follows_chain() {
        let lifter = CoordinateLifter::new(GenomeBuild::Hg19, Some(shifted_chain()));
        // 1-based 500 -> 0-based 499 -> lifted 599 -> 1-based 600
        let lifted = lifter.lift_batch(&[record("1", 500)]);
        assert_eq!(lifted[0].hg38_position, Some(600));
    }

    #[test]
    fn unmapped_position_is_none_not_error() {
        let lifter = CoordinateLifter::new(GenomeBuild::Hg19, Some(shifted_chain()));
        let lifted = lifter.lift_batch(&[record("1", 5000), record("9", 500)]);
        assert_eq!(lifted[0].hg38_position, None);
        assert_eq!(lifted[1].hg38_position, None);
    }

    #[test]
    fn chr_prefixed_input_chromosome_is_accepted() {
        let lifter = CoordinateLifter::new(GenomeBuild::Hg19, Some(shifted_chain()));
        let lifted = lifter.lift_batch(&[record("chr1", 500)]);
        assert_eq!(lifted[0].hg38_position, Some(600));
    }

    #[test]
    fn batch_boundaries_do_not_change_results() {
        let lifter = CoordinateLifter::new(GenomeBuild::Hg19, Some(shifted_chain()));
        let records: Vec<GwasRecord> = (1..=10).map(|p| record("1", p * 50)).collect();

        let whole = lifter.lift_batch(&records);
        let mut chunked = Vec::new();
        for chunk in records.chunks(3) {
            chunked.extend(lifter.lift_batch(chunk));
        }
        assert_eq!(whole, chunked);
    }

    #[test]
    fn highest_score_candidate_wins() {
        let data = "chain 100 chr1 1000 + 0 500 chr1 1000 + 0 500 1\n500\n\n\
                    chain 900 chr1 1000 + 0 500 chr1 1000 + 200 700 2\n500\n\n";
        let chains = Arc::new(ChainSet::parse(Cursor::new(data)).unwrap());
        let lifter = CoordinateLifter::new(GenomeBuild::Hg19, Some(chains));
        // 1-based 10 -> 0-based 9; score-900 chain shifts +200 -> 209 -> 1-based 210
        let lifted = lifter.lift_batch(&[record("1", 10)]);
        assert_eq!(lifted[0].hg38_position, Some(210));
    }
}
