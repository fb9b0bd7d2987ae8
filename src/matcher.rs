//! Inner join of lifted GWAS records against the reference variant set.
//!
//! Rows drop out here for three reasons, all intentional QC filtering
//! rather than errors: no hg38 coordinate, no reference variant at the
//! locus, or an allele pair matching neither the direct nor the swapped
//! orientation.

use crate::parsers::ReferenceSet;
use crate::types::{AlleleOrientation, JoinedRecord, LiftedRecord};

/// Join lifted records with the reference on (chromosome, hg38 position)
/// and keep only allele-compatible rows.
///
/// Chromosomes are normalized to the same string form on both sides
/// inside [`ReferenceSet::find`], so a bare "1" and a "chr1" never
/// silently miss each other. Duplicate reference keys each yield their
/// own joined row (1:N).
pub fn match_reference(lifted: &[LiftedRecord], reference: &ReferenceSet) -> Vec<JoinedRecord> {
    let mut joined = Vec::new();

    for item in lifted {
        let Some(hg38_position) = item.hg38_position else {
            continue;
        };

        for candidate in reference.find(&item.record.chromosome, hg38_position) {
            let Some(orientation) = AlleleOrientation::classify(
                &item.record.effect_allele,
                &item.record.other_allele,
                candidate,
            ) else {
                continue;
            };

            joined.push(JoinedRecord {
                record: item.record.clone(),
                hg38_position,
                reference: candidate.clone(),
                orientation,
            });
        }
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GwasRecord;
    use std::io::Write;

    fn reference_set(rows: &str) -> ReferenceSet {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file.flush().unwrap();
        ReferenceSet::from_path(file.path()).unwrap()
    }

    fn lifted(chrom: &str, pos: Option<u64>, effect: &str, other: &str) -> LiftedRecord {
        LiftedRecord {
            record: GwasRecord {
                chromosome: chrom.to_string(),
                base_pair_location: 1,
                effect_allele: effect.to_string(),
                other_allele: other.to_string(),
                beta: 0.5,
                standard_error: 0.1,
                effect_allele_frequency: 0.3,
                p_value: 1e-8,
                variant_id: String::new(),
                rs_id: String::new(),
                sample_size: None,
                chisq: None,
                extra: Vec::new(),
            },
            hg38_position: pos,
        }
    }

    #[test]
    fn direct_and_swapped_rows_are_kept() {
        let reference = reference_set("1\t1000\trsA\tA\tG\n");
        let joined = match_reference(
            &[
                lifted("1", Some(1000), "A", "G"),
                lifted("1", Some(1000), "G", "A"),
            ],
            &reference,
        );
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].orientation, AlleleOrientation::Direct);
        assert_eq!(joined[1].orientation, AlleleOrientation::Swapped);
        assert_eq!(joined[0].reference.id, "rsA");
    }

    #[test]
    fn allele_mismatch_is_dropped_silently() {
        let reference = reference_set("1\t1000\trsA\tA\tG\n");
        let joined = match_reference(&[lifted("1", Some(1000), "A", "T")], &reference);
        assert!(joined.is_empty());
    }

    #[test]
    fn null_coordinate_is_dropped_by_the_join() {
        let reference = reference_set("1\t1000\trsA\tA\tG\n");
        let joined = match_reference(&[lifted("1", None, "A", "G")], &reference);
        assert!(joined.is_empty());
    }

    #[test]
    fn unmatched_locus_is_dropped() {
        let reference = reference_set("1\t1000\trsA\tA\tG\n");
        let joined = match_reference(&[lifted("1", Some(999), "A", "G")], &reference);
        assert!(joined.is_empty());
    }

    #[test]
    fn chromosome_representations_are_reconciled() {
        let reference = reference_set("chr1\t1000\trsA\tA\tG\n");
        let joined = match_reference(&[lifted("1", Some(1000), "A", "G")], &reference);
        assert_eq!(joined.len(), 1);
    }

    #[test]
    fn duplicate_reference_keys_fan_out() {
        let reference = reference_set("1\t1000\trsA\tA\tG\n1\t1000\trsB\tG\tA\n");
        let joined = match_reference(&[lifted("1", Some(1000), "A", "G")], &reference);
        // Direct against rsA, swapped against rsB.
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].reference.id, "rsA");
        assert_eq!(joined[0].orientation, AlleleOrientation::Direct);
        assert_eq!(joined[1].reference.id, "rsB");
        assert_eq!(joined[1].orientation, AlleleOrientation::Swapped);
    }
}
