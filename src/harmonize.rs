//! Allele harmonization: express every joined row relative to the
//! reference's ref/alt orientation.
//!
//! Swapped rows (effect == alt, other == ref) have their effect direction
//! inverted: beta negated, effect-allele frequency complemented, allele
//! labels set to ref/alt. Direct rows are already reference-oriented and
//! pass through numerically unchanged. In both cases the variant id is
//! overwritten from the reference. No row is dropped: cardinality in
//! equals cardinality out.

use crate::types::{AlleleOrientation, HarmonizedRecord, JoinedRecord};

pub fn harmonize(joined: Vec<JoinedRecord>) -> Vec<HarmonizedRecord> {
    joined.into_iter().map(harmonize_row).collect()
}

fn harmonize_row(row: JoinedRecord) -> HarmonizedRecord {
    let JoinedRecord {
        record,
        hg38_position,
        reference,
        orientation,
    } = row;

    let (beta, effect_allele_frequency) = match orientation {
        AlleleOrientation::Direct => (record.beta, record.effect_allele_frequency),
        AlleleOrientation::Swapped => (-record.beta, 1.0 - record.effect_allele_frequency),
    };

    HarmonizedRecord {
        chromosome: record.chromosome,
        hg38_position,
        effect_allele: reference.ref_allele,
        other_allele: reference.alt_allele,
        beta,
        standard_error: record.standard_error,
        effect_allele_frequency,
        p_value: record.p_value,
        variant_id: reference.id,
        rs_id: record.rs_id,
        sample_size: record.sample_size,
        chisq: record.chisq,
        extra: record.extra,
    }
}
