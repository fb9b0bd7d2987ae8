use serde::{Deserialize, Serialize};

/// Genome builds accepted on the input side. Output is always hg38.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum GenomeBuild {
    Hg19,
    Hg38,
}

impl std::fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenomeBuild::Hg19 => write!(f, "hg19"),
            GenomeBuild::Hg38 => write!(f, "hg38"),
        }
    }
}

/// Strand of a liftover candidate, as reported by the chain alignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Strand {
    Plus,
    Minus,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// One row of the reference variant list (hg38 coordinates).
///
/// The (chromosome, position) key is not required to be unique; duplicate
/// keys each act as a separate join candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceVariant {
    pub chromosome: String,
    pub position: u64,
    pub id: String,
    pub ref_allele: String,
    pub alt_allele: String,
}

/// One row of the input GWAS summary-statistics table.
///
/// Typed columns are the ones the pipeline reads or rewrites. Any further
/// input columns are carried in `extra`, in input order, and written back
/// untouched; their headers live on [`crate::parsers::gwas::GwasTable`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GwasRecord {
    pub chromosome: String,
    /// Position in the source build's coordinates (1-based).
    pub base_pair_location: u64,
    pub effect_allele: String,
    pub other_allele: String,
    pub beta: f64,
    pub standard_error: f64,
    pub effect_allele_frequency: f64,
    pub p_value: f64,
    pub variant_id: String,
    pub rs_id: String,
    pub sample_size: Option<u64>,
    pub chisq: Option<f64>,
    pub extra: Vec<String>,
}

/// A GWAS record with its hg38 coordinate attached.
///
/// `hg38_position` is `None` when the source position has no mapping in
/// hg38 (deleted, split, or ambiguous region). Such records survive to the
/// matcher, which drops them through the inner join.
#[derive(Debug, Clone, PartialEq)]
pub struct LiftedRecord {
    pub record: GwasRecord,
    pub hg38_position: Option<u64>,
}

/// Orientation of a GWAS allele pair relative to the reference ref/alt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlleleOrientation {
    /// effect == ref and other == alt.
    Direct,
    /// effect == alt and other == ref.
    Swapped,
}

impl AlleleOrientation {
    /// Classify a GWAS allele pair against a reference variant. `None`
    /// means neither orientation holds and the row must be dropped.
    pub fn classify(
        effect_allele: &str,
        other_allele: &str,
        reference: &ReferenceVariant,
    ) -> Option<Self> {
        if effect_allele == reference.ref_allele && other_allele == reference.alt_allele {
            Some(AlleleOrientation::Direct)
        } else if effect_allele == reference.alt_allele && other_allele == reference.ref_allele {
            Some(AlleleOrientation::Swapped)
        } else {
            None
        }
    }
}

/// A lifted GWAS record joined with a reference variant at the same
/// (chromosome, hg38 position) key, with a compatible allele pair.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub record: GwasRecord,
    pub hg38_position: u64,
    pub reference: ReferenceVariant,
    pub orientation: AlleleOrientation,
}

/// Final, reference-oriented output row.
///
/// Invariant: `effect_allele == reference.ref_allele`,
/// `other_allele == reference.alt_allele` and `variant_id == reference.id`
/// for the reference variant the row was joined to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarmonizedRecord {
    pub chromosome: String,
    pub hg38_position: u64,
    pub effect_allele: String,
    pub other_allele: String,
    pub beta: f64,
    pub standard_error: f64,
    pub effect_allele_frequency: f64,
    pub p_value: f64,
    pub variant_id: String,
    pub rs_id: String,
    pub sample_size: Option<u64>,
    pub chisq: Option<f64>,
    pub extra: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceVariant {
        ReferenceVariant {
            chromosome: "1".to_string(),
            position: 1000,
            id: "rsA".to_string(),
            ref_allele: "A".to_string(),
            alt_allele: "G".to_string(),
        }
    }

    #[test]
    fn classify_direct() {
        assert_eq!(
            AlleleOrientation::classify("A", "G", &reference()),
            Some(AlleleOrientation::Direct)
        );
    }

    #[test]
    fn classify_swapped() {
        assert_eq!(
            AlleleOrientation::classify("G", "A", &reference()),
            Some(AlleleOrientation::Swapped)
        );
    }

    #[test]
    fn classify_rejects_mismatch() {
        assert_eq!(AlleleOrientation::classify("A", "T", &reference()), None);
        assert_eq!(AlleleOrientation::classify("AT", "G", &reference()), None);
        assert_eq!(AlleleOrientation::classify("", "", &reference()), None);
    }
}
