//! # GWAS Summary-Statistics Harmonizer
//!
//! Harmonizes a GWAS summary-statistics table onto the hg38 genome build
//! and a fixed reference variant list, so downstream statistical tools can
//! consume allele-matched, build-consistent data.
//!
//! The pipeline is linear:
//!
//! 1. Load the reference variant list (chromosome, hg38 position, id,
//!    ref, alt).
//! 2. Lift each GWAS record's coordinate to hg38 (identity when the input
//!    is already hg38; UCSC chain lookup otherwise), in batches.
//! 3. Inner-join lifted records against the reference on (chromosome,
//!    hg38 position), keeping only rows whose allele pair matches the
//!    reference pair directly or in swapped order.
//! 4. For swapped rows, flip the effect direction (negate beta,
//!    complement the effect-allele frequency, relabel alleles); overwrite
//!    every row's variant id from the reference.
//!
//! Records that cannot be lifted or matched are dropped silently; that is
//! QC filtering, not an error. Only malformed input files abort the run.

pub mod error;
pub mod harmonize;
pub mod liftover;
pub mod matcher;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod types;

// Re-export key types
pub use error::HarmonizeError;
pub use harmonize::harmonize;
pub use liftover::{CandidatePolicy, CoordinateLifter};
pub use matcher::match_reference;
pub use output::{OutputWriter, DEFAULT_OUTPUT_FILENAME};
pub use parsers::{ChainSet, GwasTable, LiftCandidate, ReferenceSet};
pub use pipeline::{run, PipelineConfig, RunSummary, Stage};
pub use types::*;
