use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline errors. Per-record conditions (no chain mapping, allele
/// mismatch) are not errors; they only reduce the surviving row count.
#[derive(Debug, Error)]
pub enum HarmonizeError {
    /// Reference variant list missing or malformed. Aborts before any
    /// processing.
    #[error("failed to load reference variant list {}: {msg}", path.display())]
    ReferenceLoad { path: PathBuf, msg: String },

    /// GWAS summary-statistics file missing, malformed, or missing a
    /// required column.
    #[error("failed to load GWAS summary statistics {}: {msg}", path.display())]
    InputLoad { path: PathBuf, msg: String },

    /// Chain file missing or malformed.
    #[error("failed to load chain file {}: {msg}", path.display())]
    ChainLoad { path: PathBuf, msg: String },

    /// Liftover requested for a non-hg38 build without a chain file.
    #[error("a chain file is required to lift {build} coordinates to hg38")]
    ChainFileRequired { build: String },

    /// Liftover output did not conform to the declared schema. Fatal,
    /// since batch concatenation assumes a fixed schema.
    #[error("liftover schema mismatch: {msg}")]
    SchemaMismatch { msg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
