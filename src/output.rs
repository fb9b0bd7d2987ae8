//! Harmonized table writer.

use crate::error::HarmonizeError;
use crate::types::HarmonizedRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed output filename convention inherited from the original tool.
pub const DEFAULT_OUTPUT_FILENAME: &str = "GWAS_new_1M.tsv";

/// Typed output columns, in order. Pass-through columns follow these.
const OUTPUT_COLUMNS: &[&str] = &[
    "chromosome",
    "hg38_position",
    "effect_allele",
    "other_allele",
    "beta",
    "standard_error",
    "effect_allele_frequency",
    "p_value",
    "variant_id",
    "rs_id",
    "n",
    "CHISQ",
];

/// Writes the harmonized table as a tab-separated file into `output_dir`
/// (created if absent).
pub struct OutputWriter {
    output_dir: PathBuf,
    filename: String,
}

impl OutputWriter {
    pub fn new(output_dir: &Path, filename: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            filename: filename.to_string(),
        }
    }

    /// Write all records. `extra_headers` are the pass-through column
    /// names, in the order the values are stored on each record.
    pub fn write(
        &self,
        records: &[HarmonizedRecord],
        extra_headers: &[String],
    ) -> Result<PathBuf, HarmonizeError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(&self.filename);

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .map_err(|e| HarmonizeError::Io(std::io::Error::other(e)))?;

        let header: Vec<&str> = OUTPUT_COLUMNS
            .iter()
            .copied()
            .chain(extra_headers.iter().map(String::as_str))
            .collect();
        writer
            .write_record(&header)
            .map_err(|e| HarmonizeError::Io(std::io::Error::other(e)))?;

        for record in records {
            let mut row: Vec<String> = vec![
                record.chromosome.clone(),
                record.hg38_position.to_string(),
                record.effect_allele.clone(),
                record.other_allele.clone(),
                record.beta.to_string(),
                record.standard_error.to_string(),
                record.effect_allele_frequency.to_string(),
                record.p_value.to_string(),
                record.variant_id.clone(),
                record.rs_id.clone(),
                record.sample_size.map(|n| n.to_string()).unwrap_or_default(),
                record.chisq.map(|c| c.to_string()).unwrap_or_default(),
            ];
            row.extend(record.extra.iter().cloned());
            writer
                .write_record(&row)
                .map_err(|e| HarmonizeError::Io(std::io::Error::other(e)))?;
        }

        writer
            .flush()
            .map_err(HarmonizeError::Io)?;
        Ok(path)
    }
}
