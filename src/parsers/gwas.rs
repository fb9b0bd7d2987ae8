//! GWAS summary-statistics TSV reader.
//!
//! The input is tab-separated with a header row. Columns the pipeline
//! reads or rewrites are mapped by name (case-insensitively); any other
//! column is carried through to the output untouched.

use crate::error::HarmonizeError;
use crate::parsers::open_file;
use crate::types::GwasRecord;
use std::collections::HashMap;
use std::path::Path;

/// Columns that must be present in the input.
const REQUIRED_COLUMNS: &[&str] = &[
    "chromosome",
    "base_pair_location",
    "effect_allele",
    "other_allele",
    "beta",
    "standard_error",
    "effect_allele_frequency",
    "p_value",
];

/// Optional named columns. `variant_id` is overwritten from the reference
/// during harmonization, so its absence in the input is fine.
const OPTIONAL_COLUMNS: &[&str] = &["variant_id", "rs_id", "n", "chisq"];

/// The parsed GWAS table: typed records plus the headers of the
/// pass-through columns (in input order).
#[derive(Debug, Clone)]
pub struct GwasTable {
    pub records: Vec<GwasRecord>,
    pub extra_headers: Vec<String>,
}

impl GwasTable {
    /// Load a GWAS summary-statistics file. All failures (missing file,
    /// missing required column, unparseable field) are fatal.
    pub fn from_path(path: &Path) -> Result<Self, HarmonizeError> {
        let input_err = |msg: String| HarmonizeError::InputLoad {
            path: path.to_path_buf(),
            msg,
        };

        let reader = open_file(path).map_err(|e| input_err(e.to_string()))?;
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| input_err(format!("failed to read header row: {}", e)))?
            .clone();
        let columns = ColumnMap::from_headers(&headers).map_err(input_err)?;

        let mut records = Vec::new();
        for (idx, row) in csv.records().enumerate() {
            // +2: one for the header row, one for 1-based numbering.
            let line = idx + 2;
            let row = row.map_err(|e| input_err(format!("line {}: {}", line, e)))?;
            records.push(columns.parse_row(&row, line).map_err(input_err)?);
        }

        Ok(Self {
            records,
            extra_headers: columns.extra_headers,
        })
    }
}

/// Resolved column positions for one input file.
struct ColumnMap {
    named: HashMap<&'static str, usize>,
    extra_indices: Vec<usize>,
    extra_headers: Vec<String>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        let mut named = HashMap::new();
        let mut extra_indices = Vec::new();
        let mut extra_headers = Vec::new();

        for (i, header) in headers.iter().enumerate() {
            let lower = header.trim().to_lowercase();
            let known = REQUIRED_COLUMNS
                .iter()
                .chain(OPTIONAL_COLUMNS)
                .find(|name| **name == lower);
            match known {
                Some(name) if !named.contains_key(name) => {
                    named.insert(*name, i);
                }
                _ => {
                    extra_indices.push(i);
                    extra_headers.push(header.trim().to_string());
                }
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !named.contains_key(**name))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(format!("missing required columns: {}", missing.join(", ")));
        }

        Ok(Self {
            named,
            extra_indices,
            extra_headers,
        })
    }

    fn field<'a>(&self, row: &'a csv::StringRecord, name: &'static str) -> Option<&'a str> {
        self.named.get(name).and_then(|&i| row.get(i))
    }

    fn required<'a>(
        &self,
        row: &'a csv::StringRecord,
        name: &'static str,
        line: usize,
    ) -> Result<&'a str, String> {
        self.field(row, name)
            .ok_or_else(|| format!("line {}: missing value for column '{}'", line, name))
    }

    fn parse_u64(
        &self,
        row: &csv::StringRecord,
        name: &'static str,
        line: usize,
    ) -> Result<u64, String> {
        let raw = self.required(row, name, line)?;
        raw.trim()
            .parse()
            .map_err(|_| format!("line {}: invalid {} '{}'", line, name, raw))
    }

    fn parse_f64(
        &self,
        row: &csv::StringRecord,
        name: &'static str,
        line: usize,
    ) -> Result<f64, String> {
        let raw = self.required(row, name, line)?;
        raw.trim()
            .parse()
            .map_err(|_| format!("line {}: invalid {} '{}'", line, name, raw))
    }

    fn parse_row(&self, row: &csv::StringRecord, line: usize) -> Result<GwasRecord, String> {
        let sample_size = match self.field(row, "n").map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                raw.parse()
                    .map_err(|_| format!("line {}: invalid n '{}'", line, raw))?,
            ),
            _ => None,
        };
        let chisq = match self.field(row, "chisq").map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                raw.parse()
                    .map_err(|_| format!("line {}: invalid chisq '{}'", line, raw))?,
            ),
            _ => None,
        };

        Ok(GwasRecord {
            chromosome: self.required(row, "chromosome", line)?.trim().to_string(),
            base_pair_location: self.parse_u64(row, "base_pair_location", line)?,
            effect_allele: self.required(row, "effect_allele", line)?.trim().to_string(),
            other_allele: self.required(row, "other_allele", line)?.trim().to_string(),
            beta: self.parse_f64(row, "beta", line)?,
            standard_error: self.parse_f64(row, "standard_error", line)?,
            effect_allele_frequency: self.parse_f64(row, "effect_allele_frequency", line)?,
            p_value: self.parse_f64(row, "p_value", line)?,
            variant_id: self
                .field(row, "variant_id")
                .unwrap_or_default()
                .trim()
                .to_string(),
            rs_id: self.field(row, "rs_id").unwrap_or_default().trim().to_string(),
            sample_size,
            chisq,
            extra: self
                .extra_indices
                .iter()
                .map(|&i| row.get(i).unwrap_or_default().to_string())
                .collect(),
        })
    }
}
