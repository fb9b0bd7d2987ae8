//! Pipeline driver: loads inputs, runs the liftover in batches, joins
//! against the reference, harmonizes, and writes the output table.

use crate::error::HarmonizeError;
use crate::harmonize::harmonize;
use crate::liftover::CoordinateLifter;
use crate::matcher::match_reference;
use crate::output::{OutputWriter, DEFAULT_OUTPUT_FILENAME};
use crate::parsers::{ChainSet, GwasTable, ReferenceSet};
use crate::types::{GenomeBuild, LiftedRecord};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Everything the pipeline needs, passed explicitly so that loaders and
/// the writer can be pointed elsewhere in tests. No module-level paths.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub genome_build: GenomeBuild,
    pub input: PathBuf,
    pub reference: PathBuf,
    /// Required when `genome_build` is not hg38; ignored otherwise.
    pub chain_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub output_filename: String,
    pub batch_size: usize,
}

impl PipelineConfig {
    pub fn new(
        genome_build: GenomeBuild,
        input: PathBuf,
        reference: PathBuf,
        chain_file: Option<PathBuf>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            genome_build,
            input,
            reference,
            chain_file,
            output_dir,
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Pipeline stages, reported to the progress observer as each one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadReference,
    LoadInput,
    Liftover,
    Match,
    Harmonize,
    Write,
}

/// Row counts per stage, for logging and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub input_rows: usize,
    /// Rows that received an hg38 coordinate (identity or chain hit).
    pub lifted_rows: usize,
    /// Rows surviving the join and allele filter.
    pub matched_rows: usize,
    pub written_rows: usize,
    pub output_path: PathBuf,
}

/// Run the whole pipeline. Fatal errors abort with a diagnostic naming
/// the failing file or stage; per-record liftover misses and allele
/// mismatches only reduce the surviving row count.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, HarmonizeError> {
    run_with_observer(config, |_| {})
}

/// Like [`run`], with a callback invoked at the start of each stage.
pub fn run_with_observer(
    config: &PipelineConfig,
    mut observer: impl FnMut(Stage),
) -> Result<RunSummary, HarmonizeError> {
    observer(Stage::LoadReference);
    let reference = ReferenceSet::from_path(&config.reference)?;
    info!(variants = reference.len(), "loaded reference variant list");

    observer(Stage::LoadInput);
    let table = GwasTable::from_path(&config.input)?;
    let input_rows = table.records.len();
    info!(rows = input_rows, "loaded GWAS summary statistics");

    observer(Stage::Liftover);
    let lifter = build_lifter(config)?;
    let lifted = lift_in_batches(&lifter, &table, config.batch_size)?;
    let lifted_rows = lifted.iter().filter(|r| r.hg38_position.is_some()).count();
    info!(
        source_build = %config.genome_build,
        mapped = lifted_rows,
        unmapped = input_rows - lifted_rows,
        "liftover to hg38 complete"
    );

    observer(Stage::Match);
    let joined = match_reference(&lifted, &reference);
    let matched_rows = joined.len();
    info!(rows = matched_rows, "joined against reference and filtered alleles");

    observer(Stage::Harmonize);
    let harmonized = harmonize(joined);

    observer(Stage::Write);
    let writer = OutputWriter::new(&config.output_dir, &config.output_filename);
    let output_path = writer.write(&harmonized, &table.extra_headers)?;
    info!(rows = harmonized.len(), path = %output_path.display(), "wrote harmonized table");

    Ok(RunSummary {
        input_rows,
        lifted_rows,
        matched_rows,
        written_rows: harmonized.len(),
        output_path,
    })
}

fn build_lifter(config: &PipelineConfig) -> Result<CoordinateLifter, HarmonizeError> {
    match config.genome_build {
        GenomeBuild::Hg38 => Ok(CoordinateLifter::new(GenomeBuild::Hg38, None)),
        GenomeBuild::Hg19 => {
            let path = config.chain_file.as_ref().ok_or_else(|| {
                HarmonizeError::ChainFileRequired {
                    build: config.genome_build.to_string(),
                }
            })?;
            let chains = Arc::new(ChainSet::from_path(path)?);
            info!(chains = chains.len(), path = %path.display(), "loaded liftover chains");
            Ok(CoordinateLifter::new(config.genome_build, Some(chains)))
        }
    }
}

/// Lift the table in fixed-size batches, in parallel over a shared
/// read-only chain set, and concatenate results in input order. Batch
/// boundaries carry no meaning: output is identical for any batch size.
fn lift_in_batches(
    lifter: &CoordinateLifter,
    table: &GwasTable,
    batch_size: usize,
) -> Result<Vec<LiftedRecord>, HarmonizeError> {
    let batch_size = batch_size.max(1);
    let batches: Vec<Vec<LiftedRecord>> = table
        .records
        .par_chunks(batch_size)
        .map(|batch| lifter.lift_batch(batch))
        .collect();
    concat_batches(batches, table.extra_headers.len(), table.records.len())
}

/// Concatenate lifted batches in input order after checking each row
/// against the declared lifted schema: the input columns plus the hg38
/// coordinate, with the same pass-through width on every row. A batch
/// producer that changes the row shape aborts the run here.
fn concat_batches(
    batches: Vec<Vec<LiftedRecord>>,
    expected_width: usize,
    capacity: usize,
) -> Result<Vec<LiftedRecord>, HarmonizeError> {
    let mut lifted = Vec::with_capacity(capacity);
    for (i, batch) in batches.into_iter().enumerate() {
        if let Some(bad) = batch.iter().find(|r| r.record.extra.len() != expected_width) {
            return Err(HarmonizeError::SchemaMismatch {
                msg: format!(
                    "batch {} produced a row with {} pass-through columns, schema declares {}",
                    i,
                    bad.record.extra.len(),
                    expected_width
                ),
            });
        }
        lifted.extend(batch);
    }
    Ok(lifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    const GWAS_HEADER: &str = "chromosome\tbase_pair_location\teffect_allele\tother_allele\tbeta\tstandard_error\teffect_allele_frequency\tp_value\tvariant_id\trs_id\tn\tCHISQ";

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn config_for(dir: &Path, build: GenomeBuild, chain: Option<PathBuf>) -> PipelineConfig {
        PipelineConfig {
            genome_build: build,
            input: dir.join("gwas.tsv"),
            reference: dir.join("ref.snplist"),
            chain_file: chain,
            output_dir: dir.join("out"),
            output_filename: "harmonized.tsv".to_string(),
            batch_size: 2,
        }
    }

    #[test]
    fn hg38_run_counts_stages() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gwas.tsv",
            &format!(
                "{}\n1\t1000\tA\tG\t0.5\t0.1\t0.3\t1e-8\tv1\trs1\t100\t1.0\n\
                 1\t1000\tG\tA\t0.5\t0.1\t0.3\t1e-8\tv2\trs2\t100\t1.0\n\
                 1\t1000\tA\tT\t0.5\t0.1\t0.3\t1e-8\tv3\trs3\t100\t1.0\n\
                 1\t9999\tA\tG\t0.5\t0.1\t0.3\t1e-8\tv4\trs4\t100\t1.0\n",
                GWAS_HEADER
            ),
        );
        write_file(dir.path(), "ref.snplist", "1\t1000\trsA\tA\tG\n");

        let summary = run(&config_for(dir.path(), GenomeBuild::Hg38, None)).unwrap();
        assert_eq!(summary.input_rows, 4);
        assert_eq!(summary.lifted_rows, 4); // identity maps everything
        assert_eq!(summary.matched_rows, 2); // direct + swapped survive
        assert_eq!(summary.written_rows, 2);
        assert!(summary.output_path.exists());
    }

    #[test]
    fn hg19_without_chain_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gwas.tsv",
            &format!("{}\n1\t1000\tA\tG\t0.5\t0.1\t0.3\t1e-8\tv\trs\t1\t1\n", GWAS_HEADER),
        );
        write_file(dir.path(), "ref.snplist", "1\t1000\trsA\tA\tG\n");

        let err = run(&config_for(dir.path(), GenomeBuild::Hg19, None)).unwrap_err();
        assert!(matches!(err, HarmonizeError::ChainFileRequired { .. }));
        assert!(err.to_string().contains("hg19"));
    }

    #[test]
    fn batch_with_unexpected_row_width_is_fatal() {
        use crate::types::GwasRecord;

        let row = LiftedRecord {
            record: GwasRecord {
                chromosome: "1".to_string(),
                base_pair_location: 1000,
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
                extra: vec!["stray".to_string()],
            },
            hg38_position: Some(1000),
        };

        // Declared schema has no pass-through columns; the row carries one.
        let err = concat_batches(vec![vec![row]], 0, 1).unwrap_err();
        assert!(matches!(err, HarmonizeError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("schema declares 0"));
    }

    #[test]
    fn observer_sees_stages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gwas.tsv",
            &format!("{}\n1\t1000\tA\tG\t0.5\t0.1\t0.3\t1e-8\tv\trs\t1\t1\n", GWAS_HEADER),
        );
        write_file(dir.path(), "ref.snplist", "1\t1000\trsA\tA\tG\n");

        let mut stages = Vec::new();
        run_with_observer(&config_for(dir.path(), GenomeBuild::Hg38, None), |s| {
            stages.push(s)
        })
        .unwrap();
        assert_eq!(
            stages,
            vec![
                Stage::LoadReference,
                Stage::LoadInput,
                Stage::Liftover,
                Stage::Match,
                Stage::Harmonize,
                Stage::Write,
            ]
        );
    }
}
