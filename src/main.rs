use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use tracing::info;

use gwas_harmonize::pipeline::{self, PipelineConfig, Stage, DEFAULT_BATCH_SIZE};
use gwas_harmonize::types::GenomeBuild;
use gwas_harmonize::DEFAULT_OUTPUT_FILENAME;

/// Harmonize GWAS summary statistics onto hg38 and a reference variant list
#[derive(Parser, Debug)]
#[command(
    name = "gwas-harmonize",
    version,
    about = "Liftover and allele harmonization for GWAS summary statistics",
    long_about = r#"
Converts a GWAS summary-statistics table to hg38 coordinates, joins it
against a reference variant list, and corrects swapped allele orientations
(beta sign, effect-allele frequency, allele labels) so every output row is
expressed relative to the reference's ref/alt alleles.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Genome build of the input GWAS file
    #[arg(short, long, value_enum, required_unless_present = "completions")]
    genome_build: Option<GenomeBuild>,

    /// Input GWAS summary-statistics file (TSV with header)
    #[arg(
        short,
        long,
        value_name = "FILE",
        value_hint = ValueHint::FilePath,
        required_unless_present = "completions"
    )]
    input: Option<PathBuf>,

    /// Output directory (created if absent)
    #[arg(
        short,
        long,
        value_name = "DIR",
        value_hint = ValueHint::DirPath,
        required_unless_present = "completions"
    )]
    output: Option<PathBuf>,

    /// Reference variant list (headerless TSV: chromosome, position, id, ref, alt)
    #[arg(
        short,
        long,
        value_name = "FILE",
        value_hint = ValueHint::FilePath,
        required_unless_present = "completions"
    )]
    reference: Option<PathBuf>,

    /// UCSC chain file for liftover (required unless --genome-build hg38)
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    chain_file: Option<PathBuf>,

    /// Output filename inside the output directory
    #[arg(long, default_value = DEFAULT_OUTPUT_FILENAME)]
    output_filename: String,

    /// Liftover batch size (batching never changes results)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    init_thread_pool(cli.threads)?;

    let config = config_from_cli(&cli)?;

    info!("starting GWAS harmonization");
    info!("using {} threads", rayon::current_num_threads());

    let pb = ProgressBar::new(6);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = pipeline::run_with_observer(&config, |stage| {
        pb.set_message(match stage {
            Stage::LoadReference => "Loading reference variant list...",
            Stage::LoadInput => "Loading GWAS summary statistics...",
            Stage::Liftover => "Lifting coordinates to hg38...",
            Stage::Match => "Joining against reference...",
            Stage::Harmonize => "Harmonizing alleles...",
            Stage::Write => "Writing output table...",
        });
        pb.inc(1);
    })
    .context("harmonization failed")?;

    pb.finish_with_message("Harmonization complete");

    println!(
        "\n{} {} of {} input rows harmonized ({} lifted, {} matched)",
        style("✓").green().bold(),
        summary.written_rows,
        summary.input_rows,
        summary.lifted_rows,
        summary.matched_rows,
    );
    println!(
        "{} Output written to: {}",
        style("✓").green().bold(),
        style(summary.output_path.display()).cyan()
    );

    Ok(())
}

fn config_from_cli(cli: &Cli) -> Result<PipelineConfig> {
    // clap enforces these unless --completions was given, and that case
    // returns before reaching here.
    let genome_build = cli.genome_build.context("--genome-build is required")?;
    let input = cli.input.clone().context("--input is required")?;
    let output = cli.output.clone().context("--output is required")?;
    let reference = cli.reference.clone().context("--reference is required")?;

    if genome_build != GenomeBuild::Hg38 && cli.chain_file.is_none() {
        anyhow::bail!(
            "--chain-file is required when --genome-build is {}",
            genome_build
        );
    }

    let mut config = PipelineConfig::new(
        genome_build,
        input,
        reference,
        cli.chain_file.clone(),
        output,
    );
    config.output_filename = cli.output_filename.clone();
    config.batch_size = cli.batch_size;
    Ok(config)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("gwas_harmonize={}", level))
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}
