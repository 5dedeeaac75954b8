//! variant-aliases CLI entry point
//!
//! Converts a VEP-annotated variant table into a JSON file of alias records.

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::time::Instant;
use variant_aliases::core::io::is_same_file;
use variant_aliases::formats::{convert_vep, ConvertOptions};

#[derive(Parser)]
#[command(name = "variant-aliases")]
#[command(about = "Generate HGVS alias records from VEP-annotated variants")]
#[command(version)]
struct Cli {
    /// Input VEP table (tab-delimited, optionally gzip/bzip2 compressed)
    input: PathBuf,
    /// Output JSON file (default: input path with .json extension)
    output: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,
    /// Write records as they are produced instead of at the end
    #[arg(short = 's', long)]
    stream: bool,
    /// Number of threads for buffered conversion
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,
    /// Overwrite the output file if it exists
    #[arg(short = 'f', long)]
    force: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp_secs()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let start = Instant::now();

    if !cli.input.exists() {
        bail!("Input file not found: {}", cli.input.display());
    }

    let output_path = cli.output.unwrap_or_else(|| cli.input.with_extension("json"));
    if is_same_file(&cli.input, &output_path) {
        bail!(
            "Output file {} is the input file; choose another output path",
            output_path.display()
        );
    }
    if output_path.exists() && !cli.force {
        bail!(
            "Output file {} already exists (use --force to overwrite)",
            output_path.display()
        );
    }

    let options = ConvertOptions {
        stream: cli.stream,
        threads: cli.threads.max(1),
    };

    info!("Converting {} -> {}", cli.input.display(), output_path.display());
    let stats = convert_vep(&cli.input, &output_path, &options)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    stats.report();
    info!("Time elapsed: {:.2}s", start.elapsed().as_secs_f64());
    info!("Output written to {}", output_path.display());

    Ok(())
}
