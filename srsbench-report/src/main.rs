use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use srsbench_common::config::{validate_percentiles, DEFAULT_FILE_PATTERN, DEFAULT_OUTPUT_DIR};
use srsbench_common::{BenchError, DatasetConfig, ReportConfig, DEFAULT_PERCENTILES};
use srsbench_report::compare::load_comparison;
use srsbench_report::dataset::{random_text, split_file};
use srsbench_report::export::{summary_file_name, write_summary_file};
use srsbench_report::grouping::GroupingMode;
use srsbench_report::plot::{plot_comparison, plot_dataset};
use srsbench_report::summary::{collect_dataset, render_table};

/// No valid result was found.
const EXIT_NO_DATA: i32 = 1;
/// Bad arguments, unreadable configuration or an I/O failure.
const EXIT_SETUP: i32 = 3;

#[derive(Parser)]
#[command(name = "srsbench", about = "LLM serving benchmark result post-processing")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize the result files of one directory.
    Collect {
        /// Directory holding benchmark result JSON files
        dir: PathBuf,

        /// Only read files whose name matches this pattern (`*` wildcard)
        #[arg(long, default_value = DEFAULT_FILE_PATTERN)]
        pattern: String,

        /// Merge `<base>-<replica>.json` files of data-parallel replicas
        #[arg(long)]
        grouped: bool,

        /// Percentiles to report (repeatable)
        #[arg(long = "percentile")]
        percentiles: Vec<f64>,

        /// CSV output path (default: `<dir name>_summary.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare several datasets side by side, grouped by request rate.
    Compare {
        /// JSON comparison config; overrides the flags below
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory containing one sub-directory per dataset
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Dataset as NAME or NAME:grouped (repeatable)
        #[arg(long = "dataset")]
        datasets: Vec<String>,

        /// Percentiles to report (repeatable)
        #[arg(long = "percentile")]
        percentiles: Vec<f64>,

        /// Directory receiving the comparison CSVs
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Shuffle a JSONL prompt file and split it into two halves.
    Split {
        file: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write random lowercase text for long-context prompts.
    GenText {
        output: PathBuf,

        /// Approximate size of the generated text
        #[arg(long, default_value_t = 250_000)]
        bytes: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let outcome = match args.command {
        Command::Collect { dir, pattern, grouped, percentiles, output } => {
            collect(dir, &pattern, grouped, percentiles, output)
        }
        Command::Compare { config, root, datasets, percentiles, output_dir } => {
            compare(config, root, datasets, percentiles, output_dir)
        }
        Command::Split { file, seed } => split(file, seed),
        Command::GenText { output, bytes, seed } => gen_text(output, bytes, seed),
    };

    match outcome {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{e}");
            process::exit(EXIT_SETUP);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("srsbench=info,srsbench_report=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn collect(
    dir: PathBuf,
    pattern: &str,
    grouped: bool,
    percentiles: Vec<f64>,
    output: Option<PathBuf>,
) -> Result<i32, BenchError> {
    let percentiles = or_default_percentiles(percentiles)?;
    let mode = GroupingMode::from_grouped(grouped);
    let dataset = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());

    let rows = collect_dataset(&dir, &dataset, pattern, mode, &percentiles)?;
    if rows.is_empty() {
        eprintln!("No valid result files matching {pattern:?} in {}", dir.display());
        return Ok(EXIT_NO_DATA);
    }

    println!("Benchmark Metrics ({}, {} mode, sorted by request rate)", dataset, mode.as_name());
    println!("=========================================================");
    print!("{}", render_table(&rows, &percentiles));

    let output = output.unwrap_or_else(|| PathBuf::from(summary_file_name(&dataset)));
    write_summary_file(&output, &rows, &percentiles)?;
    println!();
    println!("Metrics saved to: {}", output.display());

    let chart_dir = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    match plot_dataset(chart_dir, &dataset, &rows) {
        Ok(charts) => charts.iter().for_each(|path| println!("Chart saved to: {}", path.display())),
        Err(e) => warn!("charts not written: {e}"),
    }
    Ok(0)
}

fn compare(
    config: Option<PathBuf>,
    root: PathBuf,
    datasets: Vec<String>,
    percentiles: Vec<f64>,
    output_dir: PathBuf,
) -> Result<i32, BenchError> {
    let config = match config {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| BenchError::io(&path, e))?;
            ReportConfig::from_json(&json)?
        }
        None => {
            let config = ReportConfig {
                results_root: root,
                datasets: datasets
                    .iter()
                    .map(|d| DatasetConfig::parse(d))
                    .collect::<Result<_, _>>()?,
                percentiles: or_default_percentiles(percentiles)?,
                output_dir,
            };
            config.validate()?;
            config
        }
    };

    let comparison = load_comparison(&config)?;
    if comparison.is_empty() {
        eprintln!("No valid data found in any dataset under {}", config.results_root.display());
        return Ok(EXIT_NO_DATA);
    }

    println!("Performance Metrics Grouped by Request Rate");
    println!("===========================================");
    print!("{}", comparison.render_rate_table());

    for path in comparison.write_outputs(&config.output_dir)? {
        println!("Saved: {}", path.display());
    }
    match plot_comparison(&config.output_dir, &comparison) {
        Ok(charts) => charts.iter().for_each(|path| println!("Saved: {}", path.display())),
        Err(e) => warn!("charts not written: {e}"),
    }
    Ok(0)
}

fn split(file: PathBuf, seed: Option<u64>) -> Result<i32, BenchError> {
    let mut rng = seeded_rng(seed);
    let outcome = split_file(&file, &mut rng)?;
    println!("Total prompts: {}", outcome.total);
    println!("Part1: {} prompts -> {}", outcome.part1_len, outcome.part1.display());
    println!("Part2: {} prompts -> {}", outcome.part2_len, outcome.part2.display());
    Ok(0)
}

fn gen_text(output: PathBuf, bytes: usize, seed: Option<u64>) -> Result<i32, BenchError> {
    let mut rng = seeded_rng(seed);
    let text = random_text(bytes, &mut rng);
    std::fs::write(&output, &text).map_err(|e| BenchError::io(&output, e))?;
    println!("Text size: {} bytes", text.len());
    println!("First 200 chars: {}...", &text[..text.len().min(200)]);
    Ok(0)
}

fn or_default_percentiles(percentiles: Vec<f64>) -> Result<Vec<f64>, BenchError> {
    let percentiles = if percentiles.is_empty() { DEFAULT_PERCENTILES.to_vec() } else { percentiles };
    validate_percentiles(&percentiles)?;
    Ok(percentiles)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
