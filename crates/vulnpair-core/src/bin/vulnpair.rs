// Command-line entry point for vulnpair.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use _vulnpair_core::chunker::filesystem::collect;
use _vulnpair_core::config::PipelineConfig;
use _vulnpair_core::dataset::{
    filter_vulnerable, load_project_urls, load_vulnerability_records, read_jsonl, write_jsonl,
    JsonlAppender, DEFAULT_SPLITS,
};
use _vulnpair_core::errors::{VulnPairError, VulnPairResult};
use _vulnpair_core::matcher::mapping::{function_mappings, write_mappings};
use _vulnpair_core::models::VulnerabilityRecord;
use _vulnpair_core::pairing::PairingPipeline;
use _vulnpair_core::repository::GitRepository;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Similarity threshold a match must exceed (default 0.9)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Directory holding cloned checkouts
    #[arg(long, global = true)]
    projects_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build before/after-fix pairs for every vulnerable record
    Pair {
        /// Directory containing primevul_{train,test,valid}.jsonl
        #[arg(long, default_value = "functional")]
        data_dir: PathBuf,

        /// JSON object mapping project name to clone URL
        #[arg(long, default_value = "mapping.json")]
        urls: PathBuf,

        /// Output file, appended to
        #[arg(short, long, default_value = "paired.jsonl")]
        output: PathBuf,
    },
    /// Dump every function of a checkout as JSON lines
    Chunk {
        /// Checkout root
        repo: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write the per-function caller/callee mapping of a checkout
    Mapping {
        /// Checkout root
        repo: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Label every function of each record's vulnerable checkout
    Label {
        /// Input records (JSON lines with project, commit_id, function, cwe)
        #[arg(long, default_value = "new_benchmark.jsonl")]
        input: PathBuf,

        /// JSON object mapping project name to clone URL
        #[arg(long, default_value = "mapping.json")]
        urls: PathBuf,

        /// Only process records carrying this CWE label
        #[arg(long)]
        cwe: Option<String>,

        /// Output directory; one `<cwe>.jsonl` per label
        #[arg(short, long, default_value = "benchmark")]
        output_dir: PathBuf,
    },
}

fn run_pair(
    config: &PipelineConfig,
    data_dir: &Path,
    urls: &Path,
    output: &Path,
    interrupt: &AtomicBool,
) -> VulnPairResult<()> {
    let records = filter_vulnerable(load_vulnerability_records(data_dir, DEFAULT_SPLITS)?);
    let urls = load_project_urls(urls)?;
    info!(records = records.len(), projects = urls.len(), "loaded dataset");

    let mut source = GitRepository::new(config.checkout_path());
    let mut sink = JsonlAppender::open(output)?;
    let summary = PairingPipeline::new(config).run(&records, &urls, &mut source, &mut sink, interrupt)?;
    println!(
        "seen {} written {} skipped {}",
        summary.seen, summary.written, summary.skipped
    );
    Ok(())
}

fn run_label(
    config: &PipelineConfig,
    input: &Path,
    urls: &Path,
    cwe: Option<&str>,
    output_dir: &Path,
    interrupt: &AtomicBool,
) -> VulnPairResult<()> {
    let records: Vec<VulnerabilityRecord> = read_jsonl(input)?;
    let urls = load_project_urls(urls)?;
    info!(records = records.len(), projects = urls.len(), "loaded records");

    let mut source = GitRepository::new(config.checkout_path());
    let summary = PairingPipeline::new(config).label(
        &records,
        &urls,
        &mut source,
        cwe,
        output_dir,
        interrupt,
    )?;
    println!(
        "seen {} written {} skipped {}",
        summary.seen, summary.written, summary.skipped
    );
    Ok(())
}

fn run(cli: Cli, interrupt: &AtomicBool) -> VulnPairResult<()> {
    let mut config = PipelineConfig::from_env().with_threshold(cli.threshold);
    if let Some(dir) = cli.projects_dir {
        config.projects_dir = dir;
    }

    match cli.command {
        Command::Pair {
            data_dir,
            urls,
            output,
        } => run_pair(&config, &data_dir, &urls, &output, interrupt),
        Command::Chunk { repo, output } => {
            let records = collect(&config.languages, &repo)?;
            write_jsonl(&output, &records)
        }
        Command::Mapping { repo, output } => {
            let records = collect(&config.languages, &repo)?;
            write_mappings(&output, &function_mappings(&records))
        }
        Command::Label {
            input,
            urls,
            cwe,
            output_dir,
        } => run_label(&config, &input, &urls, cwe.as_deref(), &output_dir, interrupt),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("could not install Ctrl-C handler: {e}");
    }

    match run(cli, &interrupt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(VulnPairError::Interrupted { last_index }) => {
            println!("\nlast index: {last_index}");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
