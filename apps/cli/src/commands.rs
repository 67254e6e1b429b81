//! CLI definition, tracing setup, and the rebuild command.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use morphdict_compiler::{DictLoader, OpenCorporaCompiler};
use morphdict_core::{ProgressReporter, RebuildPipeline, RebuildReport};
use morphdict_fetch::{DownloadOptions, DownloadProgress, HttpDownloader};
use morphdict_shared::{RebuildConfig, RebuildFlags, root_from_env, source_url_from_env};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Rebuild the compiled morphological dictionary from the OpenCorpora export.
///
/// Paths are resolved under `MORPHDICT_ROOT` (default: the current directory);
/// `MORPHDICT_SOURCE_URL` overrides the export location.
#[derive(Parser)]
#[command(name = "morphdict-update", version, long_about = None)]
pub(crate) struct Cli {
    /// Reuse the corpus already on disk instead of downloading it.
    /// Implies --no-unlink.
    #[arg(long)]
    pub no_download: bool,

    /// Keep the raw corpus after compiling.
    #[arg(long)]
    pub no_unlink: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

const LOG_TARGETS: [&str; 5] = [
    "morphdict_update",
    "morphdict_core",
    "morphdict_fetch",
    "morphdict_compiler",
    "morphdict_shared",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Resolve the config, run the pipeline, and print the summary.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let flags = RebuildFlags::from_cli(cli.no_download, cli.no_unlink);
    let config = RebuildConfig::resolve(root_from_env(), source_url_from_env(), flags)
        .wrap_err("cannot resolve rebuild configuration")?;

    info!(
        corpus = %config.corpus_path.display(),
        download = flags.download,
        unlink = flags.unlink,
        "rebuilding dictionary"
    );

    let progress = Arc::new(CliProgress::new());
    let downloader = HttpDownloader::new(&DownloadOptions::new(config.source_url.clone()))?
        .with_progress(progress.clone());

    let pipeline = RebuildPipeline::new(
        config,
        downloader,
        OpenCorporaCompiler,
        DictLoader::default(),
    );
    let report = pipeline.run(progress.as_ref()).await.inspect_err(|_| progress.abandon())?;

    println!("{}", "-".repeat(20));
    println!("Done in {:.1}s", report.elapsed.as_secs_f64());
    println!("Version: {}", report.stamp);
    println!();
    for line in report.meta.summary_lines() {
        println!("{line}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shared by the pipeline stages and the downloader.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.abandon();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &RebuildReport) {
        self.spinner.finish_and_clear();
    }
}

impl DownloadProgress for CliProgress {
    fn started(&self, total_bytes: Option<u64>) {
        let total = total_bytes
            .map_or_else(|| "unknown size".to_string(), |n| HumanBytes(n).to_string());
        self.spinner.set_message(format!("Downloading corpus ({total})"));
    }

    fn advanced(&self, downloaded_bytes: u64) {
        self.spinner
            .set_message(format!("Downloading corpus [{}]", HumanBytes(downloaded_bytes)));
    }

    fn finished(&self, downloaded_bytes: u64) {
        self.spinner
            .set_message(format!("Downloaded {}", HumanBytes(downloaded_bytes)));
    }
}
