//! Menu relay CLI
//!
//! Local execution entry point: one run per invocation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use menu_relay::{
    config,
    error::Result,
    models::ExtractedText,
    pipeline::{self, RunDeps, RunStatus},
    services::{
        HttpFetcher, PdfExtractor, PlainTextExtractor, TextExtractor, extract::looks_like_pdf,
        extract_blocking,
    },
    sink::{ChunkSink, ConsoleSink, DirectorySink, emit_paced},
};

/// Kitchen menu relay
#[derive(Parser, Debug)]
#[command(
    name = "menu-relay",
    version,
    about = "Relay the published kitchen menu as chat-sized messages"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "menu-relay.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the current menu and emit it once
    Run {
        /// Source page to scan instead of the configured one
        #[arg(long)]
        url: Option<String>,

        /// Write numbered chunk files here instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the run report as JSON when done
        #[arg(long)]
        json: bool,
    },

    /// Format a local PDF (or text file) without touching the network
    Preview {
        /// Document to preview
        file: PathBuf,

        /// Reference date for inference (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { url, output, json } => {
            let config = config::load_effective(&cli.config, url)?;
            log::info!("Source page: {}", config.source.page_url);

            let fetcher = HttpFetcher::new(&config.fetcher)?;
            let sink: Box<dyn ChunkSink> = match output {
                Some(dir) => {
                    log::info!("Writing chunks to {}", dir.display());
                    Box::new(DirectorySink::create(dir).await?)
                }
                None => Box::new(ConsoleSink::new()),
            };

            let deps = RunDeps {
                fetcher: &fetcher,
                extractor: Arc::new(PdfExtractor),
                sink: &*sink,
            };
            let report = pipeline::run_once(&config, &deps, Local::now().date_naive()).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if report.status == RunStatus::Failed {
                log::warn!("Run did not publish; see the diagnostic message above");
            }
        }

        Command::Preview { file, date } => {
            let config = config::load_effective(&cli.config, None)?;
            let today = date.unwrap_or_else(|| Local::now().date_naive());

            let bytes = tokio::fs::read(&file).await?;
            log::info!("Read {} bytes from {}", bytes.len(), file.display());
            let text: ExtractedText = if looks_like_pdf(&bytes) {
                extract_blocking(PdfExtractor, bytes).await?
            } else {
                log::info!("No PDF header; reading {} as text", file.display());
                PlainTextExtractor.extract(&bytes)?
            };

            let menu = pipeline::render_menu(&config, &text, today)?;
            let header = config.messages.render_header(
                &menu.date_label,
                &config.source.title,
                &file.display().to_string(),
            );

            let sink = ConsoleSink::new();
            sink.emit(&header).await?;
            emit_paced(
                &sink,
                &menu.content_messages(config.output.code_block),
                Duration::ZERO,
            )
            .await?;
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            if let Err(e) = config::load_effective(&cli.config, None) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
