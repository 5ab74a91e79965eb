//! squish CLI — submit a file to the compression service and save the result.
//!
//! Set SQUISH_API_URL (or API_URL) to point at a different deployment.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use squish_api_client::{ApiClient, StatsMode};
use squish_cli::{init_tracing, DirectorySink, Session, SessionOptions, Submission, TerminalView};
use squish_core::{format_count, ClientConfig, SelectedFile, SizeUnit, TargetSize};

#[derive(Parser)]
#[command(name = "squish", about = "Compress PDFs and images to a target size")]
struct Cli {
    /// Service base URL (overrides SQUISH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a PDF, JPG, PNG or WEBP file to a target size
    Compress {
        /// Path to the file to compress
        file: PathBuf,
        /// Desired output size
        #[arg(long, short)]
        target: String,
        /// Unit of the target size: KB or MB
        #[arg(long, short, default_value = "KB")]
        unit: SizeUnit,
        /// Directory to save the result in (overrides SQUISH_OUTPUT_DIR)
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Declared media type, when the extension is misleading
        #[arg(long)]
        media_type: Option<String>,
        /// Do not count this run as a view
        #[arg(long)]
        no_view: bool,
    },
    /// Show usage counters
    Stats {
        /// Count this request as a view
        #[arg(long)]
        count_view: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Check that the service is reachable
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

struct CompressArgs {
    file: PathBuf,
    target: String,
    unit: SizeUnit,
    media_type: Option<String>,
    count_view: bool,
}

async fn run_compress(config: &ClientConfig, args: CompressArgs) -> anyhow::Result<ExitCode> {
    let api = ApiClient::from_config(config).context("Failed to create API client")?;
    let view = Arc::new(TerminalView::new());
    let sink = Arc::new(DirectorySink::new(config.output_dir.clone()));
    let session = Session::new(api, view.clone(), sink, SessionOptions::from(config));

    if args.count_view {
        session.activate();
    } else {
        session.show_initial_state();
    }

    let mut file = SelectedFile::from_path(&args.file)
        .with_context(|| format!("Failed to open file: {}", args.file.display()))?;
    if let Some(media_type) = args.media_type {
        file.media_type = Some(media_type);
    }

    if session.select_file(file).is_err() {
        session.shutdown().await;
        return Ok(ExitCode::FAILURE);
    }

    session.set_unit(args.unit);
    session.set_target_input(&args.target);

    if let Err(e) = TargetSize::parse(&args.target, args.unit) {
        eprintln!("Error: {}", e);
        session.shutdown().await;
        return Ok(ExitCode::FAILURE);
    }

    let outcome = session.submit().await;
    session.shutdown().await;

    if args.count_view || outcome.is_success() {
        view.print_stats();
    }

    match outcome {
        Submission::Downloaded { path, .. } => {
            println!("Saved {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env_with_api_url(cli.api_url.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Compress {
            file,
            target,
            unit,
            out,
            media_type,
            no_view,
        } => {
            if let Some(out) = out {
                config = config.with_output_dir(out);
            }
            run_compress(
                &config,
                CompressArgs {
                    file,
                    target,
                    unit,
                    media_type,
                    count_view: !no_view,
                },
            )
            .await
        }
        Commands::Stats { count_view, format } => {
            let client = ApiClient::from_config(&config).context("Failed to create API client")?;
            let mode = if count_view {
                StatsMode::CountView
            } else {
                StatsMode::ReadOnly
            };
            let stats = client.stats(mode).await.context("Failed to fetch stats")?;
            match format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Table => {
                    println!("Views:  {}", format_count(stats.views));
                    println!("PDFs:   {}", format_count(stats.pdfs));
                    println!("Images: {}", format_count(stats.images));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health => {
            let client = ApiClient::from_config(&config).context("Failed to create API client")?;
            let health = client
                .health()
                .await
                .with_context(|| format!("Service at {} is not reachable", client.base_url()))?;
            print_json(&health)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
