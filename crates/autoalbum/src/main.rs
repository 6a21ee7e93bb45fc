use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use autoalbum::pipeline::{
    AlwaysContinue, ConfirmationGate, LogProgress, Pipeline, PipelineConfig, StdinGate,
};
use autoalbum::worker::{BatchRunner, BatchSummary, DirectoryScanner};

#[derive(Parser)]
#[command(name = "autoalbum")]
#[command(about = "Sort scanned images into archived documents and labeled photos")]
#[command(version)]
struct Cli {
    /// Process every image without asking between files
    #[arg(long)]
    skip_prompt: bool,

    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);

    let installed = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    if let Err(e) = installed {
        eprintln!("Failed to install log subscriber: {}", e);
    }

    // Scanner and metadata modules log through the `log` facade
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    match run(&cli) {
        Ok(summary) => {
            info!(
                processed = summary.processed,
                documents = summary.documents,
                photos = summary.photos,
                failed = summary.failed,
                stopped_early = summary.stopped_early,
                "Finished processing all images"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> autoalbum::Result<BatchSummary> {
    let config = autoalbum::load_config(&cli.config)?;
    let resolved = PipelineConfig::from_config(&config)?;
    let pipeline = Pipeline::from_config(&resolved)?;

    let scanner = DirectoryScanner::with_filter(&resolved.pictures_directory, &resolved.discovery);
    let records = scanner.scan()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        // A second Ctrl-C quits at once, e.g. while the prompt waits for input
        if flag.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
        warn!("Stopping after the current image; press Ctrl-C again to quit now");
    }) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let gate: Box<dyn ConfirmationGate> = if cli.skip_prompt {
        Box::new(AlwaysContinue)
    } else {
        Box::new(StdinGate::stdin().with_shutdown(Arc::clone(&shutdown)))
    };

    let mut runner = BatchRunner::new(pipeline, gate).with_shutdown(shutdown);
    Ok(runner.run(records, &LogProgress))
}
