mod platform;

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cheatsheet_core::{AppState, DownloadFormat, DownloadRequest, Effect, Msg};
use cheatsheet_engine::{Backend, EngineHandle, ReqwestBackend};
use cheatsheet_logging::{sheet_info, LevelFilter, LogDestination};
use clap::{Parser, Subcommand};

use platform::app::{RunOutcome, Session};
use platform::config::{ClientConfig, Overrides};
use platform::effects::{EffectRunner, Feedback};
use platform::{intake, render};

#[derive(Parser, Debug)]
#[command(name = "cheatsheet", version, about = "Generate a cheat sheet from lecture PDFs")]
struct Cli {
    /// RON config file (defaults to ./cheatsheet.ron when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the processing service.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Log destination: terminal, file, both or off.
    #[arg(long, global = true, default_value = "terminal")]
    log: LogDestination,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload PDFs, generate a cheat sheet and optionally download it.
    Generate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Formats to download once generation succeeds (markdown, json, pdf).
        #[arg(short, long = "format")]
        formats: Vec<DownloadFormat>,
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Drop the file at this list position before uploading.
        #[arg(long)]
        skip: Vec<usize>,
    },
    /// Download an artifact for a job generated earlier.
    Download {
        job_id: String,
        #[arg(short, long, default_value = "markdown")]
        format: DownloadFormat,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show what the service knows about a job.
    Status { job_id: String },
    /// Check that the service is reachable.
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    cheatsheet_logging::initialize(cli.log, level);

    let out_override = match &cli.command {
        Command::Generate { out, .. } | Command::Download { out, .. } => out.clone(),
        Command::Status { .. } | Command::Health => None,
    };
    let config = ClientConfig::load(cli.config.as_deref())?
        .apply_env(|key| std::env::var(key).ok())
        .apply_overrides(Overrides {
            api_base_url: cli.api_url.clone(),
            output_dir: out_override,
        });
    sheet_info!("Using service at {}", config.api_base_url);

    match cli.command {
        Command::Generate {
            files,
            formats,
            skip,
            ..
        } => run_generate(&config, &files, &skip, &formats),
        Command::Download { job_id, format, .. } => run_download(&config, job_id, format),
        Command::Status { job_id } => run_status(&config, &job_id),
        Command::Health => run_health(&config),
    }
}

fn start_runner(config: &ClientConfig) -> Result<EffectRunner> {
    let engine = EngineHandle::new(&config.backend_settings()).context("starting engine")?;
    Ok(EffectRunner::new(engine, config.output_dir.clone()))
}

fn run_generate(
    config: &ClientConfig,
    files: &[PathBuf],
    skip: &[usize],
    formats: &[DownloadFormat],
) -> Result<()> {
    let batch = intake::load_batch(files)?;
    let state = AppState::new().with_doc_type(config.doc_type.clone());
    let mut session = Session::new(state, start_runner(config)?, io::stdout(), io::stderr());

    session.dispatch(Msg::FilesAdded(batch))?;
    let mut skip = skip.to_vec();
    skip.sort_unstable();
    skip.dedup();
    // Highest first so earlier positions stay valid.
    for index in skip.into_iter().rev() {
        session.dispatch(Msg::FileRemoved { index })?;
    }

    let job_id = match session.generate()? {
        None => bail!("no files left to upload"),
        Some(RunOutcome::Failed { message }) => bail!("cheat sheet generation failed: {message}"),
        Some(RunOutcome::Succeeded { job_id }) => job_id,
    };

    let mut wanted: Vec<DownloadFormat> = Vec::with_capacity(formats.len());
    for format in formats {
        if !wanted.contains(format) {
            wanted.push(*format);
        }
    }
    if wanted.is_empty() {
        println!("Download with: cheatsheet download {job_id} --format <markdown|json|pdf>");
        return Ok(());
    }
    let report = session.download(&wanted)?;
    if report.failed > 0 {
        bail!("{} of {} downloads failed", report.failed, wanted.len());
    }
    Ok(())
}

fn run_download(config: &ClientConfig, job_id: String, format: DownloadFormat) -> Result<()> {
    let runner = start_runner(config)?;
    runner.run(vec![Effect::OpenDownload(DownloadRequest { job_id, format })]);
    loop {
        match runner.next(Duration::from_secs(15)) {
            Some(Feedback::DownloadSaved {
                format,
                path,
                byte_len,
            }) => {
                render::render_saved(&mut io::stdout(), format, &path, byte_len)?;
                return Ok(());
            }
            Some(Feedback::DownloadFailed { format, message }) => {
                bail!("could not download {format}: {message}")
            }
            Some(other) => sheet_info!("Ignoring {:?}", other),
            None => eprintln!("Waiting for download..."),
        }
    }
}

fn run_status(config: &ClientConfig, job_id: &str) -> Result<()> {
    let backend = ReqwestBackend::new(&config.backend_settings())?;
    let status = block_on(backend.status(job_id))??;
    if !status.is_known() {
        println!("Job {job_id} not found");
        return Ok(());
    }
    println!("Job {job_id}");
    println!("  parsed:    {}", status.parsed);
    println!("  generated: {}", status.generated);
    if !status.metadata.is_empty() {
        println!("{}", serde_json::to_string_pretty(&status.metadata)?);
    }
    Ok(())
}

fn run_health(config: &ClientConfig) -> Result<()> {
    let backend = ReqwestBackend::new(&config.backend_settings())?;
    let info = block_on(backend.health())??;
    println!(
        "{} {} ({})",
        info.service.as_deref().unwrap_or("service"),
        info.version.as_deref().unwrap_or("?"),
        info.status
    );
    Ok(())
}

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    Ok(runtime.block_on(future))
}
