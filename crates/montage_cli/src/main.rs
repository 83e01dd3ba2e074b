//! Rhythmic montage maker - command-line entry point
//!
//! Loads configuration, submits one montage job and follows its progress
//! events until the job reaches a terminal state.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use montage_core::config::ConfigManager;
use montage_core::jobs::{
    list_library_videos, InMemoryJobStore, JobStore, MontageRequest, MontageService, SourceRef,
};
use montage_core::logging::{init_tracing, LogLevel};
use montage_core::media::SystemRunner;
use montage_core::models::{JobStatus, ProgressEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "montage", version, about = "Cut a video into a beat-synced montage")]
struct Cli {
    /// Settings file (created with defaults if missing).
    #[arg(long, env = "MONTAGE_CONFIG", default_value = ".config/montage.toml")]
    config: PathBuf,

    #[arg(long, value_enum, default_value_t = Level::Info)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a montage and wait for it to finish.
    Render(RenderArgs),
    /// List videos available in the library folder.
    Library,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Local source video.
    #[arg(long, group = "source")]
    video: Option<PathBuf>,

    /// Source video by name from the library folder.
    #[arg(long, group = "source")]
    library: Option<String>,

    /// Source video URL, fetched with the configured downloader.
    #[arg(long, group = "source")]
    url: Option<String>,

    /// Beat label file (`start<TAB>end<TAB>label` per line).
    #[arg(long)]
    markers: PathBuf,

    /// Audio to lay under the montage.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// `replace` or `mix`.
    #[arg(long)]
    audio_mode: Option<String>,

    /// Output resolution as `WIDTHxHEIGHT`.
    #[arg(long)]
    resolution: Option<String>,

    /// Target montage length in seconds (0 = no limit).
    #[arg(long, default_value_t = 0.0)]
    duration: f64,

    /// Maximum number of scenes (0 = no limit).
    #[arg(long, default_value_t = 0)]
    scenes: u32,

    /// Minimum length of a beat-grouped scene in seconds.
    #[arg(long)]
    min_scene: Option<f64>,

    /// Fix the random clip offsets.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the terminal event as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.into());

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = ConfigManager::new(&cli.config);
    if let Err(e) = config.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }
    tracing::info!("Config: {}", cli.config.display());
    tracing::info!("Core version: {}", montage_core::version());

    config
        .ensure_dirs_exist()
        .context("creating configured folders")?;

    match cli.command {
        Command::Library => {
            let library = PathBuf::from(&config.settings().paths.library_folder);
            for name in list_library_videos(&library)? {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Render(args) => render(config, args),
    }
}

fn render(config: ConfigManager, args: RenderArgs) -> Result<ExitCode> {
    let mut settings = config.into_settings();
    if args.seed.is_some() {
        settings.render.seed = args.seed;
    }

    let request = build_request(&args)?;
    request.validate_extensions()?;

    let store = Arc::new(InMemoryJobStore::new());
    let service = MontageService::new(Arc::new(settings), Arc::new(SystemRunner), store.clone())
        .with_log_listener(Arc::new(|_job_id: &str, line: &str| eprintln!("{}", line)));

    let job = service.submit(request)?;
    let job_id = job.job_id.clone();
    println!("Job {}", job_id);

    let terminal = follow(store.as_ref(), &job_id, || job.is_finished());
    let result = job.wait();
    let Some(terminal) = terminal else {
        eprintln!("Job {} stopped without reporting a result", job_id);
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&terminal)?);
    }

    match terminal.status {
        JobStatus::Completed => {
            println!("{}", terminal.message);
            if let Some(path) = &terminal.output_file {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("Job failed: {}", terminal.message);
            let kind = result.and_then(|r| r.error_kind).unwrap_or("unknown");
            Ok(ExitCode::from(exit_code_for(kind)))
        }
    }
}

fn build_request(args: &RenderArgs) -> Result<MontageRequest> {
    let source = match (&args.video, &args.library, &args.url) {
        (Some(path), None, None) => SourceRef::Local(path.clone()),
        (None, Some(name), None) => SourceRef::Library(name.clone()),
        (None, None, Some(url)) => SourceRef::Url(url.clone()),
        _ => bail!("exactly one of --video, --library or --url is required"),
    };

    let mut request = MontageRequest::new(source, &args.markers)
        .with_target_duration(args.duration)
        .with_scene_count(args.scenes);
    if let Some(audio) = &args.audio {
        request = request.with_external_audio(audio);
    }
    if let Some(mode) = &args.audio_mode {
        request = request.with_audio_mode(mode);
    }
    if let Some(resolution) = &args.resolution {
        request = request.with_resolution(resolution);
    }
    if let Some(min) = args.min_scene {
        request = request.with_min_scene_duration(min);
    }
    Ok(request)
}

/// Print each new progress event until the job is terminal.
///
/// Returns `None` if the worker exits without recording a terminal event.
fn follow(
    store: &dyn JobStore,
    job_id: &str,
    worker_finished: impl Fn() -> bool,
) -> Option<ProgressEvent> {
    let mut seen = 0;
    loop {
        // Checked before reading so events recorded just before exit are seen.
        let finished = worker_finished();
        let history = store.history(job_id);
        for recorded in history.iter().skip(seen) {
            let event = &recorded.event;
            println!("[{}] {}", event.status, event.message);
            if event.is_terminal() {
                return Some(event.clone());
            }
        }
        if finished {
            return None;
        }
        seen = history.len();
        thread::sleep(POLL_INTERVAL);
    }
}

fn exit_code_for(kind: &str) -> u8 {
    match kind {
        "input_not_found" => 2,
        "invalid_option" => 3,
        "tool_unavailable" => 4,
        "external_tool_failure" => 5,
        "empty_plan" => 6,
        _ => 1,
    }
}
