//! CLI binary for aide.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use aide::actions::ReminderAction;
use aide::speech::{self, ConsoleListener, Speaker};
use aide::{
    ActionContext, AssistantConfig, ConversationController, IntentDispatcher, ReminderStore,
    Scheduler, aide_dirs,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Aide: a voice-driven personal assistant.
#[derive(Parser)]
#[command(name = "aide", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Start the assistant (default).
    Run,

    /// List stored reminders.
    Reminders,

    /// Show which intent an utterance maps to.
    Classify {
        /// Utterance to classify.
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);
    let guard = init_tracing(matches!(command, Command::Run));

    let config = load_config(cli.config.as_deref())?;

    match command {
        Command::Run => {
            if run(config).await? {
                // The turn loop may still be blocked reading stdin; leave
                // without waiting for it.
                drop(guard);
                std::process::exit(130);
            }
            Ok(())
        }
        Command::Reminders => list_reminders(&config),
        Command::Classify { text } => {
            let utterance = text.join(" ").to_lowercase();
            println!("{}", IntentDispatcher::new().classify(&utterance));
            Ok(())
        }
    }
}

/// Stderr logging for every command; `run` also writes a daily log file.
fn init_tracing(log_to_file: bool) -> Option<WorkerGuard> {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aide=warn"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match log_to_file.then(open_log_file).flatten() {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aide=info"));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn open_log_file() -> Option<RollingFileAppender> {
    let dir = aide_dirs::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("cannot create log directory {}: {e}", dir.display());
        return None;
    }
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("aide")
        .filename_suffix("log")
        .build(&dir)
        .map_err(|e| eprintln!("cannot open log file in {}: {e}", dir.display()))
        .ok()
}

/// Explicit path, else the default config file if present, else defaults.
/// Secrets missing from the file are taken from the environment.
fn load_config(path: Option<&Path>) -> anyhow::Result<AssistantConfig> {
    let mut config = match path {
        Some(path) => AssistantConfig::from_file(path)?,
        None => {
            let default_path = AssistantConfig::default_config_path();
            if default_path.exists() {
                AssistantConfig::from_file(&default_path)?
            } else {
                AssistantConfig::default()
            }
        }
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Run the assistant. Returns `true` if interrupted by Ctrl+C.
async fn run(config: AssistantConfig) -> anyhow::Result<bool> {
    let db_path = config.store.resolved_db_path();
    let store = Arc::new(ReminderStore::open(&db_path)?);
    info!("reminder store at {}", db_path.display());

    let scheduler = Scheduler::new().with_history_limit(config.scheduler.history_limit);
    let ctx = ActionContext::builder(&config, store)
        .speaker(Speaker::from_boxed(speech::voice_from_config(&config.voice)))
        .scheduler(scheduler.clone())
        .build();

    if config.scheduler.restore_on_start {
        if let Err(e) = ReminderAction::new(&ctx).restore_from_store() {
            warn!("cannot restore reminders: {e}");
        }
    }

    let poll = Duration::from_millis(config.scheduler.poll_interval_ms.max(10));
    let scheduler_task = scheduler.run(poll);

    let listener = ConsoleListener::stdin(config.listener.prompt.clone());
    let mut controller = ConversationController::new(listener, ctx);
    let mut turn_loop = tokio::task::spawn_blocking(move || controller.run());

    let interrupted = tokio::select! {
        joined = &mut turn_loop => {
            joined?;
            false
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            true
        }
    };

    scheduler_task.abort();
    Ok(interrupted)
}

fn list_reminders(config: &AssistantConfig) -> anyhow::Result<()> {
    let db_path = config.store.resolved_db_path();
    let store = ReminderStore::open(&db_path)?;
    let reminders = store.list()?;

    if reminders.is_empty() {
        println!("No reminders stored in {}", db_path.display());
        return Ok(());
    }

    for r in reminders {
        let added = i64::try_from(r.created_at)
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_owned());
        println!("{:>4}  {:<10}  {}  (added {added})", r.id, r.fire_spec, r.message);
    }
    Ok(())
}
