use crate::command;
use anyhow::{anyhow, Result};
use clap::Parser;
use preview_config::Config;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log files above this size are removed on startup.
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

#[derive(Parser, Debug)]
pub enum RunCmd {
    /// Render a document once and print its sections as JSON.
    #[clap(name = "render")]
    Render(command::render::Render),
    /// Keep the HTML preview of a document up to date while it is edited.
    #[clap(name = "watch")]
    Watch(command::watch::Watch),
}

/// Live preview CLI arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Enable the logging system.
    #[clap(long)]
    pub log: Option<PathBuf>,

    /// Specify the path of the config file.
    #[clap(long)]
    pub config_file: Option<PathBuf>,
}

impl RunCmd {
    pub async fn run(self, args: Args) -> Result<()> {
        let (config, config_err) =
            preview_config::load_config_on_startup(args.config_file.clone());

        let _guard = init_logging(args.log, config)?;

        if let Some(err) = config_err {
            tracing::error!(?err, path = ?preview_config::config_file(), "Invalid config file, using the defaults");
            eprintln!("warning: invalid config file, using the defaults: {err}");
        }

        match self {
            Self::Render(render) => render.run().await,
            Self::Watch(watch) => watch.run(config).await,
        }
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the log file when dropped and must be kept alive
/// for as long as logging is needed.
fn init_logging(log: Option<PathBuf>, config: &Config) -> Result<Option<WorkerGuard>> {
    let maybe_log = if let Some(log_path) = log {
        Some(log_path)
    } else if let Ok(log_path) = std::env::var("LIVEPREVIEW_LOG_PATH").map(PathBuf::from) {
        Some(log_path)
    } else {
        config.log.log_file.as_ref().map(PathBuf::from)
    };

    let max_level = config
        .log
        .max_level
        .parse()
        .unwrap_or(tracing::Level::DEBUG);

    let Some(log_path) = maybe_log else {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(None);
    };

    if let Ok(metadata) = std::fs::metadata(&log_path) {
        if log_path.is_file() && metadata.len() > MAX_LOG_FILE_SIZE {
            std::fs::remove_file(&log_path)?;
        }
    }

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("no file name in {log_path:?}"))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| anyhow!("{log_path:?} has no parent"))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(Some(guard))
}
