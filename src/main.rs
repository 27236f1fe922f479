//! translator binary entrypoint: `serve` runs the host app, `edit` the terminal editor.

use std::fmt;
use std::sync::{Arc, OnceLock};

use clap::Parser;

use translator::args::{Args, Command, determine_log_level};
use translator::capture::TranslationProvider;
use translator::config::{self, Settings};
use translator::editor::HttpTransport;
use translator::server::{self, CsrfToken, ServerState};
use translator::store::{TranslationStore, YamlStore};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

struct TranslatorTimer;

impl tracing_subscriber::fmt::time::FormatTime for TranslatorTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S").to_string();
        w.write_str(&ts)
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize tracing to `<config>/logs/translator.log`.
///
/// Inputs:
/// - `level`: Filter used when `RUST_LOG` is unset
/// - `stderr_fallback`: Whether to log to stderr when the file cannot be opened
fn init_logging(level: &str, stderr_fallback: bool) {
    let mut log_path = config::logs_dir();
    log_path.push("translator.log");
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(TranslatorTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) if stderr_fallback => {
            // Fallback: stderr logger so the server still reports
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(TranslatorTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
        // The editor owns the terminal; stay silent rather than draw over it.
        Err(_) => {}
    }
}

async fn run_server(settings: &Settings) -> Result<()> {
    let locales_dir = settings.locales_dir();
    let store = Arc::new(YamlStore::open(&locales_dir, &settings.default_locale)?);
    tracing::info!(
        dir = %locales_dir.display(),
        locales = ?store.locales(),
        "locale files loaded"
    );
    let provider: Arc<dyn TranslationProvider> = store.clone();
    let csrf = CsrfToken::from_config(settings.csrf_token.as_deref());
    let state = ServerState::new(provider, store, csrf);
    server::serve(settings.listen_addr, state, &settings.route_prefix).await?;
    Ok(())
}

async fn run_editor(settings: &Settings) -> Result<()> {
    let transport = HttpTransport::new(&settings.host_url, &settings.route_prefix)?;
    translator::tui::run(transport).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let loaded = config::load_settings(args.config.as_deref());
    let (mut settings, notices) = match &loaded {
        Ok((settings, notices)) => (settings.clone(), notices.clone()),
        Err(_) => (Settings::default(), Vec::new()),
    };
    let flags = args.apply_to(&mut settings);

    let is_server = matches!(args.command, Command::Serve { .. });
    init_logging(&determine_log_level(&args, &settings), is_server);
    for notice in &notices {
        tracing::warn!(notice = %notice, "settings file");
    }
    if let Err(err) = loaded.map(|_| ()).and(flags) {
        tracing::error!(error = %err, "invalid settings");
        eprintln!("translator: {err}");
        std::process::exit(2);
    }

    tracing::info!(
        command = if is_server { "serve" } else { "edit" },
        "translator starting"
    );
    let outcome = match args.command {
        Command::Serve { .. } => run_server(&settings).await,
        Command::Edit { .. } => run_editor(&settings).await,
    };
    if let Err(err) = outcome {
        tracing::error!(error = ?err, "Application error");
        eprintln!("translator: {err}");
        std::process::exit(1);
    }
    tracing::info!("translator exited");
}
