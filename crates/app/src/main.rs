use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AppBootstrap, AppServices, AppServicesConfig, BackendGateway, Clock, ExerciseStore,
};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 120;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTimeout { raw } => {
                write!(f, "invalid --verify-timeout value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn store(&self) -> Arc<ExerciseStore> {
        self.services.store()
    }

    fn bootstrap(&self) -> Arc<AppBootstrap> {
        self.services.bootstrap()
    }

    fn gateway(&self) -> Arc<dyn BackendGateway> {
        self.services.gateway()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    exercises_dir: PathBuf,
    verify_timeout: Duration,
    log_filter: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--exercises <dir>] [--verify-timeout <secs>] [--log <filter>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dev.sqlite3");
    eprintln!("  --exercises exercises");
    eprintln!("  --verify-timeout {DEFAULT_VERIFY_TIMEOUT_SECS}");
    eprintln!("  --log info");
    eprintln!();
    eprintln!("Environment:");
    eprintln!(
        "  PLAYGROUND_DB_URL, PLAYGROUND_EXERCISES_DIR, PLAYGROUND_VERIFY_TIMEOUT_SECS, PLAYGROUND_LOG"
    );
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PLAYGROUND_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut exercises_dir = std::env::var("PLAYGROUND_EXERCISES_DIR")
            .map_or_else(|_| PathBuf::from("exercises"), PathBuf::from);
        let mut verify_timeout = std::env::var("PLAYGROUND_VERIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(
                Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
                Duration::from_secs,
            );
        let mut log_filter =
            std::env::var("PLAYGROUND_LOG").unwrap_or_else(|_| "info".to_owned());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--exercises" => {
                    exercises_dir = PathBuf::from(require_value(args, "--exercises")?);
                }
                "--verify-timeout" => {
                    let value = require_value(args, "--verify-timeout")?;
                    verify_timeout = parse_timeout(&value)?;
                }
                "--log" => {
                    log_filter = require_value(args, "--log")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            exercises_dir,
            verify_timeout,
            log_filter,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ArgsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ArgsError::InvalidTimeout {
            raw: raw.to_owned(),
        }),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| err as Box<dyn std::error::Error>)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(&parsed.log_filter)?;
    tracing::info!(
        db = %parsed.db_url,
        exercises = %parsed.exercises_dir.display(),
        verify_timeout_secs = parsed.verify_timeout.as_secs(),
        "starting playground"
    );

    // Open + migrate SQLite at startup, in the binary glue.
    prepare_sqlite_file(&parsed.db_url)?;
    let config = AppServicesConfig {
        db_url: parsed.db_url,
        exercises_dir: parsed.exercises_dir,
        verify_timeout: parsed.verify_timeout,
    };
    let services = AppServices::new_sqlite(&config, Clock::system()).await?;

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    // Some dev setups default the window to always-on-top; turn that off explicitly.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Rust Playground")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // Binary glue: print once and exit.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
