// Logging initialisation.
//
// Priority: RUST_LOG env var > --debug flag > settings log_level > "warn".
// Output goes to stderr unless settings name a log file; the dashboard owns
// the terminal, so a log file is the way to keep traces from it.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::settings::shellexpand_path;

const DEFAULT_LOG_LEVEL: &str = "warn";

pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    };

    let file = log_file.and_then(|path| {
        let path = shellexpand_path(path);
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("Cannot open log file {path}: {e}; logging to stderr");
                None
            }
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact();

    // An already-installed subscriber wins.
    let _ = match file {
        Some(f) => builder.with_ansi(false).with_writer(Mutex::new(f)).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    tracing::debug!(
        app = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialised"
    );
}
