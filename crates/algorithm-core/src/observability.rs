use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::config::parse_bool_env;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "algoplayer.logs.jsonl";

fn observability_enabled(lookup: &impl Fn(&str) -> Option<String>) -> bool {
    for key in ["ALGOPLAYER_OBSERVABILITY_ENABLED", "ALGOPLAYER_OBSERVABILITY"] {
        if let Some(value) = lookup(key) {
            return parse_bool_env(&value).unwrap_or(true);
        }
    }
    true
}

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var("ALGOPLAYER_LOG_LEVEL")
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Split a log file path into the directory and file name the appender wants.
fn split_log_path(raw: &str) -> (PathBuf, String) {
    let path = PathBuf::from(raw);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `ALGOPLAYER_OBSERVABILITY_ENABLED` / `ALGOPLAYER_OBSERVABILITY`: optional enable/disable flag (default enabled).
/// - `ALGOPLAYER_LOG_LEVEL`: optional level/filter override (`info`, `debug`, etc.).
/// - `ALGOPLAYER_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in that file.
///   If unset, logs go to stderr in a compact console format so they do not mix
///   with an interactive session on stdout.
/// - `RUST_LOG`: optional filter override.
pub fn init_observability() {
    INIT.get_or_init(|| {
        let lookup = |key: &str| std::env::var(key).ok();
        if !observability_enabled(&lookup) {
            return;
        }

        let env_filter = resolve_env_filter();
        if let Some(path_raw) = lookup("ALGOPLAYER_JSON_LOG_PATH") {
            let (dir, file_name) = split_log_path(&path_raw);
            let _ = std::fs::create_dir_all(&dir);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}
