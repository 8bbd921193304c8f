use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))
}

/// Send tracing output to `log_path`. The terminal belongs to the UI, so
/// nothing is ever written to stdout or stderr.
pub fn init_file_logging(log_path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level)?)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_accepted() {
        assert!(env_filter("todo_tui=debug,info").is_ok());
    }

    #[test]
    fn log_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("todo-tui.log");

        init_file_logging(&path, "info").unwrap();

        assert!(path.exists());
    }
}
