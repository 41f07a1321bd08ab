use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{BocchiError, Result};

/// Directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("bocchi={}", level)
}

/// Daily-rolling appender writing `<file name>.<date>` next to `path`.
///
/// A bare file name logs into the working directory. The directory is
/// created when missing.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let prefix = path.file_name().ok_or_else(|| {
        BocchiError::Config(format!("log file {} has no file name", path.display()))
    })?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix.to_string_lossy())
        .build(directory)
        .map_err(|e| BocchiError::Config(format!("cannot log to {}: {}", path.display(), e)))
}

/// Install the global subscriber: compact stderr output, plus JSON lines in
/// `log_file` when given.
///
/// A subscriber that is already installed stays in place.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_writer(file_appender(path)?)
                .with_ansi(false)
                .json(),
        ),
        None => None,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;
    use tempfile::TempDir;

    static INIT: Once = Once::new();

    fn init_test_logging() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(tracing::Level::DEBUG)
                .try_init();
        });
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "bocchi=info");
        assert_eq!(default_directive(true), "bocchi=debug");
    }

    #[test]
    fn test_init_after_global_subscriber_is_harmless() {
        init_test_logging();
        // A second global subscriber is refused, not a panic.
        init(true, None).unwrap();
        tracing::debug!("still logging");
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("nested").join("bocchi.log");

        file_appender(&path).unwrap();

        let dir = temp_dir.path().join("logs").join("nested");
        assert!(dir.is_dir());
        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|name| name.starts_with("bocchi.log")));
    }

    #[test]
    fn test_file_appender_needs_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("..");

        assert!(matches!(file_appender(&path), Err(BocchiError::Config(_))));
    }
}
