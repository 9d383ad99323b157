//! Console logging with an optional file tee.

use anyhow::Context;
use log::LevelFilter;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Console level from the verbosity flags. `debug` wins over `quiet`.
pub fn level_for(debug: bool, quiet: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// Path of the log file inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(crate::defaults::LOG_FILE_NAME)
}

/// Initialise `env_logger` at `level`; `RUST_LOG` takes precedence.
///
/// With `log_dir` set, every formatted line is also appended to
/// `<log_dir>/langroute.log`. Returns the log file path when one is open.
pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
    );
    builder.format_timestamp_secs();

    let mut opened = None;
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = log_file_path(dir);
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let file = Mutex::new(file);

        builder.format(move |buf, record| {
            let line = format!(
                "[{} {} {}] {}\n",
                buf.timestamp_seconds(),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args(),
            );
            buf.write_all(line.as_bytes())?;
            if let Ok(mut f) = file.lock() {
                f.write_all(line.as_bytes())
                    .and_then(|()| f.flush())
                    .ok();
            }
            Ok(())
        });
        opened = Some(path);
    }

    builder
        .try_init()
        .context("Logger already initialised")?;
    Ok(opened)
}
