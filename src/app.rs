//! Batch driver: runs each input through the pipeline and writes results.
//!
//! Files are processed one at a time. A failing file is reported and the
//! batch moves on; the exit code is the worst failure seen.

use crate::cli::Cli;
use crate::config::{Config, Settings};
use crate::defaults::exit_code;
use crate::error::Result;
use crate::input::validate_audio_file;
use crate::options::RunOptions;
use crate::pipeline::{Pipeline, dry_run};
use crate::result::TranscriptionResult;
use crate::routing::{CommandExecutor, SystemCommandExecutor};
use crate::stt::{OpenAiEngine, TranscriptionEngine};
use owo_colors::OwoColorize;
use std::collections::HashSet;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Where results go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// One input, one JSON file.
    File(PathBuf),
    /// Several inputs; each result lands in `<dir>/<stem>.json`, or
    /// `<dir>/<stem>-<n>.json` when an earlier input already took that name.
    Directory(PathBuf),
}

impl OutputTarget {
    pub fn resolve(out: Option<&Path>, inputs: usize) -> Self {
        match out {
            None => Self::Stdout,
            Some(path) if inputs > 1 => Self::Directory(crate::input::expand_tilde(path)),
            Some(path) => Self::File(crate::input::expand_tilde(path)),
        }
    }

    /// File a result would be written to, if any.
    ///
    /// In directory mode, names in `taken` are skipped by appending `-2`,
    /// `-3` and so on to the stem.
    pub fn path_for(
        &self,
        result: &TranscriptionResult,
        taken: &HashSet<PathBuf>,
    ) -> Option<PathBuf> {
        match self {
            Self::Stdout => None,
            Self::File(path) => Some(path.clone()),
            Self::Directory(dir) => {
                let stem = Path::new(&result.meta.source_file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                let mut path = dir.join(format!("{stem}.json"));
                let mut n = 2;
                while taken.contains(&path) {
                    path = dir.join(format!("{stem}-{n}.json"));
                    n += 1;
                }
                Some(path)
            }
        }
    }

    /// Write `result`, recording the file used in `taken`.
    pub fn write(&self, result: &TranscriptionResult, taken: &mut HashSet<PathBuf>) -> Result<()> {
        let json = result.to_json_pretty()?;
        match self.path_for(result, taken) {
            None => println!("{json}"),
            Some(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, format!("{json}\n"))?;
                log::info!("Wrote JSON transcription to: {}", path.display());
                taken.insert(path);
            }
        }
        Ok(())
    }
}

/// Outcome for one input path.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<TranscriptionResult>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Highest exit code among failed files, or 0.
    pub fn exit_code(&self) -> i32 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err())
            .map(|e| e.exit_code())
            .max()
            .unwrap_or(exit_code::SUCCESS)
    }
}

/// Print an error line to stderr, `ERROR:` in red on a terminal.
pub fn report_error(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{} {message}", "ERROR:".red().bold());
    } else {
        eprintln!("ERROR: {message}");
    }
}

/// Run every path through the pipeline, writing each success to `output`.
///
/// The engine is built on first need, so dry runs and inputs that fail
/// validation never touch credentials.
pub async fn run_batch<E, F>(
    paths: &[PathBuf],
    options: &RunOptions,
    settings: &Settings,
    executor: &E,
    mut make_engine: F,
    output: &OutputTarget,
) -> BatchReport
where
    E: CommandExecutor,
    F: FnMut() -> Result<Box<dyn TranscriptionEngine>>,
{
    let mut engine: Option<Box<dyn TranscriptionEngine>> = None;
    let mut report = BatchReport::default();
    let mut written_paths = HashSet::new();

    for path in paths {
        log::debug!("Processing {}", path.display());
        let mut result =
            process_file(path, options, settings, executor, &mut engine, &mut make_engine).await;

        let written = match &result {
            Ok(transcription) => output.write(transcription, &mut written_paths),
            Err(_) => Ok(()),
        };
        if let Err(e) = written {
            result = Err(e);
        }

        if let Err(e) = &result {
            report_error(&format!("{}: {e}", path.display()));
        }

        report.outcomes.push(FileOutcome {
            path: path.clone(),
            result,
        });
    }

    if paths.len() > 1 {
        log::info!(
            "Processed {} files: {} succeeded, {} failed",
            paths.len(),
            report.succeeded(),
            report.failed()
        );
    }

    report
}

async fn process_file<E, F>(
    path: &Path,
    options: &RunOptions,
    settings: &Settings,
    executor: &E,
    slot: &mut Option<Box<dyn TranscriptionEngine>>,
    make_engine: &mut F,
) -> Result<TranscriptionResult>
where
    E: CommandExecutor,
    F: FnMut() -> Result<Box<dyn TranscriptionEngine>>,
{
    let input = validate_audio_file(path, settings)?;

    if options.dry_run {
        return Ok(dry_run(&input, options, settings));
    }

    let engine = match slot.take() {
        Some(engine) => engine,
        None => make_engine()?,
    };
    let result = Pipeline::new(engine.as_ref(), executor, settings)
        .run_validated(&input, options)
        .await;
    *slot = Some(engine);
    result
}

/// Run the command line against a loaded configuration; returns the exit code.
pub async fn run(cli: &Cli, config: &Config) -> i32 {
    let settings = Settings::from_config(config);
    let options = cli.run_options(config);
    let output = OutputTarget::resolve(cli.out.as_deref(), cli.audio.len());
    let executor = SystemCommandExecutor::new();

    if options.dry_run {
        log::info!("[DRY RUN] No API calls or subprocesses will be made");
    }

    let report = run_batch(
        &cli.audio,
        &options,
        &settings,
        &executor,
        || Ok(Box::new(OpenAiEngine::from_env(&config.api)?) as Box<dyn TranscriptionEngine>),
        &output,
    )
    .await;

    report.exit_code()
}
