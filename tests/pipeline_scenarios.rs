//! End-to-end pipeline behaviour with a mock engine and a fake media tool.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use langroute::app::{OutputTarget, run_batch};
use langroute::config::{ProbeConfig, Settings};
use langroute::defaults;
use langroute::pipeline::dry_run;
use langroute::routing::KeywordTable;
use langroute::stt::{MockEngine, TranscriptionEngine};
use langroute::{
    CommandExecutor, Meta, Pipeline, Result, RouteError, RunOptions, validate_audio_file,
};

const MAIN: &str = defaults::MAIN_MODEL;
const DETECT: &str = defaults::DETECT_MODEL;

/// Fake media tool: writes a probe clip when installed.
struct FakeTool {
    installed: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTool {
    fn installed() -> Self {
        Self {
            installed: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn missing() -> Self {
        Self {
            installed: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandExecutor for FakeTool {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|a| a.to_string()).collect());
        if !self.installed {
            return Err(RouteError::ProbeToolMissing {
                tool: command.to_string(),
            });
        }
        if args != ["-version"]
            && let Some(out) = args.last()
        {
            std::fs::write(out, b"RIFF").unwrap();
        }
        Ok(String::new())
    }
}

fn audio_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"fake audio").unwrap();
    path
}

fn settings_with_tool(tool: &str) -> Settings {
    let probe = ProbeConfig {
        tool: tool.to_string(),
        ..ProbeConfig::default()
    };
    Settings::new(&defaults::SUPPORTED_EXTENSIONS, KeywordTable::builtin(), &probe)
}

fn routing() -> RunOptions {
    RunOptions {
        language_routing: true,
        ..RunOptions::default()
    }
}

#[tokio::test]
async fn missing_file_exits_2_without_calls() {
    let engine = MockEngine::new();
    let tool = FakeTool::installed();
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, &tool, &settings);

    let err = pipeline
        .run(Path::new("missing.mp3"), &routing())
        .await
        .unwrap_err();

    assert!(matches!(err, RouteError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(engine.call_count(), 0);
    assert_eq!(tool.call_count(), 0);
}

#[tokio::test]
async fn unsupported_extension_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.flac");
    let engine = MockEngine::new();
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, FakeTool::installed(), &settings);

    let err = pipeline.run(&path, &routing()).await.unwrap_err();

    assert!(err.to_string().contains("Unsupported file type"));
    assert!(err.to_string().contains(".flac"));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn routing_disabled_calls_engine_once_without_language() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    let engine = MockEngine::new().with_json(
        MAIN,
        serde_json::json!({"text": "Hello world", "duration": 1.5}),
    );
    let tool = FakeTool::installed();
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, &tool, &settings);

    let result = pipeline.run(&path, &RunOptions::default()).await.unwrap();

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, MAIN);
    assert_eq!(calls[0].language, None);
    assert_eq!(tool.call_count(), 0);

    assert_eq!(result.text, "Hello world");
    assert_eq!(result.fields["duration"], 1.5);
    assert!(!result.meta.language_routing_enabled);
    assert_eq!(result.meta.forced_language, None);
    assert!(!result.meta.probe_used);
}

#[tokio::test]
async fn routed_language_is_forced_on_full_transcription() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.m4a");
    let engine = MockEngine::new()
        .with_text(DETECT, "Olá, bom dia. Muito obrigado pela atenção.")
        .with_text(MAIN, "Olá, bom dia. Muito obrigado pela atenção. Isto é um teste.");
    let tool = FakeTool::installed();
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, &tool, &settings);

    let result = pipeline.run(&path, &routing()).await.unwrap();

    let detect_calls = engine.calls_for(DETECT);
    assert_eq!(detect_calls.len(), 1);
    assert!(detect_calls[0].audio_path.ends_with("probe.wav"));
    assert_eq!(detect_calls[0].language, None);
    assert_eq!(detect_calls[0].temperature, 0.0);

    let main_calls = engine.calls_for(MAIN);
    assert_eq!(main_calls.len(), 1);
    assert_eq!(main_calls[0].language.as_deref(), Some("pt"));

    assert_eq!(result.meta.routed_language.as_deref(), Some("pt"));
    assert_eq!(result.meta.forced_language.as_deref(), Some("pt"));
    assert!(result.meta.probe_used);
    assert!(result.meta.language_routing_enabled);
    assert!(!detect_calls[0].audio_path.exists(), "probe clip left behind");
}

#[tokio::test]
async fn probe_tool_absent_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.wav");
    let engine = MockEngine::new().with_text(DETECT, "Hola, muchas gracias por su atención");
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, FakeTool::missing(), &settings);

    let result = pipeline.run(&path, &routing()).await.unwrap();

    assert!(!result.meta.probe_used);
    assert_eq!(result.meta.forced_language.as_deref(), Some("es"));
    let detect_calls = engine.calls_for(DETECT);
    assert_eq!(detect_calls[0].audio_path, Path::new(&result.meta.source_file));
}

#[tokio::test]
async fn probe_tool_absent_batch_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.wav");
    let engine = std::sync::Arc::new(MockEngine::new());
    let handle = std::sync::Arc::clone(&engine);

    let report = run_batch(
        &[path],
        &routing(),
        &Settings::default(),
        &FakeTool::missing(),
        move || Ok(Box::new(std::sync::Arc::clone(&handle)) as Box<dyn TranscriptionEngine>),
        &OutputTarget::File(dir.path().join("out.json")),
    )
    .await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(engine.call_count(), 2);
}

#[tokio::test]
async fn explicit_language_skips_sampler_and_classifier() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    let engine = MockEngine::new().with_text(DETECT, "Hello, thank you very much");
    let tool = FakeTool::installed();
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, &tool, &settings);

    let options = RunOptions {
        language: Some("pt".to_string()),
        ..routing()
    };
    let result = pipeline.run(&path, &options).await.unwrap();

    assert_eq!(tool.call_count(), 0);
    assert!(engine.calls_for(DETECT).is_empty());
    assert_eq!(engine.calls_for(MAIN)[0].language.as_deref(), Some("pt"));
    assert_eq!(result.meta.forced_language.as_deref(), Some("pt"));
    assert_eq!(result.meta.routed_language, None);
}

#[tokio::test]
async fn keyword_free_probe_forces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    let engine = MockEngine::new().with_text(DETECT, "Lorem ipsum dolor sit amet");
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, FakeTool::installed(), &settings);

    let result = pipeline.run(&path, &routing()).await.unwrap();

    assert_eq!(engine.calls_for(MAIN)[0].language, None);
    assert_eq!(result.meta.forced_language, None);
    assert_eq!(result.meta.routing_error, None);
}

#[tokio::test]
async fn probe_failure_degrades_to_auto_detection() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    let engine = MockEngine::new().with_failure(DETECT).with_text(MAIN, "ok");
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, FakeTool::installed(), &settings);

    let result = pipeline.run(&path, &routing()).await.unwrap();

    assert_eq!(result.text, "ok");
    assert_eq!(engine.calls_for(MAIN)[0].language, None);
    assert!(result.meta.routing_error.is_some());
    assert_eq!(result.meta.forced_language, None);
}

#[tokio::test]
async fn full_transcription_failure_is_fatal_exit_3() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    let engine = MockEngine::new().with_failure(MAIN);
    let settings = Settings::default();
    let pipeline = Pipeline::new(&engine, FakeTool::installed(), &settings);

    let err = pipeline.run(&path, &RunOptions::default()).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

async fn real_meta(
    options: &RunOptions,
    settings: &Settings,
    tool: &FakeTool,
    path: &Path,
) -> Meta {
    // Keyword-free probe text keeps the routed language unknown, which is
    // all a dry run can report.
    let engine = MockEngine::new().with_text(DETECT, "zzz");
    Pipeline::new(&engine, tool, settings)
        .run(path, options)
        .await
        .unwrap()
        .meta
}

fn dry_meta(options: &RunOptions, settings: &Settings, path: &Path) -> Meta {
    let dry = RunOptions {
        dry_run: true,
        ..options.clone()
    };
    let input = validate_audio_file(path, settings).unwrap();
    let result = dry_run(&input, &dry, settings);
    assert_eq!(result.text, defaults::DRY_RUN_TEXT);
    Meta {
        dry_run: false,
        ..result.meta
    }
}

#[tokio::test]
async fn dry_run_meta_matches_real_run_without_tool() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    let settings = settings_with_tool("langroute-definitely-not-installed");

    let combos = [
        RunOptions::default(),
        routing(),
        RunOptions {
            use_probe: false,
            ..routing()
        },
        RunOptions {
            language: Some("fr".to_string()),
            ..routing()
        },
        RunOptions {
            probe_seconds: 7,
            temperature: 0.3,
            model: "whisper-1".to_string(),
            ..RunOptions::default()
        },
    ];

    for options in combos {
        let real = real_meta(&options, &settings, &FakeTool::missing(), &path).await;
        assert_eq!(dry_meta(&options, &settings, &path), real, "{options:?}");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn dry_run_meta_matches_real_run_with_tool() {
    let dir = tempfile::tempdir().unwrap();
    let path = audio_file(&dir, "clip.mp3");
    // Any program on PATH stands in for the media tool here.
    let settings = settings_with_tool("sh");

    for options in [routing(), RunOptions::default()] {
        let real = real_meta(&options, &settings, &FakeTool::installed(), &path).await;
        assert_eq!(dry_meta(&options, &settings, &path), real, "{options:?}");
    }
}
