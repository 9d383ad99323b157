//! Default configuration constants for langroute.
//!
//! This module provides shared constants used across the configuration file,
//! the command line and the routing pipeline so the defaults live in one place.

/// Primary transcription model used for the full file.
pub const MAIN_MODEL: &str = "gpt-4o-transcribe";

/// Cheap model used to transcribe the probe clip for language routing.
pub const DETECT_MODEL: &str = "gpt-4o-mini-transcribe";

/// Default decoding temperature.
///
/// 0.0 keeps the transcription deterministic; the probe call always uses it.
pub const TEMPERATURE: f32 = 0.0;

/// Lowest accepted decoding temperature.
pub const MIN_TEMPERATURE: f32 = 0.0;

/// Highest accepted decoding temperature.
pub const MAX_TEMPERATURE: f32 = 1.0;

/// Seconds of leading audio sampled for language routing.
///
/// 25 seconds is usually enough speech for a handful of greeting or
/// courtesy keywords to show up in the probe transcript.
pub const PROBE_SECONDS: u32 = 25;

/// Language routing is opt-in; the engine auto-detects by default.
pub const LANGUAGE_ROUTING: bool = false;

/// Audio file extensions accepted by the validator, without the leading dot.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["mp3", "m4a", "wav"];

/// External media tool used to cut the probe clip.
pub const PROBE_TOOL: &str = "ffmpeg";

/// Sample rate of the probe clip in Hz.
pub const PROBE_SAMPLE_RATE: u32 = 16000;

/// Channel count of the probe clip (mono).
pub const PROBE_CHANNELS: u8 = 1;

/// File name of the probe clip inside its scratch directory.
pub const PROBE_FILE_NAME: &str = "probe.wav";

/// Prefix for the probe clip scratch directory.
pub const PROBE_DIR_PREFIX: &str = "langroute_probe_";

/// Base URL of the OpenAI-compatible transcription API.
pub const API_BASE_URL: &str = "https://api.openai.com/v1";

/// Request timeout for a single transcription call, in seconds.
pub const API_TIMEOUT_SECS: u64 = 300;

/// How many times a transient API failure is retried.
pub const API_MAX_RETRIES: u32 = 2;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default directory for log files.
pub const LOG_DIR: &str = "logs";

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "langroute.log";

/// Transcript text used by dry runs.
pub const DRY_RUN_TEXT: &str =
    "[DRY RUN] This is a mock transcription result. No API calls were made.";

/// Classifier verdict when no keyword matched.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const USAGE_ERROR: i32 = 1;
    pub const FILE_ERROR: i32 = 2;
    pub const API_ERROR: i32 = 3;
    pub const PROBE_TOOL_ERROR: i32 = 4;
}

/// Built-in keyword table, in tie-break order.
///
/// Keywords are lowercase and matched as substrings, so short entries are
/// avoided where they would collide with another language's sentences.
pub const LANGUAGE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "pt",
        &[
            "olá",
            "obrigado",
            "obrigada",
            "bom dia",
            "boa tarde",
            "boa noite",
            "muito",
            "você",
            "tudo bem",
            "isto",
            "pela",
            "atenção",
            "gravação",
        ],
    ),
    (
        "es",
        &[
            "hola",
            "gracias",
            "buenos días",
            "buenas tardes",
            "buenas noches",
            "muchas",
            "usted",
            "esto es",
            "prueba",
            "atención",
        ],
    ),
    (
        "en",
        &[
            "hello",
            "thank you",
            "thanks",
            "good morning",
            "good evening",
            "please",
            "very much",
            "this is",
            "goodbye",
            "see you",
        ],
    ),
    (
        "fr",
        &[
            "bonjour",
            "bonsoir",
            "merci",
            "beaucoup",
            "s'il vous plaît",
            "au revoir",
            "c'est",
        ],
    ),
    (
        "de",
        &[
            "hallo",
            "guten tag",
            "guten morgen",
            "danke",
            "bitte",
            "schön",
            "tschüss",
            "auf wiedersehen",
        ],
    ),
    (
        "it",
        &[
            "ciao",
            "buongiorno",
            "buonasera",
            "grazie",
            "per favore",
            "prego",
            "arrivederci",
            "mille",
        ],
    ),
    (
        "nl",
        &[
            "hallo",
            "goedemorgen",
            "goedemiddag",
            "dank je",
            "dank u",
            "alstublieft",
            "bedankt",
            "tot ziens",
        ],
    ),
    (
        "ru",
        &[
            "привет",
            "здравствуйте",
            "спасибо",
            "пожалуйста",
            "до свидания",
        ],
    ),
    ("zh", &["你好", "谢谢", "早上好", "再见", "请问"]),
    (
        "ja",
        &["こんにちは", "ありがとう", "おはよう", "さようなら", "すみません"],
    ),
];
