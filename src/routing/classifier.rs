//! Keyword-based language classifier.
//!
//! Scores text against a small per-language keyword vocabulary. This is a
//! cheap heuristic: the transcription engine's own auto-detection remains the
//! safety net whenever the classifier is wrong or undecided.
//!
//! Matching policy:
//! - text is lowercased before matching
//! - each keyword scores at most one point, when it appears anywhere as a
//!   substring; repeating a keyword adds nothing, and short keywords can
//!   over-match inside longer words
//! - the strictly highest score wins; ties go to the language listed first
//! - a zero score everywhere is reported as unknown

use crate::defaults;
use std::fmt;

/// Ordered mapping from ISO-639-1 code to lowercase keywords.
///
/// Order matters: it is the tie-break order of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTable {
    entries: Vec<(String, Vec<String>)>,
}

impl KeywordTable {
    /// Build a table from `(code, keywords)` pairs.
    ///
    /// Keywords are lowercased. Entries with no keywords are dropped so every
    /// language in the table has something to match.
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let entries = entries
            .into_iter()
            .map(|(code, keywords)| {
                let keywords: Vec<String> = keywords
                    .into_iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (code, keywords)
            })
            .filter(|(_, keywords)| !keywords.is_empty())
            .collect();
        Self { entries }
    }

    /// The built-in table from [`defaults::LANGUAGE_KEYWORDS`].
    pub fn builtin() -> Self {
        Self::new(defaults::LANGUAGE_KEYWORDS.iter().map(|(code, keywords)| {
            (
                code.to_string(),
                keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    /// Language codes in table order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }

    /// Keywords for a language, empty if the language is not in the table.
    pub fn keywords(&self, language: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(code, _)| code == language)
            .map(|(_, keywords)| keywords.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(code, keywords)| (code.as_str(), keywords.as_slice()))
    }
}

/// Keyword hits for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageScore {
    pub language: String,
    pub hits: usize,
}

/// Classifier outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Language(String),
    Unknown,
}

impl Verdict {
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Language(code) => Some(code),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Language(code) => f.write_str(code),
            Self::Unknown => f.write_str(defaults::UNKNOWN_LANGUAGE),
        }
    }
}

/// Verdict plus the per-language scores it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub scores: Vec<LanguageScore>,
}

impl Classification {
    pub fn language(&self) -> Option<&str> {
        self.verdict.language()
    }
}

/// Pure keyword classifier over a borrowed [`KeywordTable`].
#[derive(Debug, Clone, Copy)]
pub struct KeywordClassifier<'a> {
    table: &'a KeywordTable,
}

impl<'a> KeywordClassifier<'a> {
    pub fn new(table: &'a KeywordTable) -> Self {
        Self { table }
    }

    pub fn classify(&self, text: &str) -> Classification {
        let folded = text.to_lowercase();

        let scores: Vec<LanguageScore> = self
            .table
            .iter()
            .map(|(code, keywords)| LanguageScore {
                language: code.to_string(),
                hits: keywords
                    .iter()
                    .filter(|keyword| folded.contains(keyword.as_str()))
                    .count(),
            })
            .collect();

        // Strictly greater keeps the first entry on ties.
        let mut best: Option<&LanguageScore> = None;
        for score in &scores {
            if score.hits > 0 && best.is_none_or(|b| score.hits > b.hits) {
                best = Some(score);
            }
        }

        let verdict = match best {
            Some(score) => Verdict::Language(score.language.clone()),
            None => Verdict::Unknown,
        };

        Classification { verdict, scores }
    }
}

/// Classify `text` against the built-in keyword table.
pub fn detect_language_from_text(text: &str) -> Option<String> {
    let table = KeywordTable::builtin();
    KeywordClassifier::new(&table)
        .classify(text)
        .language()
        .map(str::to_string)
}
