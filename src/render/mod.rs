//! Syntax highlighting
//!
//! The rest of the crate only talks to [`LineRenderer`]. [`SyntectRenderer`]
//! is the implementation used by the binary.

pub mod sql;
pub mod highlighter;

use anyhow::Result;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::group::FileTypeProfile;

pub use highlighter::SyntectRenderer;

/// Identifier of a highlighting language, e.g. `sql` or `py`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageHint(String);

impl LanguageHint {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this names the SQL language
    pub fn is_sql(&self) -> bool {
        self.0.eq_ignore_ascii_case("sql")
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-facing language selection errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageError {
    #[error("Invalid language {0}")]
    NotFound(String),
    #[error("Choose a single language for {name}: {}", .candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
}

/// Highlighting backend
pub trait LineRenderer {
    /// Highlight `text` as `language`, returning terminal-styled text
    fn highlight(&self, text: &str, language: &LanguageHint) -> Result<String>;

    /// Reformat a SQL statement: uppercase keywords, one clause per line
    fn reformat(&self, sql: &str) -> String;

    /// Guess the language of `text` from its content
    fn guess_language(&self, text: &str) -> LanguageHint;

    /// Known language identifiers matching `pattern`, sorted
    fn list_languages(&self, pattern: &Regex) -> Vec<String>;

    /// Resolve a user-supplied language name to exactly one identifier.
    ///
    /// `name` is matched as a whole-identifier regular expression.
    fn resolve_language(&self, name: &str) -> Result<LanguageHint, LanguageError> {
        let pattern = Regex::new(&format!("^(?:{})$", name))
            .map_err(|_| LanguageError::NotFound(name.to_string()))?;

        let mut candidates = self.list_languages(&pattern);
        match candidates.len() {
            0 => Err(LanguageError::NotFound(name.to_string())),
            1 => Ok(LanguageHint::new(candidates.remove(0))),
            _ => Err(LanguageError::Ambiguous {
                name: name.to_string(),
                candidates,
            }),
        }
    }
}

/// Compile a `languages` pattern; like a prefix match, it is anchored at the
/// start only
pub fn language_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", pattern))
}

/// Language selection for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Language {
    /// Guess per line from content
    Guessing,
    Named(LanguageHint),
}

impl Language {
    /// Pick the language: explicit name first, then the file's profile, then
    /// guessing
    pub fn resolve(
        explicit: Option<&str>,
        profile: Option<&FileTypeProfile>,
        renderer: &dyn LineRenderer,
    ) -> Result<Self, LanguageError> {
        if let Some(name) = explicit {
            return renderer.resolve_language(name).map(Language::Named);
        }
        Ok(match profile {
            Some(profile) => Language::Named(LanguageHint::new(profile.language())),
            None => Language::Guessing,
        })
    }

    /// Language to use for one line
    pub fn for_line(&self, text: &str, renderer: &dyn LineRenderer) -> LanguageHint {
        match self {
            Language::Guessing => renderer.guess_language(text),
            Language::Named(hint) => hint.clone(),
        }
    }
}
