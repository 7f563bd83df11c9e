//! `syntect` backed renderer

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::as_24_bit_terminal_escaped;

use super::{sql, LanguageHint, LineRenderer};

const THEME: &str = "base16-ocean.dark";
const RESET: &str = "\x1b[0m";

/// Highlights with the bundled syntax definitions and theme
pub struct SyntectRenderer {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectRenderer {
    pub fn new() -> Result<Self> {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(THEME)
            .ok_or_else(|| anyhow!("Missing bundled theme {}", THEME))?;

        Ok(Self { syntaxes, theme })
    }

    fn syntax_for(&self, language: &LanguageHint) -> &SyntaxReference {
        self.syntaxes
            .find_syntax_by_token(language.as_str())
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn hint_for(syntax: &SyntaxReference) -> LanguageHint {
        match syntax.file_extensions.first() {
            Some(extension) => LanguageHint::new(extension.as_str()),
            None => LanguageHint::new(syntax.name.to_lowercase()),
        }
    }

    /// Every identifier `find_syntax_by_token` accepts: lowercase syntax
    /// names and file extensions
    fn identifiers(&self) -> BTreeSet<String> {
        self.syntaxes
            .syntaxes()
            .iter()
            .flat_map(|syntax| {
                std::iter::once(syntax.name.to_lowercase())
                    .chain(syntax.file_extensions.iter().cloned())
            })
            .collect()
    }
}

impl LineRenderer for SyntectRenderer {
    fn highlight(&self, text: &str, language: &LanguageHint) -> Result<String> {
        let mut highlighter = HighlightLines::new(self.syntax_for(language), &self.theme);

        let mut lines = Vec::new();
        for line in text.lines() {
            let line = format!("{}\n", line);
            let ranges = highlighter
                .highlight_line(&line, &self.syntaxes)
                .with_context(|| format!("Failed to highlight as {}", language))?;
            let styled = as_24_bit_terminal_escaped(&ranges, false);
            lines.push(styled.trim_end_matches('\n').to_string());
        }

        let separator = format!("{}\n", RESET);
        let mut out = lines.join(separator.as_str());
        out.push_str(RESET);
        Ok(out)
    }

    fn reformat(&self, text: &str) -> String {
        sql::reformat(text)
    }

    fn guess_language(&self, text: &str) -> LanguageHint {
        if let Some(syntax) = self.syntaxes.find_syntax_by_first_line(text) {
            return Self::hint_for(syntax);
        }

        let trimmed = text.trim();
        if sql::looks_like_sql(trimmed) {
            return LanguageHint::new("sql");
        }
        if (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() > 2)
        {
            if let Some(syntax) = self.syntaxes.find_syntax_by_token("json") {
                return Self::hint_for(syntax);
            }
        }

        Self::hint_for(self.syntaxes.find_syntax_plain_text())
    }

    fn list_languages(&self, pattern: &Regex) -> Vec<String> {
        self.identifiers()
            .into_iter()
            .filter(|id| pattern.is_match(id))
            .collect()
    }
}
