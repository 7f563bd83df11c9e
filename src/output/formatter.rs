//! Line composition
//!
//! An event prints as `[duplicate marker ][NNN ]highlighted text`, optionally
//! followed by a full-width separator that carries the number instead.

use anyhow::Result;
use crossterm::style::Stylize;
use std::borrow::Cow;
use std::io::Write;
use tracing::warn;

use crate::follow::Event;
use crate::group::{FlushSummary, Observation};
use crate::render::{Language, LineRenderer};
use crate::terminal::TerminalSize;

/// Presentation switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Print a separator line after each event
    pub separator: bool,
    /// Reformat SQL before highlighting
    pub indent: bool,
    /// Number events within their group
    pub number: bool,
    /// Mark repeated events
    pub show_duplicates: bool,
}

/// Writes highlighted events and summaries to `out`
pub struct OutputFormatter<'r, W> {
    out: W,
    renderer: &'r dyn LineRenderer,
    language: Language,
    options: OutputOptions,
    /// Fixed geometry; the live terminal is queried when unset
    size: Option<TerminalSize>,
}

impl<'r, W: Write> OutputFormatter<'r, W> {
    pub fn new(
        out: W,
        renderer: &'r dyn LineRenderer,
        language: Language,
        options: OutputOptions,
    ) -> Self {
        Self {
            out,
            renderer,
            language,
            options,
            size: None,
        }
    }

    /// Use a fixed terminal size instead of querying the terminal
    pub fn with_size(mut self, size: TerminalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn width(&self) -> usize {
        self.size.unwrap_or_else(TerminalSize::current).width as usize
    }

    /// Print one event
    pub fn write_event(&mut self, event: &Event, observation: &Observation) -> Result<()> {
        let mut line = String::new();

        if self.options.show_duplicates {
            if let Some(duplicate) = observation.duplicate {
                let marker = format!(
                    " duplicate #{} count:{} ",
                    duplicate.ordinal, duplicate.count
                );
                line.push_str(&format!("{} ", marker.red().reverse()));
            }
        }

        if self.options.number && !self.options.separator {
            line.push_str(&format!("{:03} ", observation.seq));
        }

        line.push_str(&self.render(event));
        writeln!(self.out, "{}", line)?;

        if self.options.separator {
            let label = if self.options.number {
                format!("{:03}", observation.seq)
            } else {
                String::new()
            };
            self.write_separator(&label)?;
        }

        self.out.flush()?;
        Ok(())
    }

    /// Print the banner closing a group
    pub fn write_summary(&mut self, summary: &FlushSummary) -> Result<()> {
        let plural = if summary.events == 1 { "" } else { "s" };
        let text = format!(
            " {} event{}, {}s elapsed, {} unique events",
            summary.events, plural, summary.elapsed_secs, summary.unique_events
        );
        let banner = format!("{:<width$}", text, width = self.width());

        writeln!(self.out, "{}", banner.white().reverse())?;
        self.out.flush()?;
        Ok(())
    }

    fn write_separator(&mut self, label: &str) -> Result<()> {
        let dashes = self.width().saturating_sub(label.chars().count());
        writeln!(self.out, "{}{}", "-".repeat(dashes), label)?;
        Ok(())
    }

    /// Highlight the event, falling back to a byte-safe plain rendering
    fn render(&self, event: &Event) -> String {
        let Some(text) = event.as_str() else {
            warn!("Line {} is not valid UTF-8, printing escaped bytes", event.seq());
            return event.escaped();
        };

        let language = self.language.for_line(text, self.renderer);
        let source: Cow<'_, str> = if self.options.indent && language.is_sql() {
            Cow::Owned(self.renderer.reformat(text))
        } else {
            Cow::Borrowed(text)
        };

        match self.renderer.highlight(&source, &language) {
            Ok(styled) => styled.trim_end().to_string(),
            Err(e) => {
                warn!("Highlighting failed, printing plain text: {:#}", e);
                event.escaped()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Duplicate;
    use crate::render::LanguageHint;
    use regex::Regex;

    /// Tags the text with its language instead of styling it
    struct Tagging;

    impl LineRenderer for Tagging {
        fn highlight(&self, text: &str, language: &LanguageHint) -> Result<String> {
            if text.contains("boom") {
                anyhow::bail!("cannot highlight");
            }
            Ok(format!("<{}>{}", language, text))
        }

        fn reformat(&self, sql: &str) -> String {
            sql.to_uppercase()
        }

        fn guess_language(&self, text: &str) -> LanguageHint {
            if text.starts_with('{') {
                LanguageHint::new("json")
            } else {
                LanguageHint::new("txt")
            }
        }

        fn list_languages(&self, _pattern: &Regex) -> Vec<String> {
            Vec::new()
        }
    }

    fn size(width: u16) -> TerminalSize {
        TerminalSize { width, height: 24 }
    }

    fn output(language: Language, options: OutputOptions, events: &[(Event, Observation)]) -> String {
        let mut formatter =
            OutputFormatter::new(Vec::new(), &Tagging, language, options).with_size(size(20));
        for (event, observation) in events {
            formatter.write_event(event, observation).unwrap();
        }
        String::from_utf8(formatter.into_inner()).unwrap()
    }

    fn plain(seq: u64, text: &str) -> (Event, Observation) {
        (
            Event::new(seq, text),
            Observation {
                seq,
                duplicate: None,
            },
        )
    }

    #[test]
    fn test_plain_line() {
        let out = output(Language::Guessing, OutputOptions::default(), &[plain(1, "hello")]);
        assert_eq!(out, "<txt>hello\n");
    }

    #[test]
    fn test_guesses_per_line() {
        let out = output(
            Language::Guessing,
            OutputOptions::default(),
            &[plain(1, "{}"), plain(2, "text")],
        );
        assert_eq!(out, "<json>{}\n<txt>text\n");
    }

    #[test]
    fn test_numbered_lines() {
        let options = OutputOptions {
            number: true,
            ..OutputOptions::default()
        };
        let out = output(Language::Guessing, options, &[plain(1, "a"), plain(2, "b")]);
        assert_eq!(out, "001 <txt>a\n002 <txt>b\n");
    }

    #[test]
    fn test_separator_carries_number() {
        let options = OutputOptions {
            number: true,
            separator: true,
            ..OutputOptions::default()
        };
        let out = output(Language::Guessing, options, &[plain(7, "a")]);
        assert_eq!(out, format!("<txt>a\n{}007\n", "-".repeat(17)));
    }

    #[test]
    fn test_separator_without_number() {
        let options = OutputOptions {
            separator: true,
            ..OutputOptions::default()
        };
        let out = output(Language::Guessing, options, &[plain(1, "a")]);
        assert_eq!(out, format!("<txt>a\n{}\n", "-".repeat(20)));
    }

    #[test]
    fn test_duplicate_marker() {
        let duplicate = (
            Event::new(2, "again"),
            Observation {
                seq: 2,
                duplicate: Some(Duplicate {
                    ordinal: 1,
                    count: 2,
                }),
            },
        );

        let hidden = output(Language::Guessing, OutputOptions::default(), &[duplicate.clone()]);
        assert_eq!(hidden, "<txt>again\n");

        let options = OutputOptions {
            show_duplicates: true,
            number: true,
            ..OutputOptions::default()
        };
        let shown = output(Language::Guessing, options, &[duplicate]);
        assert!(shown.contains(" duplicate #1 count:2 "));
        assert!(shown.ends_with(" 002 <txt>again\n"));
    }

    #[test]
    fn test_indent_reformats_sql_only() {
        let options = OutputOptions {
            indent: true,
            ..OutputOptions::default()
        };
        let sql = output(
            Language::Named(LanguageHint::new("sql")),
            options,
            &[plain(1, "select 1")],
        );
        assert_eq!(sql, "<sql>SELECT 1\n");

        let text = output(Language::Guessing, options, &[plain(1, "select 1")]);
        assert_eq!(text, "<txt>select 1\n");
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_escaped_bytes() {
        let event = Event::new(1, b"bad \xff byte".to_vec());
        let observation = Observation {
            seq: 1,
            duplicate: None,
        };
        let out = output(Language::Guessing, OutputOptions::default(), &[(event, observation)]);
        assert_eq!(out, "bad \\xff byte\n");
    }

    #[test]
    fn test_highlight_failure_falls_back_to_plain() {
        let out = output(
            Language::Guessing,
            OutputOptions::default(),
            &[plain(1, "boom"), plain(2, "fine")],
        );
        assert_eq!(out, "boom\n<txt>fine\n");
    }

    #[test]
    fn test_summary_banner() {
        let mut formatter = OutputFormatter::new(
            Vec::new(),
            &Tagging,
            Language::Guessing,
            OutputOptions::default(),
        )
        .with_size(size(60));
        formatter
            .write_summary(&FlushSummary {
                events: 3,
                unique_events: 2,
                elapsed_secs: 4,
            })
            .unwrap();
        formatter
            .write_summary(&FlushSummary {
                events: 1,
                unique_events: 1,
                elapsed_secs: 0,
            })
            .unwrap();

        let out = String::from_utf8(formatter.into_inner()).unwrap();
        let padded = format!("{:<60}", " 3 events, 4s elapsed, 2 unique events");
        assert!(out.contains(&padded));
        assert!(out.contains(" 1 event, 0s elapsed, 1 unique events"));
    }
}
