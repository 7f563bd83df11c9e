//! Known log file types
//!
//! A profile is keyed by file basename. It names the timestamp prefix to strip
//! before lines are compared, and the language the file is usually written in.

use anyhow::{Context, Result};
use regex::bytes::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

/// Django's SQL query log: `[2015-01-01 12:00:00,123] (0.001) SELECT ...`
const DJANGO_SQL_FILE: &str = "django_sql.log";
const DJANGO_SQL_STAMP: &str =
    r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3}\] \(\d+\.\d+\) ";
const DJANGO_SQL_LANGUAGE: &str = "sql";

/// Stripping rule and default language for one file name
#[derive(Debug, Clone)]
pub struct FileTypeProfile {
    file_name: String,
    stamp: Regex,
    language: String,
}

impl FileTypeProfile {
    pub fn new(file_name: &str, stamp_pattern: &str, language: &str) -> Result<Self> {
        let stamp = Regex::new(stamp_pattern)
            .with_context(|| format!("Invalid timestamp pattern for {}", file_name))?;
        Ok(Self {
            file_name: file_name.to_string(),
            stamp,
            language: language.to_string(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Remove the timestamp prefix from `line`
    pub fn strip_stamp<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        self.stamp.replace(line, &b""[..])
    }
}

/// Immutable lookup table of profiles, keyed by basename
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    profiles: HashMap<String, FileTypeProfile>,
}

impl ProfileTable {
    /// Table with the built-in profiles
    pub fn builtin() -> Result<Self> {
        Ok(Self::default().with(FileTypeProfile::new(
            DJANGO_SQL_FILE,
            DJANGO_SQL_STAMP,
            DJANGO_SQL_LANGUAGE,
        )?))
    }

    /// Add a profile, replacing any with the same file name
    pub fn with(mut self, profile: FileTypeProfile) -> Self {
        self.profiles.insert(profile.file_name.clone(), profile);
        self
    }

    /// Profile for the basename of `path`
    pub fn lookup(&self, path: &Path) -> Option<&FileTypeProfile> {
        let basename = path.file_name()?.to_str()?;
        self.profiles.get(basename)
    }
}
