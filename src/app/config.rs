use std::path::PathBuf;
use std::time::Duration;

use crate::follow::FollowerOptions;
use crate::output::OutputOptions;

/// Settings for one `follow` run
#[derive(Debug, Clone)]
pub struct FollowConfig {
    /// File to follow
    pub path: PathBuf,
    /// Explicit highlighting language (guessing when unset)
    pub language: Option<String>,
    /// Quiet period closing a group; zero disables grouping
    pub grouping: Duration,
    /// Sleep between polls of the file
    pub poll_interval: Duration,
    /// Print a separator line after each event
    pub separator: bool,
    /// Reformat SQL before highlighting
    pub indent: bool,
    /// Number events within their group
    pub number: bool,
    /// Mark repeated events
    pub show_duplicates: bool,
}

pub fn default_grouping_secs() -> u64 {
    1
}

pub fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            language: None,
            grouping: Duration::from_secs(default_grouping_secs()),
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            separator: false,
            indent: false,
            number: false,
            show_duplicates: false,
        }
    }
}

impl FollowConfig {
    pub fn follower_options(&self) -> FollowerOptions {
        FollowerOptions {
            idle_timeout: self.grouping,
            poll_interval: self.poll_interval,
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            separator: self.separator,
            indent: self.indent,
            number: self.number,
            show_duplicates: self.show_duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FollowConfig::default();
        assert_eq!(config.grouping, Duration::from_secs(1));
        assert_eq!(config.follower_options().idle_timeout, Duration::from_secs(1));
        assert_eq!(config.output_options(), OutputOptions::default());
    }
}
