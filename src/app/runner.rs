//! Main loop wiring the follower, grouper and formatter together

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use tracing::info;

use super::config::FollowConfig;
use crate::follow::{FollowEvent, Follower};
use crate::group::{Grouper, ProfileTable};
use crate::interrupt::CancelToken;
use crate::output::OutputFormatter;
use crate::render::{language_pattern, Language, LineRenderer};

/// Follow `config.path` and print to stdout until cancelled or a read fails
pub fn follow(
    config: &FollowConfig,
    renderer: &dyn LineRenderer,
    profiles: &ProfileTable,
    cancel: CancelToken,
) -> Result<()> {
    let profile = profiles.lookup(&config.path);

    // Language problems are reported before the file is touched
    let language = Language::resolve(config.language.as_deref(), profile, renderer)?;
    info!(
        "Following {} (language: {:?}, profile: {:?})",
        config.path.display(),
        language,
        profile.map(|p| p.file_name())
    );

    let follower = Follower::open(&config.path, config.follower_options(), cancel)?;
    let mut grouper = Grouper::new(config.grouping, profile, Utc::now());
    let stdout = std::io::stdout();
    let mut formatter =
        OutputFormatter::new(stdout.lock(), renderer, language, config.output_options());

    drive(follower, &mut grouper, &mut formatter, Utc::now)?;

    info!("Stopped following {}", config.path.display());
    Ok(())
}

/// Feed follower output through the grouper into the formatter
pub fn drive<I, W, F>(
    events: I,
    grouper: &mut Grouper<'_>,
    formatter: &mut OutputFormatter<'_, W>,
    mut now: F,
) -> Result<()>
where
    I: IntoIterator<Item = Result<FollowEvent>>,
    W: Write,
    F: FnMut() -> DateTime<Utc>,
{
    for event in events {
        match event? {
            FollowEvent::Line(event) => {
                let observation = grouper.observe(&event);
                formatter.write_event(&event, &observation)?;
            }
            FollowEvent::Idle if grouper.is_enabled() => {
                let summary = grouper.flush(now());
                formatter.write_summary(&summary)?;
            }
            FollowEvent::Idle => {}
        }
    }
    Ok(())
}

/// Comma-joined language identifiers matching `pattern`
pub fn languages(renderer: &dyn LineRenderer, pattern: &str) -> Result<String> {
    let pattern = language_pattern(pattern)
        .with_context(|| format!("Invalid language pattern {}", pattern))?;
    Ok(renderer.list_languages(&pattern).join(", "))
}
