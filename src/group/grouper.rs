//! Duplicate detection within bursts of events
//!
//! Events between two idle markers form a group. Each event is fingerprinted
//! (after the file's timestamp prefix is stripped) so repeated lines can be
//! marked, and a summary is produced when the group is flushed.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::profile::FileTypeProfile;
use crate::follow::Event;

/// SHA-256 digest of a line's comparable content
pub type Fingerprint = [u8; 32];

/// Compute the fingerprint of `line`, stripping the profile's timestamp first
pub fn fingerprint(profile: Option<&FileTypeProfile>, line: &[u8]) -> Fingerprint {
    let content = match profile {
        Some(profile) => profile.strip_stamp(line),
        None => line.into(),
    };
    let mut print = [0u8; 32];
    print.copy_from_slice(&Sha256::digest(&content));
    print
}

/// Duplicate annotation for a repeated event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duplicate {
    /// 1-based order in which this content was first seen repeated
    pub ordinal: usize,
    /// Occurrences so far in the current group
    pub count: usize,
}

/// What the grouper learned about one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Sequence number to display
    pub seq: u64,
    /// Set when the event repeats earlier content of the group
    pub duplicate: Option<Duplicate>,
}

/// Summary printed when a group is flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushSummary {
    pub events: usize,
    pub unique_events: usize,
    pub elapsed_secs: u64,
}

#[derive(Debug, Default)]
struct Occurrence {
    count: usize,
    ordinal: Option<usize>,
}

/// Events seen since the last flush
#[derive(Debug)]
pub struct GroupState {
    since: DateTime<Utc>,
    events: usize,
    seen: HashMap<Fingerprint, Occurrence>,
    duplicates: usize,
}

impl GroupState {
    fn new(since: DateTime<Utc>) -> Self {
        Self {
            since,
            events: 0,
            seen: HashMap::new(),
            duplicates: 0,
        }
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn events(&self) -> usize {
        self.events
    }

    pub fn unique_events(&self) -> usize {
        self.seen.len()
    }

    /// Record one occurrence of `print`, returning its duplicate annotation
    fn record(&mut self, print: Fingerprint) -> Option<Duplicate> {
        self.events += 1;

        let occurrence = self.seen.entry(print).or_default();
        occurrence.count += 1;
        if occurrence.count < 2 {
            return None;
        }

        let ordinal = match occurrence.ordinal {
            Some(ordinal) => ordinal,
            None => {
                self.duplicates += 1;
                occurrence.ordinal = Some(self.duplicates);
                self.duplicates
            }
        };

        Some(Duplicate {
            ordinal,
            count: occurrence.count,
        })
    }
}

/// Groups events by quiet periods and detects duplicates
pub struct Grouper<'a> {
    window: Duration,
    profile: Option<&'a FileTypeProfile>,
    state: GroupState,
}

impl<'a> Grouper<'a> {
    /// A zero `window` disables grouping entirely
    pub fn new(window: Duration, profile: Option<&'a FileTypeProfile>, now: DateTime<Utc>) -> Self {
        Self {
            window,
            profile,
            state: GroupState::new(now),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    pub fn state(&self) -> &GroupState {
        &self.state
    }

    /// Account for one event of the current group
    pub fn observe(&mut self, event: &Event) -> Observation {
        let duplicate = if self.is_enabled() {
            self.state.record(fingerprint(self.profile, event.bytes()))
        } else {
            None
        };

        Observation {
            seq: event.seq(),
            duplicate,
        }
    }

    /// Close the current group and start a new one at `now`
    pub fn flush(&mut self, now: DateTime<Utc>) -> FlushSummary {
        let elapsed = (now - self.state.since).num_seconds() - self.window.as_secs() as i64;
        let summary = FlushSummary {
            events: self.state.events,
            unique_events: self.state.unique_events(),
            elapsed_secs: elapsed.max(0) as u64,
        };
        debug!(
            "Flushing group: {} events, {} unique",
            summary.events, summary.unique_events
        );

        self.state = GroupState::new(now);
        summary
    }
}
