//! Incremental line reader over a growing file
//!
//! The follower starts at the current end of file and only ever yields what is
//! appended afterwards. Bytes of an unterminated line stay buffered until the
//! terminator shows up.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::event::{Event, FollowEvent};
use crate::interrupt::CancelToken;

/// Upper bound for a single read from the file
const READ_CHUNK: u64 = 64 * 1024;

/// How often the cancel token is checked while sleeping
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Smallest accepted poll interval
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Timing options for the follower
#[derive(Debug, Clone, Copy)]
pub struct FollowerOptions {
    /// Quiet period after which an idle marker is produced (zero disables)
    pub idle_timeout: Duration,
    /// Sleep between polls when no complete line is available
    pub poll_interval: Duration,
}

impl Default for FollowerOptions {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Result of a single non-blocking step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    Ready(FollowEvent),
    Pending,
}

#[derive(Debug, Default)]
struct FollowState {
    /// Offset of the next byte to read from the file
    position: u64,
    /// Bytes read but not yet part of a complete line
    remainder: Vec<u8>,
    /// Time spent waiting since the last line
    idle: Duration,
    /// Lines yielded since start or the last idle marker
    lines_read: u64,
    /// A bare terminator right after start is leftover noise
    trailing: bool,
    /// Last terminator was a lone `\r`; a following `\n` belongs to it
    pending_cr: bool,
    /// A full poll interval has been slept since the last poll
    waited: bool,
}

/// Follows appended lines of a readable, seekable source
pub struct Follower<R> {
    reader: R,
    state: FollowState,
    options: FollowerOptions,
    cancel: CancelToken,
    /// Path checked on every read so a removed file ends the run
    watch_path: Option<PathBuf>,
    failed: bool,
}

impl Follower<File> {
    /// Open `path` and follow it from its current end
    pub fn open(path: &Path, options: FollowerOptions, cancel: CancelToken) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut follower = Self::new(file, options, cancel)?;
        follower.watch_path = Some(path.to_path_buf());
        Ok(follower)
    }
}

impl<R: Read + Seek> Follower<R> {
    /// Start following `reader` from its current end
    pub fn new(mut reader: R, options: FollowerOptions, cancel: CancelToken) -> Result<Self> {
        let position = reader
            .seek(SeekFrom::End(0))
            .context("Failed to seek to end of file")?;
        debug!("Following from offset {}", position);

        Ok(Self {
            reader,
            state: FollowState {
                position,
                trailing: true,
                ..FollowState::default()
            },
            options: FollowerOptions {
                poll_interval: options.poll_interval.max(MIN_POLL_INTERVAL),
                ..options
            },
            cancel,
            watch_path: None,
            failed: false,
        })
    }

    #[cfg(test)]
    fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Perform one step without sleeping.
    ///
    /// Idle time only grows by the poll intervals actually slept since the
    /// last line, so an empty poll right after a line never counts.
    pub fn poll(&mut self) -> Result<Poll> {
        loop {
            if let Some(line) = self.take_line() {
                if std::mem::take(&mut self.state.trailing) && line.is_empty() {
                    debug!("Dropping leftover line terminator");
                    continue;
                }
                self.state.idle = Duration::ZERO;
                self.state.waited = false;
                self.state.lines_read += 1;
                return Ok(Poll::Ready(FollowEvent::Line(Event::new(
                    self.state.lines_read,
                    line,
                ))));
            }
            if self.fill()? == 0 {
                break;
            }
        }

        let waited = std::mem::take(&mut self.state.waited);
        if !waited || self.options.idle_timeout.is_zero() || self.state.lines_read == 0 {
            return Ok(Poll::Pending);
        }

        self.state.idle += self.options.poll_interval;
        if self.state.idle >= self.options.idle_timeout {
            debug!(
                "Idle after {} lines ({:?})",
                self.state.lines_read, self.state.idle
            );
            self.state.idle = Duration::ZERO;
            self.state.lines_read = 0;
            return Ok(Poll::Ready(FollowEvent::Idle));
        }

        Ok(Poll::Pending)
    }

    /// Split the next complete line off the buffered remainder
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let state = &mut self.state;

        if state.pending_cr && !state.remainder.is_empty() {
            state.pending_cr = false;
            if state.remainder[0] == b'\n' {
                state.remainder.drain(..1);
            }
        }

        let end = state
            .remainder
            .iter()
            .position(|b| *b == b'\n' || *b == b'\r')?;

        let mut consumed = end + 1;
        if state.remainder[end] == b'\r' {
            match state.remainder.get(end + 1) {
                Some(b'\n') => consumed += 1,
                Some(_) => {}
                // `\n` may still be on its way
                None => state.pending_cr = true,
            }
        }

        let line = state.remainder[..end].to_vec();
        state.remainder.drain(..consumed);
        Some(line)
    }

    /// Read newly appended bytes into the remainder, returning how many
    fn fill(&mut self) -> Result<usize> {
        if let Some(path) = &self.watch_path {
            std::fs::metadata(path)
                .with_context(|| format!("{} is no longer readable", path.display()))?;
        }

        let len = self
            .reader
            .seek(SeekFrom::End(0))
            .context("Failed to read file length")?;

        if len < self.state.position {
            warn!(
                "File truncated from {} to {} bytes, reading from start",
                self.state.position, len
            );
            self.state.position = 0;
            self.state.remainder.clear();
            self.state.pending_cr = false;
        }

        if len == self.state.position {
            return Ok(0);
        }

        self.reader
            .seek(SeekFrom::Start(self.state.position))
            .context("Failed to seek in file")?;

        let want = (len - self.state.position).min(READ_CHUNK);
        let mut chunk = Vec::with_capacity(want as usize);
        let read = self
            .reader
            .by_ref()
            .take(want)
            .read_to_end(&mut chunk)
            .context("Failed to read from file")?;

        self.state.position += read as u64;
        self.state.remainder.extend_from_slice(&chunk);
        Ok(read)
    }

    /// Sleep one poll interval, waking early on cancellation
    fn sleep(&mut self) {
        let deadline = Instant::now() + self.options.poll_interval;
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(CANCEL_CHECK_INTERVAL));
        }
        self.record_wait();
    }

    /// Count one slept poll interval toward the idle timeout
    fn record_wait(&mut self) {
        self.state.waited = true;
    }
}

impl<R: Read + Seek> Iterator for Follower<R> {
    type Item = Result<FollowEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if self.cancel.is_cancelled() {
                debug!("Follower cancelled");
                return None;
            }
            match self.poll() {
                Ok(Poll::Ready(event)) => return Some(Ok(event)),
                Ok(Poll::Pending) => self.sleep(),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
