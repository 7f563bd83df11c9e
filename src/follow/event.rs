use std::borrow::Cow;
use std::fmt::Write as _;

/// One complete line read from the followed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// 1-based position within the current group
    seq: u64,
    /// Line bytes with the terminator stripped
    raw: Vec<u8>,
}

impl Event {
    pub fn new(seq: u64, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            seq,
            raw: raw.into(),
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The line as UTF-8, if it is valid
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.raw).ok()
    }

    /// The line as text, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// Byte-safe rendering: valid UTF-8 runs are kept, every other byte is
    /// written as `\xNN`
    pub fn escaped(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for chunk in self.raw.utf8_chunks() {
            out.push_str(chunk.valid());
            for byte in chunk.invalid() {
                let _ = write!(out, "\\x{:02x}", byte);
            }
        }
        out
    }
}

/// Item produced by the follower
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowEvent {
    /// A newly appended line
    Line(Event),
    /// Nothing new arrived for the configured idle timeout
    Idle,
}
