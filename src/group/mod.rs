//! Event grouping and duplicate detection

pub mod grouper;
pub mod profile;

pub use grouper::{fingerprint, Duplicate, FlushSummary, Grouper, Observation};
pub use profile::{FileTypeProfile, ProfileTable};
