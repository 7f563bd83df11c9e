//! Printed layout of events and group summaries

pub mod formatter;

pub use formatter::{OutputFormatter, OutputOptions};
