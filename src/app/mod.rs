pub mod config;
pub mod runner;

pub use config::FollowConfig;
pub use runner::{drive, follow, languages};
