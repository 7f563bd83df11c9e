//! Live file following
//!
//! Turns a growing file into a stream of complete lines, interleaved with
//! idle markers whenever the file goes quiet after some activity.

pub mod event;
pub mod follower;

pub use event::{Event, FollowEvent};
pub use follower::{Follower, FollowerOptions, Poll};
