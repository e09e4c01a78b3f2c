//! Candidate filters applied between extraction and publishing.
//!
//! - [`spoiler`]: drop anything that gives away a match result
//! - [`rank`]: keep the freshest few candidates per site
//! - [`dedup`]: drop repeats, within this run and against posted history

pub mod dedup;
pub mod rank;
pub mod spoiler;
