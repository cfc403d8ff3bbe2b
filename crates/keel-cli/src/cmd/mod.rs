//! Subcommand implementations.

pub mod check;
pub mod seed;
pub mod show;
pub mod stats;
