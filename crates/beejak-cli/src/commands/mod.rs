//! CLI command implementations.

pub mod config;
pub mod export;
pub mod preview;
pub mod remote;
