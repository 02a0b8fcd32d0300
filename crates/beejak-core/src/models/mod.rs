//! Data models shared across the invoicing surface.

pub mod client;
pub mod config;
pub mod invoice;
pub mod template;
pub mod tokens;
