//! Worker thread that owns the HTTP client and answers UI commands.

pub mod commands;
pub mod runtime;
