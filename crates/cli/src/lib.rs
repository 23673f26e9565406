//! Command-line dashboard for a WhatsApp bridge.
//!
//! Wraps [`wa_runtime::ConnectionMonitor`] with one subcommand per user
//! action and prints every result through the envelope in [`output`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod render;
pub mod runtime;
