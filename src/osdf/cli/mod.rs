//! # CLI Layer
//!
//! One UI client for the osdf library, and the only place that:
//! - Parses arguments (clap)
//! - Prompts the user (`init`)
//! - Writes to stdout/stderr
//! - Decides the process exit status
//!
//! ## Structure
//!
//! - `setup`: clap definitions
//! - `commands`: `run()`, context setup and per-command handlers
//! - `render`: JSON, message and error formatting
//! - `prompt`: interactive credential prompts

mod commands;
mod prompt;
mod render;
mod setup;

pub use commands::run;
