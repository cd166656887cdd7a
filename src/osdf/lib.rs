//! # osdf Architecture
//!
//! `osdf` is a client library for OSDF (Open Science Data Framework) document servers
//! with a thin command-line front end. The library never touches the terminal; the
//! binary is the only place that prints or picks an exit code.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, prints JSON and messages      │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per operation, including the edit workflow    │
//! │  - Operates on Rust types, returns Rust types               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client Layer (client/)                                     │
//! │  - Abstract DocumentClient trait                            │
//! │  - HttpClient (production), MemoryClient (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//!
//! Credentials are read once per invocation from a file that must be readable only by
//! its owner (see [`config`]). The parsed [`config::Credentials`] value is handed to the
//! client constructor; nothing is kept in process-wide state.
//!
//! ## Testing Strategy
//!
//! Commands are tested against [`client::memory::MemoryClient`], which records the calls
//! it receives so tests can assert that, for example, an invalid edit never reaches
//! `edit_node`. The binary is covered by `assert_cmd` tests under `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all remote operations
//! - [`commands`]: Logic for each command
//! - [`client`]: Document client abstraction and implementations
//! - [`model`]: Query, schema and validation types
//! - [`config`]: Credential file handling
//! - [`editor`]: External editor integration
//! - [`diff`]: Structural JSON comparison
//! - [`error`]: Error types

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod diff;
pub mod editor;
pub mod error;
pub mod model;
