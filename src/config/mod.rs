//! Configuration management for smartbin.
//!
//! Provides XDG-compliant directory resolution and the persisted
//! application settings (endpoints, timeouts, ledger location).

mod settings;

pub use settings::{AppSettings, Paths};
