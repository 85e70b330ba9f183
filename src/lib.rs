// ABOUTME: Library root for cutover - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod release;
pub mod ssh;
pub mod tasks;
pub mod transport;
pub mod types;
