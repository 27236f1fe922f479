//! Library entry for translator: capturing lookups, YAML-backed store, HTTP
//! endpoints and the in-place editor, exposed for the binary and integration tests.

pub mod args;
pub mod capture;
pub mod config;
pub mod editor;
pub mod error;
pub mod server;
pub mod store;
pub mod submission;
pub mod tui;
