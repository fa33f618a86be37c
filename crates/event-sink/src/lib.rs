//! File-backed JSON event capture service.
//!
//! Accepts POSTed payloads on any path, canonicalizes them as JSON
//! where possible, and appends one line per request to an output file.

pub mod api;
pub mod config;
