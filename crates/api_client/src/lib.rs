//! Tabletalk query-service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the full
//! session lifecycle: upload spreadsheet → run prompts → delete session.

mod client;

pub use client::{ApiError, TableClient};
