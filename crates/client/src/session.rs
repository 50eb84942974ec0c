//! The session-bound query controller.
//!
//! One `QuerySession` holds at most one server-side session at a time.
//! Invariants:
//! - a query is only issued while a session exists;
//! - clearing the query never clears the session;
//! - resetting clears both (and deletes the server session, best-effort);
//! - a response whose captured generation no longer matches the current one
//!   is discarded without touching state.

use std::path::Path;
use std::time::{Duration, Instant};

use tabletalk_api_client::{ApiError, TableClient};
use tabletalk_protocol::{QueryResult, UploadResponse};

use crate::policy::{error_policy, ErrorPolicy, Operation};
use crate::rewrite::{prepare_prompt, SUMMARY_PROMPT};

/// Validation message for non-Excel file names.
pub const ERR_BAD_EXTENSION: &str = "Please upload an Excel file (.xlsx or .xls)";
/// Validation message for an empty prompt.
pub const ERR_EMPTY_PROMPT: &str = "Please enter a prompt before submitting.";
/// Validation message for submitting without a session.
pub const ERR_NO_SESSION: &str = "Please upload an Excel file first.";
/// Generic transport-failure message.
pub const ERR_CONNECT: &str = "Failed to connect to server";

/// How long the copy confirmation stays visible.
const TOOLTIP_DURATION: Duration = Duration::from_secs(2);

/// Client-side state for one upload → ask → reset lifecycle.
pub struct QuerySession {
    client: TableClient,

    prompt: String,
    session_id: Option<String>,
    table_name: Option<String>,
    result: Option<QueryResult>,
    summary: Option<QueryResult>,
    error: Option<String>,
    upload_message: Option<String>,

    uploading: bool,
    analyzing: bool,
    querying: bool,
    drag_active: bool,
    tooltip_until: Option<Instant>,

    /// Bumped on reset; responses carrying an older value are stale.
    generation: u64,
}

impl QuerySession {
    pub fn new(client: TableClient) -> Self {
        Self {
            client,
            prompt: String::new(),
            session_id: None,
            table_name: None,
            result: None,
            summary: None,
            error: None,
            upload_message: None,
            uploading: false,
            analyzing: false,
            querying: false,
            drag_active: false,
            tooltip_until: None,
            generation: 0,
        }
    }

    /// Resume an existing server-side session (e.g. from the session store).
    pub fn resume(client: TableClient, session_id: String, table_name: String) -> Self {
        let mut s = Self::new(client);
        s.session_id = Some(session_id);
        s.table_name = Some(table_name);
        s
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn client(&self) -> &TableClient {
        &self.client
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.prompt = text.into();
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn summary(&self) -> Option<&QueryResult> {
        self.summary.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn upload_message(&self) -> Option<&str> {
        self.upload_message.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.uploading || self.analyzing || self.querying
    }

    // ── Drag state ──────────────────────────────────────────────────

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    /// A file dropped onto the target: same path as a picked file.
    pub fn drop_file(&mut self, path: &Path) {
        self.drag_active = false;
        self.upload(path);
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Upload a spreadsheet and, on success, kick off the auto-summary.
    ///
    /// Rejects non-Excel file names before any network call.
    pub fn upload(&mut self, path: &Path) {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        if !is_excel_filename(&filename) {
            self.error = Some(ERR_BAD_EXTENSION.to_string());
            return;
        }

        self.error = None;
        self.upload_message = None;
        self.result = None;
        self.summary = None;
        self.uploading = true;

        let generation = self.generation;
        let outcome = self.client.upload(path);
        self.apply_upload(generation, &filename, outcome);
    }

    fn apply_upload(
        &mut self,
        generation: u64,
        filename: &str,
        outcome: Result<UploadResponse, ApiError>,
    ) {
        if generation != self.generation {
            log::debug!("discarding stale upload response for {}", filename);
            return;
        }
        self.uploading = false;
        match outcome {
            Ok(resp) => {
                self.upload_message =
                    Some(format!("File {} uploaded and converted to database", filename));
                self.session_id = Some(resp.session_id);
                self.table_name = Some(resp.table_name);
                self.analyze();
            }
            Err(e) => self.fail(Operation::Upload, e),
        }
    }

    // ── Analyze (auto-summary) ──────────────────────────────────────

    /// Fetch the data summary for the current session. Best-effort: failures
    /// are logged, never surfaced, and never block the rest of the flow.
    pub fn analyze(&mut self) {
        let Some(session_id) = self.session_id.clone() else {
            return;
        };
        self.analyzing = true;
        let generation = self.generation;
        let outcome = self.client.query(SUMMARY_PROMPT, &session_id);
        self.apply_summary(generation, outcome);
    }

    fn apply_summary(&mut self, generation: u64, outcome: Result<QueryResult, ApiError>) {
        if generation != self.generation {
            log::debug!("discarding stale summary response");
            return;
        }
        self.analyzing = false;
        match outcome {
            Ok(result) => self.summary = Some(result),
            Err(e) => self.fail(Operation::Analyze, e),
        }
    }

    // ── Submit query ────────────────────────────────────────────────

    /// Submit the current prompt against the current session.
    ///
    /// Validation failures (empty prompt, no session) set the error slot and
    /// make no network call.
    pub fn submit(&mut self) {
        let prompt = prepare_prompt(&self.prompt);
        if prompt.is_empty() {
            self.error = Some(ERR_EMPTY_PROMPT.to_string());
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            self.error = Some(ERR_NO_SESSION.to_string());
            return;
        };

        self.error = None;
        self.result = None;
        self.querying = true;

        let generation = self.generation;
        let outcome = self.client.query(&prompt, &session_id);
        self.apply_query(generation, outcome);
    }

    fn apply_query(&mut self, generation: u64, outcome: Result<QueryResult, ApiError>) {
        if generation != self.generation {
            log::debug!("discarding stale query response");
            return;
        }
        self.querying = false;
        match outcome {
            Ok(result) => self.result = Some(result),
            Err(e) => self.fail(Operation::Query, e),
        }
    }

    // ── Clear / Reset ───────────────────────────────────────────────

    /// Clear the current query. Session, table name, and summary stay so
    /// the user can keep asking about the same file. No network call.
    pub fn clear(&mut self) {
        self.prompt.clear();
        self.result = None;
        self.error = None;
    }

    /// Tear everything down: delete the server session (best-effort) and
    /// clear all local state. In-flight responses become stale.
    pub fn reset(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            if let Err(e) = self.client.delete_session(&session_id) {
                self.fail(Operation::DeleteSession, e);
            }
        }
        self.generation += 1;

        self.prompt.clear();
        self.result = None;
        self.error = None;
        self.upload_message = None;
        self.table_name = None;
        self.summary = None;
        self.uploading = false;
        self.analyzing = false;
        self.querying = false;
        self.tooltip_until = None;
    }

    // ── Copy SQL ────────────────────────────────────────────────────

    /// Return the current result's SQL for the clipboard and arm the
    /// transient confirmation indicator. None when there is no result.
    pub fn copy_sql(&mut self, now: Instant) -> Option<String> {
        let sql = self.result.as_ref().map(|r| r.sql.clone())?;
        self.tooltip_until = Some(now + TOOLTIP_DURATION);
        Some(sql)
    }

    /// Whether the copy confirmation is still showing at `now`.
    pub fn tooltip_visible(&self, now: Instant) -> bool {
        self.tooltip_until.map(|until| now < until).unwrap_or(false)
    }

    // ── Failure handling ────────────────────────────────────────────

    fn fail(&mut self, op: Operation, err: ApiError) {
        match error_policy(op) {
            ErrorPolicy::Surface => {
                let msg = match err {
                    // Server-reported errors are shown verbatim.
                    ApiError::Server(m) => m,
                    // Reading the local file never reached the network.
                    ApiError::Io(m) => format!("I/O error: {}", m),
                    // Everything transport-shaped collapses to one message.
                    ApiError::Network(_) | ApiError::Http(_, _) | ApiError::Parse(_) => {
                        ERR_CONNECT.to_string()
                    }
                };
                self.error = Some(msg);
            }
            ErrorPolicy::LogOnly => {
                log::warn!("{:?} failed (best-effort, not surfaced): {}", op, err);
            }
        }
    }
}

/// File-name gate for the upload. Advisory only — the backend is the
/// authority on actual content validation.
pub fn is_excel_filename(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}
