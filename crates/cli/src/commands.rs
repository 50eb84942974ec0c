//! One-shot subcommand implementations.
//!
//! Each command builds a [`TableClient`] from settings (plus the
//! `--api-base` override), resumes the stored session where one is
//! needed, performs a single round-trip, and prints the result. Session
//! state between invocations lives in the session file written by
//! [`StoredSession`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use tabletalk_api_client::{ApiError, TableClient};
use tabletalk_client::{
    is_excel_filename, mentions_ordering, prepare_prompt, StoredSession, ERR_BAD_EXTENSION,
    ERR_CONNECT, ERR_EMPTY_PROMPT, ERR_NO_SESSION, SUMMARY_PROMPT,
};
use tabletalk_config::Settings;

use crate::exit_codes::{api_exit_code, EXIT_ERROR, EXIT_NO_SESSION};
use crate::{clipboard, render, CliError};

/// Build the HTTP client from settings, honoring the CLI override.
pub fn build_client(api_base_override: Option<String>) -> TableClient {
    let settings = Settings::load();
    let api_base = api_base_override.unwrap_or_else(|| settings.effective_api_base());
    TableClient::with_timeout(api_base, Duration::from_secs(settings.timeout_secs))
}

/// Translate an API failure into a CLI error with the right exit code.
fn api_error(err: ApiError) -> CliError {
    let code = api_exit_code(&err);
    match err {
        ApiError::Server(message) => CliError::with_code(code, message),
        ApiError::Io(message) => CliError::with_code(code, format!("I/O error: {}", message)),
        other => {
            log::debug!("transport failure: {}", other);
            CliError::with_code(code, ERR_CONNECT)
                .with_hint("is the query service running? check `ttalk status` and your api_base")
        }
    }
}

/// Load the stored session or fail with the no-session exit code.
fn require_session() -> Result<StoredSession, CliError> {
    StoredSession::load().ok_or_else(|| {
        CliError::with_code(EXIT_NO_SESSION, ERR_NO_SESSION)
            .with_hint("run `ttalk upload <file>` to start a session")
    })
}

pub fn cmd_upload(api_base: Option<String>, file: PathBuf, json: bool) -> Result<(), CliError> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::usage(format!("invalid file name: {}", file.display())))?
        .to_string();
    if !is_excel_filename(&filename) {
        return Err(CliError::usage(ERR_BAD_EXTENSION)
            .with_hint(format!("got {:?}; expected a .xlsx or .xls file", filename)));
    }

    let client = build_client(api_base);
    let response = client.upload(Path::new(&file)).map_err(api_error)?;

    let mut stored = StoredSession::new(
        response.session_id.clone(),
        response.table_name.clone(),
        client.api_base().to_string(),
    );

    // Summarize the new table right away; the summary is advisory, so a
    // failure here must not fail the upload.
    match client.query(SUMMARY_PROMPT, &response.session_id) {
        Ok(summary) => stored.summary = Some(summary),
        Err(e) => log::warn!("summary query failed: {}", e),
    }
    if let Err(e) = stored.save() {
        log::warn!("could not persist session: {}", e);
    }

    if json {
        let body = serde_json::to_string_pretty(&response)
            .map_err(|e| CliError::with_code(EXIT_ERROR, e.to_string()))?;
        println!("{}", body);
    } else {
        let message = response
            .message
            .unwrap_or_else(|| format!("File {} uploaded and converted to database", filename));
        println!("{}", message);
        println!("session: {}", response.session_id);
        println!("table:   {}", response.table_name);
        if let Some(summary) = &stored.summary {
            println!();
            print!("{}", render::render_summary(summary));
        }
    }
    Ok(())
}

pub fn cmd_ask(
    api_base: Option<String>,
    prompt: String,
    json: bool,
    copy: bool,
) -> Result<(), CliError> {
    let prompt = prepare_prompt(&prompt);
    if prompt.is_empty() {
        return Err(CliError::usage(ERR_EMPTY_PROMPT));
    }
    let stored = require_session()?;
    let client = build_client(api_base);

    let result = client.query(&prompt, &stored.session_id).map_err(api_error)?;

    if json {
        let body = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::with_code(EXIT_ERROR, e.to_string()))?;
        println!("{}", body);
    } else {
        println!("{}", render::render_result(&result));
        if mentions_ordering(&prompt) {
            eprintln!("tip: ranking prompts work best with an explicit row limit, e.g. \"top 5\"");
        }
    }

    if copy {
        match clipboard::copy(&result.sql) {
            Ok(()) => eprintln!("SQL copied to clipboard"),
            Err(e) => log::warn!("clipboard copy failed: {}", e),
        }
    }
    Ok(())
}

pub fn cmd_summary(api_base: Option<String>, json: bool, refresh: bool) -> Result<(), CliError> {
    let mut stored = require_session()?;

    // The summary is cached from upload time; fetch it when the
    // upload-time query failed or a refresh is asked for.
    if refresh || stored.summary.is_none() {
        let client = build_client(api_base);
        let summary = client
            .query(SUMMARY_PROMPT, &stored.session_id)
            .map_err(api_error)?;
        stored.summary = Some(summary);
        if let Err(e) = stored.save() {
            log::warn!("could not persist session: {}", e);
        }
    }

    let summary = stored.summary.as_ref().ok_or_else(|| {
        CliError::with_code(EXIT_ERROR, "no summary available for this session")
    })?;
    if json {
        let body = serde_json::to_string_pretty(summary)
            .map_err(|e| CliError::with_code(EXIT_ERROR, e.to_string()))?;
        println!("{}", body);
    } else {
        println!("table: {}", stored.table_name);
        print!("{}", render::render_summary(summary));
    }
    Ok(())
}

pub fn cmd_status(json: bool) -> Result<(), CliError> {
    let stored = require_session()?;
    if json {
        let body = serde_json::to_string_pretty(&stored)
            .map_err(|e| CliError::with_code(EXIT_ERROR, e.to_string()))?;
        println!("{}", body);
    } else {
        println!("session:  {}", stored.session_id);
        println!("table:    {}", stored.table_name);
        println!("api_base: {}", stored.api_base);
        println!("created:  {}", stored.created_at);
    }
    Ok(())
}

pub fn cmd_reset(api_base: Option<String>) -> Result<(), CliError> {
    let Some(stored) = StoredSession::load() else {
        println!("no active session");
        return Ok(());
    };

    // Cleanup is best effort; the server expires abandoned sessions on
    // its own, so a failed DELETE only gets logged.
    let client = build_client(api_base);
    if let Err(e) = client.delete_session(&stored.session_id) {
        log::warn!("could not delete session {}: {}", stored.session_id, e);
    }
    StoredSession::delete().map_err(|e| CliError::with_code(EXIT_ERROR, e))?;
    println!("session cleared");
    Ok(())
}
