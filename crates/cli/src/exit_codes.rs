//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain        | Description                              |
//! |---------|---------------|------------------------------------------|
//! | 0       | Universal     | Success                                  |
//! | 1       | Universal     | General error (unspecified)              |
//! | 2       | Universal     | CLI usage error (bad args, missing file) |
//! | 20-29   | query service | Upload/query/session codes               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options, bad file extension.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Query service (20-29)
// =============================================================================

/// Cannot reach the query service (connection refused, timeout, bad gateway).
pub const EXIT_API_NETWORK: u8 = 20;

/// The service responded but reported an error (upload rejected, bad SQL).
pub const EXIT_API_SERVER: u8 = 21;

/// No active session — upload a spreadsheet first.
pub const EXIT_NO_SESSION: u8 = 22;

use tabletalk_api_client::ApiError;

/// Map an API error to its exit code.
pub fn api_exit_code(err: &ApiError) -> u8 {
    match err {
        ApiError::Server(_) => EXIT_API_SERVER,
        ApiError::Network(_) | ApiError::Http(_, _) | ApiError::Parse(_) => EXIT_API_NETWORK,
        ApiError::Io(_) => EXIT_ERROR,
    }
}
