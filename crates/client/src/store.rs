//! Session persistence — shared across one-shot CLI invocations.
//!
//! Reads/writes ~/.config/tabletalk/session.json (0600 on Unix) so that
//! `ttalk upload` followed by `ttalk ask` in a new process talks to the
//! same server-side session. Removed on reset.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tabletalk_protocol::QueryResult;

/// The locally persisted view of a server-side session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Opaque server-side session handle
    pub session_id: String,
    /// Display name of the table built from the upload
    pub table_name: String,
    /// Service origin the session lives on
    pub api_base: String,
    /// When the upload happened (RFC 3339)
    pub created_at: String,
    /// The auto-summary fetched after upload, if it succeeded
    #[serde(default)]
    pub summary: Option<QueryResult>,
}

impl StoredSession {
    pub fn new(session_id: String, table_name: String, api_base: String) -> Self {
        Self {
            session_id,
            table_name,
            api_base,
            created_at: chrono::Utc::now().to_rfc3339(),
            summary: None,
        }
    }

    /// Returns the path to the session file.
    pub fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("tabletalk/session.json"))
    }

    /// Load the persisted session from disk.
    /// Returns None if nothing is saved or the file is invalid.
    pub fn load() -> Option<Self> {
        let path = Self::file_path()?;
        let contents = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Save the session to disk.
    /// Creates the parent directory if it doesn't exist.
    /// Sets 0600 permissions on Unix.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::file_path().ok_or("Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize session: {}", e))?;

        std::fs::write(&path, &contents)
            .map_err(|e| format!("Failed to write session file: {}", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)
                .map_err(|e| format!("Failed to set file permissions: {}", e))?;
        }

        Ok(())
    }

    /// Delete the persisted session.
    pub fn delete() -> Result<(), String> {
        let Some(path) = Self::file_path() else {
            return Ok(());
        };
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| format!("Failed to delete session file: {}", e))?;
        }
        Ok(())
    }
}
