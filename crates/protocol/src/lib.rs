//! Tabletalk Query Service Protocol — v1 Wire Format
//!
//! Canonical request/response types for the client ↔ query-service exchange.
//! The wire format is plain JSON over HTTP against three endpoints:
//!
//! | Call           | Method + path          | Success body        |
//! |----------------|------------------------|---------------------|
//! | Ingest file    | POST `/upload`         | [`UploadResponse`]  |
//! | Run query      | POST `/query`          | [`QueryResult`]     |
//! | Delete session | DELETE `/session/{id}` | any 2xx, ignored    |
//!
//! Every endpoint reports handled failures in-band via an `{"error": "..."}`
//! field in the body; [`Reply`] models that envelope. Row objects keep the
//! column order the server sent them in (serde_json `preserve_order`), and
//! cell values may be JSON null.

use serde::{Deserialize, Serialize};

/// A single result row: column name → scalar value, order-preserving.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Default service origin when nothing is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

// =============================================================================
// Requests
// =============================================================================

/// Body of POST `/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
    pub session_id: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Success body of POST `/upload`.
///
/// `session_id` is an opaque server-side handle for the table created from
/// the uploaded file; `table_name` is a display label derived from the file
/// name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Success body of POST `/query`: the generated SQL plus its result set.
///
/// `data` is empty (and `message` set) for statements that return no rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub sql: String,
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResult {
    /// Column names of the result set, taken from the first row.
    pub fn columns(&self) -> Vec<&str> {
        self.data
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// Error envelope
// =============================================================================

/// Deserialization envelope: the service signals domain errors with an
/// `error` field inside an otherwise 2xx JSON body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Error { error: String },
    Ok(T),
}

impl<T> Reply<T> {
    /// Collapse the envelope into a `Result` over the domain error text.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Error { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_roundtrip() {
        let json = r#"{"session_id":"abc123","message":"File sales.xlsx uploaded successfully","table_name":"sales"}"#;
        let parsed: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.session_id, "abc123");
        assert_eq!(parsed.table_name, "sales");
        assert_eq!(
            parsed.message.as_deref(),
            Some("File sales.xlsx uploaded successfully"),
        );
    }

    #[test]
    fn query_result_preserves_column_order() {
        let json = r#"{"sql":"SELECT product, revenue FROM sales","data":[{"product":"A","revenue":100},{"product":"B","revenue":null}]}"#;
        let parsed: QueryResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.columns(), vec!["product", "revenue"]);
        assert_eq!(parsed.data.len(), 2);
        assert!(parsed.data[1]["revenue"].is_null());
        assert!(parsed.message.is_none());
    }

    #[test]
    fn query_result_without_data_field() {
        // Non-SELECT statements come back as {sql, message} with no data array.
        let json = r#"{"sql":"UPDATE sales SET x = 1","message":"3 rows affected."}"#;
        let parsed: QueryResult = serde_json::from_str(json).unwrap();
        assert!(parsed.data.is_empty());
        assert_eq!(parsed.message.as_deref(), Some("3 rows affected."));
    }

    #[test]
    fn reply_envelope_picks_error_field() {
        let json = r#"{"error":"Invalid session. Please upload a file first."}"#;
        let reply: Reply<QueryResult> = serde_json::from_str(json).unwrap();
        assert_eq!(
            reply.into_result().unwrap_err(),
            "Invalid session. Please upload a file first.",
        );
    }

    #[test]
    fn reply_envelope_passes_success_through() {
        let json = r#"{"sql":"SELECT 1","data":[]}"#;
        let reply: Reply<QueryResult> = serde_json::from_str(json).unwrap();
        let result = reply.into_result().unwrap();
        assert_eq!(result.sql, "SELECT 1");
    }

    #[test]
    fn query_request_wire_shape() {
        let req = QueryRequest {
            prompt: "Show top 5 products by revenue".into(),
            session_id: "abc123".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["prompt"].as_str(), Some("Show top 5 products by revenue"));
        assert_eq!(json["session_id"].as_str(), Some("abc123"));
    }
}
