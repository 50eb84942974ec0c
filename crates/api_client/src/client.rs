//! Query-service HTTP client.
//!
//! Blocking reqwest client. One method per endpoint; every response body is
//! decoded through the [`Reply`] envelope so a server-reported `error` field
//! surfaces as [`ApiError::Server`] rather than a parse failure.

use std::path::Path;
use std::time::Duration;

use tabletalk_protocol::{QueryRequest, QueryResult, Reply, UploadResponse};

/// Query-service API client (blocking).
#[derive(Clone)]
pub struct TableClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

/// Error type for query-service operations.
///
/// `Server` is a domain error (the backend responded but reported a problem
/// in-band); `Network` is a transport error (the exchange never completed).
/// The two are surfaced to users identically, but callers that apply
/// per-operation policy need the distinction.
#[derive(Debug)]
pub enum ApiError {
    /// Server responded with an `{error}` envelope
    Server(String),
    /// Network error
    Network(String),
    /// HTTP error status without an error envelope
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// File I/O error reading the upload
    Io(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Server(msg) => write!(f, "{}", msg),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ApiError::Parse(msg) => write!(f, "Unexpected response: {}", msg),
            ApiError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// True when the backend itself reported the failure (domain error),
    /// as opposed to the exchange failing in transit.
    pub fn is_server_reported(&self) -> bool {
        matches!(self, ApiError::Server(_))
    }
}

impl TableClient {
    /// Create a new client against the given service origin.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_timeout(api_base, Duration::from_secs(60))
    }

    /// Create a new client with an explicit request timeout.
    pub fn with_timeout(api_base: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("ttalk/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// The service origin this client talks to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Ingest a spreadsheet: POST `/upload` as multipart form data.
    ///
    /// Returns the session id and table name the server created for it.
    pub fn upload(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        let bytes = std::fs::read(path).map_err(|e| ApiError::Io(e.to_string()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("data.xlsx")
            .to_string();
        self.upload_bytes(bytes, filename)
    }

    /// Ingest in-memory spreadsheet bytes under the given filename.
    pub fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        filename: String,
    ) -> Result<UploadResponse, ApiError> {
        let url = format!("{}/upload", self.api_base);
        let part = reqwest::blocking::multipart::Part::bytes(bytes).file_name(filename);
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode(response)
    }

    /// Run a prompt: POST `/query` with `{prompt, session_id}`.
    pub fn query(&self, prompt: &str, session_id: &str) -> Result<QueryResult, ApiError> {
        let url = format!("{}/query", self.api_base);
        let body = QueryRequest {
            prompt: prompt.to_string(),
            session_id: session_id.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode(response)
    }

    /// Drop the server-side session: DELETE `/session/{id}`.
    ///
    /// Any 2xx is success and the body is ignored. A 404 counts as success
    /// too — the session is already gone, which is what the caller wanted.
    pub fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/session/{}", self.api_base, session_id);
        let response = self
            .http
            .delete(&url)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if response.status().is_success() || status == 404 {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(ApiError::Http(status, body))
    }
}

/// Decode a response body through the error envelope.
///
/// The service reports domain errors inside 2xx *and* non-2xx bodies alike,
/// so the envelope is checked before the status code.
fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let ok = response.status().is_success();
    let body = response
        .text()
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if let Ok(reply) = serde_json::from_str::<Reply<T>>(&body) {
        return reply.into_result().map_err(ApiError::Server);
    }
    if !ok {
        return Err(ApiError::Http(status, body));
    }
    log::debug!("undecodable {} response body: {}", status, truncate(&body, 200));
    Err(ApiError::Parse(format!("cannot decode body: {}", truncate(&body, 200))))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_upload_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload")
                .header_exists("content-type");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "session_id": "abc123",
                    "message": "File sales.xlsx uploaded successfully",
                    "table_name": "sales"
                }));
        });

        let client = TableClient::new(server.base_url());
        let resp = client
            .upload_bytes(b"PK\x03\x04fake".to_vec(), "sales.xlsx".into())
            .unwrap();

        mock.assert();
        assert_eq!(resp.session_id, "abc123");
        assert_eq!(resp.table_name, "sales");
    }

    #[test]
    fn test_upload_error_envelope() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(500)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "error": "Upload failed: not a spreadsheet"
                }));
        });

        let client = TableClient::new(server.base_url());
        let err = client
            .upload_bytes(b"garbage".to_vec(), "sales.xlsx".into())
            .unwrap_err();

        assert!(err.is_server_reported());
        assert_eq!(err.to_string(), "Upload failed: not a spreadsheet");
    }

    #[test]
    fn test_query_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body(serde_json::json!({
                    "prompt": "Show top 5 products by revenue",
                    "session_id": "abc123"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "sql": "SELECT product, revenue FROM sales ORDER BY revenue DESC LIMIT 5",
                    "data": [
                        {"product": "A", "revenue": 100},
                        {"product": "B", "revenue": 90}
                    ]
                }));
        });

        let client = TableClient::new(server.base_url());
        let result = client
            .query("Show top 5 products by revenue", "abc123")
            .unwrap();

        mock.assert();
        assert!(result.sql.starts_with("SELECT"));
        assert_eq!(result.columns(), vec!["product", "revenue"]);
        assert_eq!(result.data.len(), 2);
    }

    #[test]
    fn test_query_domain_error_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/query");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "error": "ambiguous column" }));
        });

        let client = TableClient::new(server.base_url());
        let err = client.query("count things", "abc123").unwrap_err();

        assert!(err.is_server_reported());
        assert_eq!(err.to_string(), "ambiguous column");
    }

    #[test]
    fn test_query_network_error() {
        // Nothing listens on this port; connection is refused.
        let client =
            TableClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2));
        let err = client.query("anything", "abc123").unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got: {:?}", err);
        assert!(!err.is_server_reported());
    }

    #[test]
    fn test_query_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/query");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>gateway</html>");
        });

        let client = TableClient::new(server.base_url());
        let err = client.query("anything", "abc123").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)), "got: {:?}", err);
    }

    #[test]
    fn test_delete_session_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/session/abc123");
            then.status(200)
                .json_body(serde_json::json!({ "message": "Session deleted successfully" }));
        });

        let client = TableClient::new(server.base_url());
        client.delete_session("abc123").unwrap();
        mock.assert();
    }

    #[test]
    fn test_delete_session_missing_is_ok() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/session/ghost");
            then.status(404)
                .json_body(serde_json::json!({ "error": "Session not found" }));
        });

        let client = TableClient::new(server.base_url());
        assert!(client.delete_session("ghost").is_ok());
    }

    #[test]
    fn test_delete_session_server_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/session/abc123");
            then.status(503).body("unavailable");
        });

        let client = TableClient::new(server.base_url());
        let err = client.delete_session("abc123").unwrap_err();
        assert!(matches!(err, ApiError::Http(503, _)), "got: {:?}", err);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = TableClient::new("http://localhost:8000/");
        assert_eq!(client.api_base(), "http://localhost:8000");
    }

    #[test]
    fn test_upload_missing_file() {
        let client = TableClient::new("http://localhost:8000");
        let err = client
            .upload(Path::new("/nonexistent/sales.xlsx"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)), "got: {:?}", err);
    }
}
