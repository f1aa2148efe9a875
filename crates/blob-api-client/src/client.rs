//! Conditional blob fetching over HTTP
//!
//! One `reqwest::Client` is built per `BlobClient` and reused across
//! requests. Every request carries bearer authentication; revalidation uses
//! the `If-None-Match`/`ETag` pair.

use crate::error::{BlobClientError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Applied to every remote request; the upstream API sets no bound itself.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a single blob fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobFetch {
    /// The server returned a new value for the blob.
    Changed { value: Vec<u8>, validator: String },
    /// The value matching the sent validator is still current.
    Unchanged,
    /// The blob does not exist (or was deleted).
    Missing,
}

/// HTTP client for the remote configuration-blob API
pub struct BlobClient {
    client: Client,
    endpoint: String,
    secret: String,
}

impl BlobClient {
    /// Create a new blob client for the given API endpoint and credential.
    pub fn new(endpoint: &str, secret: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
        })
    }

    /// Fetch a blob by key, optionally revalidating against a known validator.
    ///
    /// A `304 Not Modified` is only a valid answer to a conditional request;
    /// receiving one without having sent a validator is a protocol error.
    pub async fn fetch(&self, key: &str, validator: Option<&str>) -> Result<BlobFetch> {
        let url = format!("{}/{}", self.endpoint, key);
        debug!(key, url = %url, conditional = validator.is_some(), "Fetching blob");

        let mut request = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret));
        if let Some(validator) = validator {
            request = request.header("If-None-Match", validator);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                if validator.is_none() {
                    return Err(BlobClientError::UnexpectedNotModified);
                }
                Ok(BlobFetch::Unchanged)
            }
            StatusCode::NOT_FOUND => Ok(BlobFetch::Missing),
            StatusCode::OK => {
                let new_validator = response
                    .headers()
                    .get("etag")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let value = response.bytes().await?.to_vec();

                debug!(
                    key,
                    size = value.len(),
                    validator = %new_validator,
                    "Fetched blob"
                );
                Ok(BlobFetch::Changed {
                    value,
                    validator: new_validator,
                })
            }
            status => Err(BlobClientError::UnexpectedStatus(status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use std::sync::{Arc, Mutex};

    /// Headers seen by the stub remote, captured for assertions.
    #[derive(Default)]
    struct Seen {
        authorization: Option<String>,
        if_none_match: Option<String>,
    }

    type SharedSeen = Arc<Mutex<Seen>>;

    async fn blob_handler(State(seen): State<SharedSeen>, headers: HeaderMap) -> Response {
        let mut seen = seen.lock().unwrap();
        seen.authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        seen.if_none_match = headers
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if seen.if_none_match.as_deref() == Some("\"rev-1\"") {
            return StatusCode::NOT_MODIFIED.into_response();
        }
        ([("etag", "\"rev-1\"")], "hello").into_response()
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_new_blob() {
        let seen: SharedSeen = Arc::default();
        let router = Router::new()
            .route("/{key}", get(blob_handler))
            .with_state(seen.clone());
        let endpoint = spawn_stub(router).await;

        let client = BlobClient::new(&endpoint, "s3cret").unwrap();
        let fetch = client.fetch("settings", None).await.unwrap();

        assert_eq!(
            fetch,
            BlobFetch::Changed {
                value: b"hello".to_vec(),
                validator: "\"rev-1\"".to_string(),
            }
        );
        let seen = seen.lock().unwrap();
        assert_eq!(seen.authorization.as_deref(), Some("Bearer s3cret"));
        assert_eq!(seen.if_none_match, None);
    }

    #[tokio::test]
    async fn test_fetch_unchanged_with_validator() {
        let seen: SharedSeen = Arc::default();
        let router = Router::new()
            .route("/{key}", get(blob_handler))
            .with_state(seen.clone());
        let endpoint = spawn_stub(router).await;

        let client = BlobClient::new(&endpoint, "s3cret").unwrap();
        let fetch = client.fetch("settings", Some("\"rev-1\"")).await.unwrap();

        assert_eq!(fetch, BlobFetch::Unchanged);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.if_none_match.as_deref(), Some("\"rev-1\""));
    }

    #[tokio::test]
    async fn test_not_modified_without_validator_is_protocol_error() {
        let router = Router::new().route(
            "/{key}",
            get(|| async { StatusCode::NOT_MODIFIED.into_response() }),
        );
        let endpoint = spawn_stub(router).await;

        let client = BlobClient::new(&endpoint, "s3cret").unwrap();
        let err = client.fetch("settings", None).await.unwrap_err();

        assert!(matches!(err, BlobClientError::UnexpectedNotModified));
    }

    #[tokio::test]
    async fn test_fetch_missing_blob() {
        let router = Router::new().route(
            "/{key}",
            get(|| async { StatusCode::NOT_FOUND.into_response() }),
        );
        let endpoint = spawn_stub(router).await;

        let client = BlobClient::new(&endpoint, "s3cret").unwrap();
        let fetch = client.fetch("gone", None).await.unwrap();

        assert_eq!(fetch, BlobFetch::Missing);
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let router = Router::new().route(
            "/{key}",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE.into_response() }),
        );
        let endpoint = spawn_stub(router).await;

        let client = BlobClient::new(&endpoint, "s3cret").unwrap();
        let err = client.fetch("settings", None).await.unwrap_err();

        assert!(matches!(err, BlobClientError::UnexpectedStatus(503)));
    }

    #[tokio::test]
    async fn test_connection_error() {
        // Nothing is listening on this port.
        let client = BlobClient::new("http://127.0.0.1:1", "s3cret").unwrap();
        let err = client.fetch("settings", None).await.unwrap_err();

        assert!(matches!(err, BlobClientError::Http(_)));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = BlobClient::new("http://example.test/", "s3cret").unwrap();
        assert_eq!(client.endpoint, "http://example.test");
    }

    #[tokio::test]
    async fn test_missing_etag_yields_empty_validator() {
        let router = Router::new().route("/{key}", get(|| async { "no-etag-here" }));
        let endpoint = spawn_stub(router).await;

        let client = BlobClient::new(&endpoint, "s3cret").unwrap();
        let fetch = client.fetch("settings", None).await.unwrap();

        assert_eq!(
            fetch,
            BlobFetch::Changed {
                value: b"no-etag-here".to_vec(),
                validator: String::new(),
            }
        );
    }
}
