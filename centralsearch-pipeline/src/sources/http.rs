//! HTTP plumbing shared by the source connectors.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::errors::SourceError;
use centralsearch_shared::Record;

/// Default timeout for a single source request.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// A credentialed JSON-over-HTTP client bound to one source endpoint.
///
/// Basic-auth credentials embedded in the endpoint URL are moved into an
/// `Authorization` header so they never show up in logged URLs.
#[derive(Debug, Clone)]
pub struct SourceHttpClient {
    client: Client,
    endpoint: Url,
    credentials: Option<(String, Option<String>)>,
}

impl SourceHttpClient {
    /// Create a client for `endpoint` with the given request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SourceError> {
        let mut endpoint =
            Url::parse(endpoint).map_err(|e| SourceError::invalid_url(e.to_string()))?;

        let credentials = if endpoint.username().is_empty() {
            None
        } else {
            let username = endpoint.username().to_string();
            let password = endpoint.password().map(str::to_string);
            endpoint
                .set_username("")
                .and_then(|_| endpoint.set_password(None))
                .map_err(|_| SourceError::invalid_url("URL cannot carry credentials"))?;
            Some((username, password))
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    /// The endpoint URL without credentials.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The endpoint with `segment` appended as a final path segment.
    pub fn endpoint_with_segment(&self, segment: &str) -> Result<Url, SourceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::invalid_url("endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Issue a GET request and decode the JSON body.
    ///
    /// Non-success statuses become [`SourceError::Status`] carrying the body,
    /// so callers can tell transient server errors from bad requests.
    pub async fn get_json(&self, url: Url, params: &[(&str, String)]) -> Result<Value, SourceError> {
        let mut request = self.client.get(url.clone()).query(params);
        if let Some((ref username, ref password)) = self.credentials {
            request = request.basic_auth(username, password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(url = %url, status = %status, "Source request succeeded");
        Ok(response.json::<Value>().await?)
    }
}

/// Follow `path` through nested JSON objects.
pub(crate) fn lookup<'v>(body: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(body, |value, key| value.get(*key))
}

/// Read a non-negative hit count at `path`.
pub(crate) fn hit_count(body: &Value, path: &[&str]) -> Result<u64, SourceError> {
    lookup(body, path)
        .and_then(Value::as_u64)
        .ok_or_else(|| SourceError::parse(format!("missing hit count at '{}'", path.join("."))))
}

/// Read the list of records at `path`. Every entry must be a JSON object.
pub(crate) fn record_list(body: &Value, path: &[&str]) -> Result<Vec<Record>, SourceError> {
    let items = lookup(body, path)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::parse(format!("missing record list at '{}'", path.join("."))))?;

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map.clone()),
            other => Err(SourceError::parse(format!(
                "expected a record object, found {}",
                other
            ))),
        })
        .collect()
}

/// Loopback HTTP server answering each connection with the next canned
/// `(status, body)` pair. Returns a base URL carrying `reader:secret`
/// credentials and the request heads received so far.
#[cfg(test)]
pub(crate) async fn serve_canned(
    responses: Vec<(u16, &'static str)>,
) -> (String, std::sync::Arc<std::sync::Mutex<Vec<String>>>) {
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            seen.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://reader:secret@{}/solr/core", addr), requests)
}
