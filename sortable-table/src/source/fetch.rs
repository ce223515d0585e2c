//! Fetch primitive: URL in, decoded JSON out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::LoadError;
use crate::row::Row;

/// Loads a JSON document from a URL.
///
/// Implementations fail on transport errors, non-success statuses and
/// bodies that are not JSON.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_json(&self, url: &Url) -> Result<Value, LoadError>;
}

/// [`Fetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client (shared pool, custom TLS, proxies).
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, url: &Url) -> Result<Value, LoadError> {
        let mut request = self.client.get(url.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LoadError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| LoadError::parse_with_body(e.to_string(), body))
    }
}

/// Turn a response body into rows.
///
/// An array yields its items; an object yields its values in document
/// order. Every item must itself be an object.
pub fn decode_rows(value: Value) -> Result<Vec<Row>, LoadError> {
    let items: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_values().collect(),
        other => {
            return Err(LoadError::parse(format!(
                "expected an array or object of rows, got {}",
                kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            Row::try_from(item)
                .map_err(|v| LoadError::parse(format!("row {i} is {}, not an object", kind(&v))))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
