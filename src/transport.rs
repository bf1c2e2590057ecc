//! Pluggable HTTP transport.
//!
//! The token and catalogue clients only ever talk to the network through
//! [`Transport`], so tests swap in a fake that records requests and replays
//! canned responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one round trip. No retries.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Sends `request`, giving up as soon as `cancel` fires.
///
/// An already-cancelled token short-circuits without touching the transport.
pub async fn send_cancellable(
    transport: &dyn Transport,
    request: HttpRequest,
    cancel: &CancellationToken,
) -> Result<HttpResponse, TransportError> {
    if cancel.is_cancelled() {
        return Err(TransportError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportError::Cancelled),
        result = transport.send(request) => result,
    }
}

/// A cancellation token that fires after `timeout`.
///
/// Dropping the returned guard cancels the token too, which also stops the
/// timer task once the caller is done with the call.
pub fn deadline(timeout: Duration) -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => timer.cancel(),
            _ = timer.cancelled() => {}
        }
    });
    let guard = token.clone().drop_guard();
    (token, guard)
}

/// [`deadline`] when a timeout is given, otherwise a token nobody cancels.
pub fn optional_deadline(timeout: Option<Duration>) -> (CancellationToken, Option<DropGuard>) {
    match timeout {
        Some(timeout) => {
            let (token, guard) = deadline(timeout);
            (token, Some(guard))
        }
        None => (CancellationToken::new(), None),
    }
}
