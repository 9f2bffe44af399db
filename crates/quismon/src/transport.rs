//! HTTP transport abstraction.
//!
//! The [`Transport`] trait separates request construction (done by
//! [`Client`](crate::Client)) from I/O. [`UreqTransport`] is the production
//! implementation; [`MockTransport`] records requests and replays canned
//! responses for tests.
//!
//! ```
//! use quismon::transport::{MockTransport, Response};
//! use quismon::Client;
//! use std::sync::Arc;
//!
//! let mock = Arc::new(MockTransport::new());
//! mock.push_json(200, r#"{"data": []}"#);
//!
//! let client = Client::with_transport("https://api.quismon.com", "key", mock.clone()).unwrap();
//! let checks = client.list_checks().unwrap();
//! assert!(checks.is_empty());
//! assert_eq!(mock.requests()[0].url, "https://api.quismon.com/v1/checks");
//! ```

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fixed timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Look up a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON, for assertions in tests.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Raw response: status and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends requests and returns raw responses.
///
/// Implementations must not treat HTTP error statuses as failures; only
/// failures to obtain a response at all are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response>;
}

/// Production transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport with the fixed request timeout.
    #[must_use]
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let body = request.body.as_deref().unwrap_or(&[]);
        let mut response = match request.method {
            Method::Get => with_headers(self.agent.get(&request.url), &request.headers).call()?,
            Method::Delete => {
                with_headers(self.agent.delete(&request.url), &request.headers).call()?
            }
            Method::Post => {
                with_headers(self.agent.post(&request.url), &request.headers).send(body)?
            }
            Method::Put => with_headers(self.agent.put(&request.url), &request.headers).send(body)?,
        };

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec()?;
        Ok(Response { status, body })
    }
}

/// Mock transport for testing without network access.
///
/// Responses are replayed in FIFO order. When the queue is empty a `500`
/// is returned so a missing expectation shows up as an API error.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<Response>>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push(&self, response: Response) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a response with a JSON body.
    pub fn push_json(&self, status: u16, body: &str) {
        self.push(Response::new(status, body.as_bytes().to_vec()));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Transport(message.to_string())));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of responses still queued.
    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::new(500, b"no mock response queued".to_vec())))
    }
}
