//! Authenticated API client.
//!
//! Every call goes through [`Client::do_request`], which assembles headers,
//! serializes the body and turns HTTP error statuses into [`Error::Api`].
//! Successful responses are wrapped in a `{data, error, meta}` envelope that
//! [`unwrap_envelope`] strips.

use crate::error::{Error, Result};
use crate::transport::{Method, Request, Transport, UreqTransport};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.quismon.com";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("quismon-iac/", env!("CARGO_PKG_VERSION"));

const BEARER_PREFIX: &str = "Bearer ";

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// Quismon API client.
///
/// Cheap to clone; the transport is shared. A client may be built with an
/// empty API key, in which case no `Authorization` header is sent (the
/// signup endpoint needs nothing else).
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client that talks to the network.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_transport(base_url, api_key, Arc::new(UreqTransport::new()))
    }

    /// Create a client with a custom transport (for testing).
    pub fn with_transport(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::MissingBaseUrl);
        }
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.into().trim().to_string(),
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// `Authorization` header value, never double-prefixed.
    fn authorization(&self) -> Option<String> {
        if self.api_key.is_empty() {
            None
        } else if self.api_key.starts_with(BEARER_PREFIX) {
            Some(self.api_key.clone())
        } else {
            Some(format!("{BEARER_PREFIX}{}", self.api_key))
        }
    }

    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<Request> {
        let body = body
            .map(|b| serde_json::to_vec(b).map_err(|e| Error::Encode(e.to_string())))
            .transpose()?;

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if authenticated && let Some(auth) = self.authorization() {
            headers.push(("Authorization".to_string(), auth));
        }

        Ok(Request {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        })
    }

    fn execute(&self, request: &Request, path: &str) -> Result<(u16, Vec<u8>)> {
        let response = self.transport.send(request)?;
        debug!("{} {} -> {}", request.method, path, response.status);

        if response.status >= 400 {
            return Err(Error::Api {
                status: response.status,
                message: error_message(&response.body),
            });
        }
        Ok((response.status, response.body))
    }

    /// Send a request and return the raw response body.
    ///
    /// Fails with [`Error::Api`] for any status >= 400. The message is the
    /// envelope's `error` field when the body parses, the raw body otherwise.
    pub fn do_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>> {
        let request = self.build_request(method, path, body, true)?;
        self.execute(&request, path).map(|(_, body)| body)
    }

    /// Send a request and decode the envelope's `data` into `T`.
    pub(crate) fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let request = self.build_request(method, path, body, true)?;
        let (status, body) = self.execute(&request, path)?;
        unwrap_envelope(status, &body)
    }

    /// Like [`Client::call`] but without the `Authorization` header.
    pub(crate) fn call_unauthenticated<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let request = self.build_request(method, path, body, false)?;
        let (status, body) = self.execute(&request, path)?;
        unwrap_envelope(status, &body)
    }
}

/// Decode an envelope and extract its `data` payload.
///
/// A non-empty `error` field is an [`Error::Api`] carrying `status`, even
/// though the HTTP status itself was successful.
pub fn unwrap_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    if let Some(message) = envelope.error.filter(|e| !e.is_empty()) {
        return Err(Error::Api { status, message });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Envelope>(body) {
        Ok(Envelope {
            error: Some(message),
            ..
        }) if !message.is_empty() => message,
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}

/// Map a 404 from a get-by-id endpoint to [`Error::NotFound`].
pub(crate) fn not_found(kind: &'static str, id: &str) -> impl FnOnce(Error) -> Error {
    let id = id.to_string();
    move |err| match err {
        Error::Api { status: 404, .. } => Error::NotFound { kind, id },
        other => other,
    }
}
