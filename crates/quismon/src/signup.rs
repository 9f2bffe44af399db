//! Quick signup: creates an organization and returns its first API key.

use crate::client::Client;
use crate::error::Result;
use crate::transport::Method;
use crate::types::{QuickSignupRequest, QuickSignupResponse};

const QUICK_SIGNUP_PATH: &str = "/v1/auth/quick-signup";

impl Client {
    /// Never sends an `Authorization` header, even when the client has a key.
    pub fn quick_signup(&self, request: &QuickSignupRequest) -> Result<QuickSignupResponse> {
        self.call_unauthenticated(Method::Post, QUICK_SIGNUP_PATH, Some(request))
    }
}
