//! `/v1/checks` endpoints.

use crate::client::{Client, not_found};
use crate::error::{Error, Result};
use crate::transport::Method;
use crate::types::{Check, CreateCheckRequest, UpdateCheckRequest};
use log::debug;

const CHECKS_PATH: &str = "/v1/checks";

fn check_path(id: &str) -> String {
    format!("{CHECKS_PATH}/{id}")
}

impl Client {
    pub fn list_checks(&self) -> Result<Vec<Check>> {
        self.call(Method::Get, CHECKS_PATH, None::<&()>)
    }

    /// Fails with [`Error::NotFound`] when the check no longer exists.
    pub fn get_check(&self, id: &str) -> Result<Check> {
        self.call(Method::Get, &check_path(id), None::<&()>)
            .map_err(not_found("check", id))
    }

    /// Linear scan of the full listing for an exact name match.
    pub fn get_check_by_name(&self, name: &str) -> Result<Check> {
        let checks = self.list_checks()?;
        debug!("searching {} checks for {name:?}", checks.len());
        checks
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::NotFound {
                kind: "check",
                id: name.to_string(),
            })
    }

    pub fn create_check(&self, request: &CreateCheckRequest) -> Result<Check> {
        self.call(Method::Post, CHECKS_PATH, Some(request))
    }

    /// Full replacement (PUT).
    pub fn update_check(&self, id: &str, request: &UpdateCheckRequest) -> Result<Check> {
        self.call(Method::Put, &check_path(id), Some(request))
            .map_err(not_found("check", id))
    }

    pub fn delete_check(&self, id: &str) -> Result<()> {
        self.do_request(Method::Delete, &check_path(id), None::<&()>)
            .map(|_| ())
            .map_err(not_found("check", id))
    }
}
