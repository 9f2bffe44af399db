//! `quismon_signup` - bootstrap an organization and its first API key
//!
//! The signup endpoint cannot be queried again, so read and update keep
//! whatever is in state. Deleting the resource only forgets it: the
//! organization itself is never removed.

use super::remote_error;
use declarative::{Attribute, RequiresReplace, Resource, Result, Schema, UseStateForUnknown};
use log::{debug, info};
use quismon::{Client, QuickSignupRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_signup";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupModel {
    pub id: Option<String>,
    pub email: String,
    pub org_name: Option<String>,
    pub org_id: Option<String>,
    pub api_key: Option<String>,
    pub verification_required: Option<bool>,
}

pub struct SignupResource {
    client: Arc<Client>,
}

impl SignupResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl Resource for SignupResource {
    type Model = SignupModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Creates a Quismon organization and returns its API key.")
            .attribute(Attribute::string("id").computed().modifier(UseStateForUnknown))
            .attribute(
                Attribute::string("email")
                    .required()
                    .describe("Owner email address")
                    .modifier(RequiresReplace),
            )
            .attribute(
                Attribute::string("org_name")
                    .optional()
                    .describe("Organization name; chosen by the server when empty")
                    .modifier(RequiresReplace),
            )
            .attribute(Attribute::string("org_id").computed().modifier(UseStateForUnknown))
            .attribute(
                Attribute::string("api_key")
                    .computed()
                    .sensitive()
                    .describe("API key for the new organization")
                    .modifier(UseStateForUnknown),
            )
            .attribute(
                Attribute::bool("verification_required")
                    .computed()
                    .modifier(UseStateForUnknown),
            )
    }

    fn create(&self, mut planned: SignupModel) -> Result<SignupModel> {
        let request = QuickSignupRequest {
            email: planned.email.clone(),
            org_name: planned.org_name.clone().filter(|name| !name.is_empty()),
        };
        let response = self
            .client
            .quick_signup(&request)
            .map_err(|err| remote_error("Error during signup", TYPE_NAME, err))?;

        info!("created organization {}", response.org_id);
        if response.verification_required {
            info!("verify {} to activate the organization", response.email);
        }
        planned.id = Some(response.org_id.clone());
        planned.org_id = Some(response.org_id);
        planned.api_key = Some(response.api_key);
        planned.verification_required = Some(response.verification_required);
        Ok(planned)
    }

    fn read(&self, current: SignupModel) -> Result<SignupModel> {
        Ok(current)
    }

    fn update(&self, planned: SignupModel, prior: &SignupModel) -> Result<SignupModel> {
        Ok(SignupModel {
            email: planned.email,
            org_name: planned.org_name,
            ..prior.clone()
        })
    }

    fn delete(&self, current: &SignupModel) -> Result<()> {
        debug!(
            "forgetting signup for organization {}; the organization is not deleted",
            current.org_id.as_deref().unwrap_or("?")
        );
        Ok(())
    }

    fn import(&self, id: &str) -> Result<SignupModel> {
        Ok(SignupModel {
            id: Some(id.to_string()),
            org_id: Some(id.to_string()),
            ..SignupModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::client;
    use serde_json::json;

    const SIGNUP: &str = r#"{"data": {
        "org_id": "org-1", "api_key": "qm_new", "email": "ops@example.com",
        "verification_required": true
    }}"#;

    fn planned() -> SignupModel {
        SignupModel {
            email: "ops@example.com".into(),
            ..SignupModel::default()
        }
    }

    #[test]
    fn test_create_stores_key_without_auth() {
        let (client, mock) = client();
        mock.push_json(201, SIGNUP);
        let resource = SignupResource::new(Arc::new(client));

        let state = resource.create(planned()).unwrap();
        assert_eq!(state.id.as_deref(), Some("org-1"));
        assert_eq!(state.org_id.as_deref(), Some("org-1"));
        assert_eq!(state.api_key.as_deref(), Some("qm_new"));
        assert_eq!(state.verification_required, Some(true));
        assert_eq!(state.org_name, None);

        let request = mock.last_request().unwrap();
        assert!(request.url.ends_with("/v1/auth/quick-signup"));
        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.json_body().unwrap(), json!({"email": "ops@example.com"}));
    }

    #[test]
    fn test_read_and_delete_never_call_api() {
        let (client, mock) = client();
        let resource = SignupResource::new(Arc::new(client));

        let state = SignupModel {
            id: Some("org-1".into()),
            org_id: Some("org-1".into()),
            api_key: Some("qm_new".into()),
            ..planned()
        };
        assert_eq!(resource.read(state.clone()).unwrap(), state);
        resource.delete(&state).unwrap();
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_update_keeps_key() {
        let (client, mock) = client();
        let resource = SignupResource::new(Arc::new(client));

        let prior = SignupModel {
            id: Some("org-1".into()),
            org_id: Some("org-1".into()),
            api_key: Some("qm_new".into()),
            ..planned()
        };
        let next = resource.update(planned(), &prior).unwrap();
        assert_eq!(next.api_key.as_deref(), Some("qm_new"));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_api_key_is_sensitive() {
        let (client, _mock) = client();
        let resource = SignupResource::new(Arc::new(client));
        assert!(resource.schema().sensitive_attributes().contains("api_key"));
    }
}
