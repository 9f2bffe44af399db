//! `data.quismon_checks` - every check in the organization

use crate::resource::remote_error;
use declarative::{Attribute, DataSource, Result, Schema};
use quismon::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_checks";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub check_type: String,
    pub health_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckList {
    pub checks: Vec<CheckSummary>,
}

pub struct ChecksDataSource {
    client: Arc<Client>,
}

impl ChecksDataSource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl DataSource for ChecksDataSource {
    type Model = CheckList;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Lists every check in the organization.")
            .attribute(Attribute::object_list("checks").computed().describe("id, name, type and health_status"))
    }

    fn read(&self, _config: CheckList) -> Result<CheckList> {
        let checks = self
            .client
            .list_checks()
            .map_err(|err| remote_error("Error listing checks", TYPE_NAME, err))?;

        Ok(CheckList {
            checks: checks
                .into_iter()
                .map(|c| CheckSummary {
                    id: c.id,
                    name: c.name,
                    check_type: c.check_type,
                    health_status: c.health_status,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::client;

    #[test]
    fn test_lists_summaries() {
        let (client, mock) = client();
        mock.push_json(
            200,
            r#"{"data": [{"id": "c1", "name": "api", "type": "https", "health_status": "healthy"}]}"#,
        );
        let source = ChecksDataSource::new(Arc::new(client));

        let list = source.read(CheckList::default()).unwrap();
        assert_eq!(
            list.checks,
            vec![CheckSummary {
                id: "c1".into(),
                name: "api".into(),
                check_type: "https".into(),
                health_status: "healthy".into(),
            }]
        );
    }

    #[test]
    fn test_api_error_is_remote() {
        let (client, mock) = client();
        mock.push_json(500, r#"{"error": "database unavailable"}"#);
        let source = ChecksDataSource::new(Arc::new(client));

        let err = source.read(CheckList::default()).unwrap_err();
        assert_eq!(err.to_string(), "Error listing checks: API error (500): database unavailable");
    }
}
