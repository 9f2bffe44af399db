//! `data.quismon_check` - look up a check by name

use crate::resource::remote_error;
use declarative::{Attribute, DataSource, Result, Schema, Validator};
use quismon::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_check";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckLookup {
    pub name: String,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub check_type: Option<String>,
    pub health_status: Option<String>,
    pub enabled: Option<bool>,
    pub interval_seconds: Option<i64>,
    pub regions: Option<Vec<String>>,
}

pub struct CheckDataSource {
    client: Arc<Client>,
}

impl CheckDataSource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl DataSource for CheckDataSource {
    type Model = CheckLookup;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Looks up an existing check by exact name.")
            .attribute(Attribute::string("name").required().validate(Validator::MinLength(1)))
            .attribute(Attribute::string("id").computed())
            .attribute(Attribute::string("type").computed())
            .attribute(Attribute::string("health_status").computed())
            .attribute(Attribute::bool("enabled").computed())
            .attribute(Attribute::int("interval_seconds").computed())
            .attribute(Attribute::string_list("regions").computed())
    }

    fn read(&self, config: CheckLookup) -> Result<CheckLookup> {
        let check = self
            .client
            .get_check_by_name(&config.name)
            .map_err(|err| remote_error("Error reading check", TYPE_NAME, err))?;

        Ok(CheckLookup {
            name: check.name,
            id: Some(check.id),
            check_type: Some(check.check_type),
            health_status: Some(check.health_status),
            enabled: Some(check.enabled),
            interval_seconds: Some(check.interval_seconds),
            regions: Some(check.regions),
        })
    }
}
