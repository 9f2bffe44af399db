//! Declared configuration (`quismon.toml`)
//!
//! ```toml
//! [provider]
//! base_url = "https://api.quismon.com"
//!
//! [resource.quismon_check.api]
//! name = "api"
//! type = "https"
//! interval_seconds = 60
//! config = { url = "https://example.com/health" }
//!
//! [resource.quismon_alert_rule.api_down]
//! check_id = "${quismon_check.api.id}"
//! ```

use anyhow::{Context, Result};
use declarative::{Address, Declaration};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("name pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {kind} name {name:?}: names start with a letter or underscore and contain only letters, digits, '_' and '-'")]
    InvalidName { kind: &'static str, name: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    provider: toml::Table,
    #[serde(default)]
    resource: BTreeMap<String, BTreeMap<String, toml::Table>>,
    #[serde(default)]
    data: BTreeMap<String, BTreeMap<String, toml::Table>>,
}

/// A parsed configuration file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub provider: Map<String, Value>,
    pub declarations: Vec<Declaration>,
}

impl Document {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawDocument = toml::from_str(content)?;
        let mut declarations = Vec::new();

        for (blocks, data) in [(raw.resource, false), (raw.data, true)] {
            for (resource_type, instances) in blocks {
                check_name("type", &resource_type)?;
                for (name, table) in instances {
                    check_name("instance", &name)?;
                    let address = if data {
                        Address::data(&resource_type, &name)
                    } else {
                        Address::managed(&resource_type, &name)
                    };
                    declarations.push(Declaration::new(address, to_json_table(table)));
                }
            }
        }

        Ok(Self {
            provider: to_json_table(raw.provider),
            declarations,
        })
    }

    pub fn get(&self, address: &Address) -> Option<&Declaration> {
        self.declarations.iter().find(|d| &d.address == address)
    }
}

fn check_name(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if NAME.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

fn to_json_table(table: toml::Table) -> Map<String, Value> {
    table.into_iter().map(|(k, v)| (k, to_json(v))).collect()
}

fn to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        toml::Value::Table(table) => Value::Object(to_json_table(table)),
    }
}
