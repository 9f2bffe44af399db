//! Provider configuration and the type registry

use crate::data_source::{
    CheckDataSource, ChecksDataSource, NotificationChannelDataSource, RegionsDataSource,
};
use crate::resource::{
    AlertRuleResource, CheckResource, NotificationChannelResource, OrganizationOtlpResource,
    SignupResource,
};
use crate::state_reader::{StateFileReader, find_signup_key};
use declarative::{
    Attribute, BoxedDataSource, BoxedResource, Diagnostic, Diagnostics, DynDataSource, DynResource,
    Registry, Schema,
};
use log::debug;
use quismon::{Client, DEFAULT_BASE_URL};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const API_KEY_ENV: &str = "QUISMON_API_KEY";
pub const BASE_URL_ENV: &str = "QUISMON_BASE_URL";

/// Read access to environment variables.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// The `[provider]` block after references were resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderBlock {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Attributes whose references are not known yet.
    pub unknown: BTreeSet<String>,
}

impl ProviderBlock {
    pub fn new(config: &Map<String, Value>, unknown: BTreeSet<String>) -> Self {
        let text = |key: &str| match config.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self {
            api_key: text("api_key"),
            base_url: text("base_url"),
            unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    Declared,
    Environment,
    StateFile(String),
    None,
}

/// Effective provider settings.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub base_url: String,
    pub key_source: KeySource,
    pub diagnostics: Diagnostics,
}

/// Resolve the API key and base URL.
///
/// The API key comes from the declared block (even when empty), then the
/// environment, then a signup recorded in a local state file. The base URL
/// comes from the declared block, then the environment, then the default.
pub fn resolve_config(
    declared: &ProviderBlock,
    env: &dyn Environment,
    reader: &dyn StateFileReader,
) -> ResolvedConfig {
    let mut diagnostics = Diagnostics::new();
    for attribute in &declared.unknown {
        diagnostics.push(
            Diagnostic::error(
                "Unknown provider configuration",
                format!("The provider cannot be configured because {attribute:?} depends on a value not known until apply."),
            )
            .with_attribute(attribute.clone()),
        );
    }

    let (mut api_key, mut key_source) = match &declared.api_key {
        Some(key) => (key.clone(), KeySource::Declared),
        None => match env.var(API_KEY_ENV) {
            Some(key) => (key, KeySource::Environment),
            None => (String::new(), KeySource::None),
        },
    };

    if api_key.is_empty()
        && let Some(found) = find_signup_key(reader)
    {
        diagnostics.push(Diagnostic::warning(
            "Using API key from state file",
            format!(
                "No API key was configured; using the key of the quismon_signup resource in {}. Set {API_KEY_ENV} to override.",
                found.path
            ),
        ));
        api_key = found.api_key;
        key_source = KeySource::StateFile(found.path);
    }

    let base_url = declared
        .base_url
        .clone()
        .or_else(|| env.var(BASE_URL_ENV))
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    debug!("provider base URL {base_url}, API key source {key_source:?}");
    ResolvedConfig {
        api_key,
        base_url,
        key_source,
        diagnostics,
    }
}

/// Schema of the `[provider]` block.
pub fn provider_schema() -> Schema {
    Schema::new("Quismon provider settings.")
        .attribute(
            Attribute::string("api_key")
                .optional()
                .sensitive()
                .describe("API key; falls back to QUISMON_API_KEY, then to a signup in local state"),
        )
        .attribute(
            Attribute::string("base_url")
                .optional()
                .describe("API base URL; falls back to QUISMON_BASE_URL, then https://api.quismon.com"),
        )
}

/// Every resource and data source type, sharing one client.
pub struct Provider {
    client: Arc<Client>,
    resources: Vec<BoxedResource>,
    data_sources: Vec<BoxedDataSource>,
}

impl Provider {
    pub fn new(client: Client) -> Self {
        let client = Arc::new(client);
        let resources: Vec<BoxedResource> = vec![
            Box::new(CheckResource::new(client.clone())),
            Box::new(AlertRuleResource::new(client.clone())),
            Box::new(NotificationChannelResource::new(client.clone())),
            Box::new(SignupResource::new(client.clone())),
            Box::new(OrganizationOtlpResource::new(client.clone())),
        ];
        let data_sources: Vec<BoxedDataSource> = vec![
            Box::new(CheckDataSource::new(client.clone())),
            Box::new(ChecksDataSource::new(client.clone())),
            Box::new(NotificationChannelDataSource::new(client.clone())),
            Box::new(RegionsDataSource),
        ];
        Self {
            client,
            resources,
            data_sources,
        }
    }

    /// Build the client from resolved settings. An empty key is allowed so
    /// signup still works.
    pub fn configure(config: &ResolvedConfig) -> quismon::Result<Self> {
        Ok(Self::new(Client::new(&config.base_url, &config.api_key)?))
    }

    /// A provider for schema-only work; never sends a request.
    pub fn offline() -> quismon::Result<Self> {
        Ok(Self::new(Client::new(DEFAULT_BASE_URL, "")?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn resources(&self) -> impl Iterator<Item = &dyn DynResource> {
        self.resources.iter().map(|r| r.as_ref())
    }

    pub fn data_sources(&self) -> impl Iterator<Item = &dyn DynDataSource> {
        self.data_sources.iter().map(|d| d.as_ref())
    }
}

impl Registry for Provider {
    fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
        self.resources().find(|r| r.type_name() == type_name)
    }

    fn data_source(&self, type_name: &str) -> Option<&dyn DynDataSource> {
        self.data_sources().find(|d| d.type_name() == type_name)
    }
}
