//! Persisted state document.
//!
//! The layout follows the widely used v4 state format (`version`, `serial`,
//! `resources[].instances[].attributes`), so other tools that read state
//! files understand it. Exactly one instance is stored per address.

use crate::address::{Address, Mode};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const STATE_VERSION: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub version: u32,
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub resources: Vec<StateResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResource {
    pub mode: Mode,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub instances: Vec<StateInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateInstance {
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            resources: Vec::new(),
        }
    }
}

impl StateResource {
    pub fn address(&self) -> Address {
        Address {
            mode: self.mode,
            resource_type: self.resource_type.clone(),
            name: self.name.clone(),
        }
    }
}

impl StateDocument {
    /// Load from disk. A missing file is an empty document.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no state at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
        if state.version != STATE_VERSION {
            anyhow::bail!(
                "Unsupported state version {} in {} (expected {STATE_VERSION})",
                state.version,
                path.display()
            );
        }
        debug!(
            "loaded state serial {} with {} resources from {}",
            state.serial,
            state.resources.len(),
            path.display()
        );
        Ok(state)
    }

    /// Write to disk via a temporary sibling file, bumping `serial`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.serial += 1;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content + "\n")
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;
        debug!("saved state serial {} to {}", self.serial, path.display());
        Ok(())
    }

    fn find(&self, address: &Address) -> Option<&StateResource> {
        self.resources.iter().find(|r| {
            r.mode == address.mode && r.resource_type == address.resource_type && r.name == address.name
        })
    }

    pub fn get(&self, address: &Address) -> Option<&StateInstance> {
        self.find(address).and_then(|r| r.instances.first())
    }

    pub fn attributes(&self, address: &Address) -> Option<&Map<String, Value>> {
        self.get(address).map(|i| &i.attributes)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.get(address).is_some()
    }

    /// Insert or replace the instance at `address`.
    pub fn upsert(&mut self, address: &Address, attributes: Map<String, Value>, dependencies: Vec<String>) {
        let instance = StateInstance {
            attributes,
            dependencies,
        };
        let existing = self.resources.iter_mut().find(|r| {
            r.mode == address.mode && r.resource_type == address.resource_type && r.name == address.name
        });
        match existing {
            Some(resource) => resource.instances = vec![instance],
            None => self.resources.push(StateResource {
                mode: address.mode,
                resource_type: address.resource_type.clone(),
                name: address.name.clone(),
                provider: provider_for(&address.resource_type),
                instances: vec![instance],
            }),
        }
    }

    pub fn remove(&mut self, address: &Address) -> Option<StateInstance> {
        let index = self.resources.iter().position(|r| {
            r.mode == address.mode && r.resource_type == address.resource_type && r.name == address.name
        })?;
        self.resources.remove(index).instances.into_iter().next()
    }

    /// Addresses of all instances, managed first, in document order.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self
            .resources
            .iter()
            .filter(|r| !r.instances.is_empty())
            .map(StateResource::address)
            .collect();
        addresses.sort_by_key(|a| a.mode);
        addresses
    }

    pub fn managed_addresses(&self) -> Vec<Address> {
        self.addresses().into_iter().filter(|a| !a.is_data()).collect()
    }

    /// Recorded dependencies of an instance.
    pub fn dependencies(&self, address: &Address) -> Vec<Address> {
        self.get(address)
            .map(|i| i.dependencies.iter().filter_map(|d| d.parse().ok()).collect())
            .unwrap_or_default()
    }
}

/// Provider source address derived from the type prefix (`quismon_check` -> `quismon`).
fn provider_for(resource_type: &str) -> String {
    let prefix = resource_type.split('_').next().unwrap_or(resource_type);
    format!("provider[\"registry.terraform.io/{prefix}/{prefix}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = StateDocument::load(&dir.path().join("terraform.tfstate")).unwrap();
        assert_eq!(state.version, STATE_VERSION);
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terraform.tfstate");

        let mut state = StateDocument::default();
        let addr = Address::managed("quismon_check", "api");
        state.upsert(&addr, attrs(json!({"id": "c1", "name": "api"})), vec![]);
        state.save(&path).unwrap();
        assert_eq!(state.serial, 1);

        let loaded = StateDocument::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.attributes(&addr).unwrap()["id"], json!("c1"));
        assert_eq!(
            loaded.resources[0].provider,
            "provider[\"registry.terraform.io/quismon/quismon\"]"
        );
        assert!(!dir.path().join("terraform.tmp").exists());
    }

    #[test]
    fn test_load_rejects_other_versions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.tfstate");
        fs::write(&path, r#"{"version": 3, "resources": []}"#).unwrap();
        assert!(StateDocument::load(&path).is_err());
    }

    #[test]
    fn test_upsert_replaces_instance() {
        let mut state = StateDocument::default();
        let addr = Address::managed("quismon_check", "api");
        state.upsert(&addr, attrs(json!({"id": "c1"})), vec![]);
        state.upsert(&addr, attrs(json!({"id": "c2"})), vec!["quismon_notification_channel.ops".into()]);

        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.attributes(&addr).unwrap()["id"], json!("c2"));
        assert_eq!(
            state.dependencies(&addr),
            vec![Address::managed("quismon_notification_channel", "ops")]
        );
    }

    #[test]
    fn test_remove_and_addresses() {
        let mut state = StateDocument::default();
        let data = Address::data("quismon_checks", "all");
        let check = Address::managed("quismon_check", "api");
        state.upsert(&data, Map::new(), vec![]);
        state.upsert(&check, Map::new(), vec![]);

        assert_eq!(state.addresses(), vec![check.clone(), data.clone()]);
        assert_eq!(state.managed_addresses(), vec![check.clone()]);

        assert!(state.remove(&check).is_some());
        assert!(!state.contains(&check));
        assert!(state.remove(&check).is_none());
    }

    #[test]
    fn test_parses_foreign_state() {
        let doc = json!({
            "version": 4,
            "terraform_version": "1.9.0",
            "serial": 7,
            "lineage": "abc",
            "outputs": {},
            "resources": [{
                "mode": "managed",
                "type": "quismon_signup",
                "name": "me",
                "provider": "provider[\"registry.terraform.io/quismon/quismon\"]",
                "instances": [{"schema_version": 0, "attributes": {"api_key": "qm_x"}}]
            }]
        });
        let state: StateDocument = serde_json::from_value(doc).unwrap();
        let addr = Address::managed("quismon_signup", "me");
        assert_eq!(state.attributes(&addr).unwrap()["api_key"], json!("qm_x"));
    }
}
