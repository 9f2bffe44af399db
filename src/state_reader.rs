//! Loose reading of existing state files for the API key fallback
//!
//! A `quismon_signup` applied earlier leaves its API key in state. The
//! provider can pick it up from there so a second run can provision
//! resources without exporting the key by hand.

use log::debug;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Candidate state files, relative to the working directory, in lookup order.
pub const STATE_FILE_CANDIDATES: &[&str] = &["terraform.tfstate", ".terraform/terraform.tfstate"];

const SIGNUP_TYPE: &str = "quismon_signup";

/// Source of state file contents.
pub trait StateFileReader {
    /// Contents of `relative`, or `None` when it does not exist or cannot be read.
    fn read(&self, relative: &str) -> Option<String>;
}

/// Reads state files below a directory.
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    root: PathBuf,
}

impl DirectoryReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reader rooted at the process working directory.
    pub fn current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

impl StateFileReader for DirectoryReader {
    fn read(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.root.join(relative)).ok()
    }
}

/// An API key found in a state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundKey {
    pub path: String,
    pub api_key: String,
}

/// Look for a signup API key in the first state file that exists.
///
/// Anything that does not parse or has an unexpected shape counts as "no key".
pub fn find_signup_key(reader: &dyn StateFileReader) -> Option<FoundKey> {
    let (path, content) = STATE_FILE_CANDIDATES
        .iter()
        .find_map(|path| reader.read(path).map(|content| (*path, content)))?;

    let document: Value = match serde_json::from_str(&content) {
        Ok(document) => document,
        Err(err) => {
            debug!("ignoring unreadable state file {path}: {err}");
            return None;
        }
    };

    let api_key = document
        .get("resources")?
        .as_array()?
        .iter()
        .filter(|resource| resource.get("type").and_then(Value::as_str) == Some(SIGNUP_TYPE))
        .find_map(|resource| {
            resource
                .get("instances")?
                .get(0)?
                .get("attributes")?
                .get("api_key")?
                .as_str()
                .filter(|key| !key.is_empty())
        })?;

    Some(FoundKey {
        path: path.to_string(),
        api_key: api_key.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::StateFileReader;
    use std::collections::HashMap;

    /// In-memory state files.
    #[derive(Default)]
    pub struct MemoryReader(pub HashMap<&'static str, String>);

    impl MemoryReader {
        pub fn with(path: &'static str, content: &str) -> Self {
            Self(HashMap::from([(path, content.to_string())]))
        }
    }

    impl StateFileReader for MemoryReader {
        fn read(&self, relative: &str) -> Option<String> {
            self.0.get(relative).cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryReader;
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn state_with(resources: Value) -> String {
        json!({"version": 4, "serial": 1, "resources": resources}).to_string()
    }

    fn signup(name: &str, key: &str) -> Value {
        json!({
            "mode": "managed", "type": "quismon_signup", "name": name,
            "instances": [{"attributes": {"id": "org-1", "api_key": key}}]
        })
    }

    #[test]
    fn test_finds_key_in_primary_file() {
        let reader = MemoryReader::with("terraform.tfstate", &state_with(json!([signup("main", "qm_abc")])));
        let found = find_signup_key(&reader).unwrap();
        assert_eq!(found.path, "terraform.tfstate");
        assert_eq!(found.api_key, "qm_abc");
    }

    #[test]
    fn test_falls_back_to_dot_terraform() {
        let reader = MemoryReader::with(
            ".terraform/terraform.tfstate",
            &state_with(json!([signup("main", "qm_nested")])),
        );
        assert_eq!(find_signup_key(&reader).unwrap().api_key, "qm_nested");
    }

    #[test]
    fn test_first_signup_wins() {
        let reader = MemoryReader::with(
            "terraform.tfstate",
            &state_with(json!([signup("first", "qm_1"), signup("second", "qm_2")])),
        );
        assert_eq!(find_signup_key(&reader).unwrap().api_key, "qm_1");
    }

    #[test]
    fn test_skips_signup_without_instances() {
        let empty = json!({"mode": "managed", "type": "quismon_signup", "name": "gone", "instances": []});
        let reader = MemoryReader::with(
            "terraform.tfstate",
            &state_with(json!([empty, signup("main", "qm_live")])),
        );
        assert_eq!(find_signup_key(&reader).unwrap().api_key, "qm_live");
    }

    #[test]
    fn test_skips_signup_with_empty_key() {
        let reader = MemoryReader::with(
            "terraform.tfstate",
            &state_with(json!([signup("a", ""), signup("b", "qm_b")])),
        );
        assert_eq!(find_signup_key(&reader).unwrap().api_key, "qm_b");
    }

    #[test]
    fn test_garbage_and_empty_keys_are_ignored() {
        assert_eq!(find_signup_key(&MemoryReader::with("terraform.tfstate", "{not json")), None);
        assert_eq!(find_signup_key(&MemoryReader::with("terraform.tfstate", r#"{"resources": 3}"#)), None);
        let reader = MemoryReader::with("terraform.tfstate", &state_with(json!([signup("main", "")])));
        assert_eq!(find_signup_key(&reader), None);
        assert_eq!(find_signup_key(&MemoryReader::default()), None);
    }

    #[test]
    fn test_directory_reader() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".terraform")).unwrap();
        std::fs::write(
            dir.path().join(".terraform/terraform.tfstate"),
            state_with(json!([signup("main", "qm_disk")])),
        )
        .unwrap();

        let found = find_signup_key(&DirectoryReader::new(dir.path())).unwrap();
        assert_eq!(found.path, ".terraform/terraform.tfstate");
        assert_eq!(found.api_key, "qm_disk");
    }
}
