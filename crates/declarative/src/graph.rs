//! References between instances and dependency ordering.
//!
//! String values may reference attributes of other instances with
//! `${<type>.<name>.<attr>}` or `${data.<type>.<name>.<attr>}`. A string that
//! is exactly one reference takes the referenced value as-is (numbers stay
//! numbers); references embedded in longer strings are interpolated as text.

use crate::address::Address;
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(data\.)?([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_-]*)\.([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("reference pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reference {
    pub target: Address,
    pub attribute: String,
}

fn parse_captures(caps: &regex::Captures<'_>) -> Reference {
    let target = if caps.get(1).is_some() {
        Address::data(&caps[2], &caps[3])
    } else {
        Address::managed(&caps[2], &caps[3])
    };
    Reference {
        target,
        attribute: caps[4].to_string(),
    }
}

/// Every reference in `value`, deduplicated and sorted.
pub fn references(value: &Value) -> BTreeSet<Reference> {
    let mut found = BTreeSet::new();
    collect(value, &mut found);
    found
}

fn collect(value: &Value, found: &mut BTreeSet<Reference>) {
    match value {
        Value::String(s) => {
            for caps in REFERENCE.captures_iter(s) {
                found.insert(parse_captures(&caps));
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect(v, found)),
        Value::Object(map) => map.values().for_each(|v| collect(v, found)),
        _ => {}
    }
}

/// Addresses an attribute map depends on.
pub fn dependencies(config: &Map<String, Value>) -> BTreeSet<Address> {
    config
        .values()
        .flat_map(|v| references(v).into_iter().map(|r| r.target))
        .collect()
}

/// Substitute references in `value`. Returns `None` if any reference could
/// not be resolved yet.
pub fn resolve(value: &Value, lookup: &dyn Fn(&Reference) -> Option<Value>) -> Option<Value> {
    match value {
        Value::String(s) => resolve_string(s, lookup),
        Value::Array(items) => items
            .iter()
            .map(|v| resolve(v, lookup))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| resolve(v, lookup).map(|v| (k.clone(), v)))
            .collect::<Option<Map<_, _>>>()
            .map(Value::Object),
        other => Some(other.clone()),
    }
}

fn resolve_string(s: &str, lookup: &dyn Fn(&Reference) -> Option<Value>) -> Option<Value> {
    if let Some(caps) = REFERENCE.captures(s)
        && caps.get(0).is_some_and(|m| m.start() == 0 && m.end() == s.len())
    {
        return lookup(&parse_captures(&caps));
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in REFERENCE.captures_iter(s) {
        let whole = caps.get(0)?;
        out.push_str(&s[last..whole.start()]);
        match lookup(&parse_captures(&caps))? {
            Value::String(text) => out.push_str(&text),
            Value::Null => {}
            other => out.push_str(&other.to_string()),
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Some(Value::String(out))
}

/// Resolve every attribute, collecting the names of those still unknown.
/// Unknown attributes keep their raw (unresolved) value.
pub fn resolve_attributes(
    config: &Map<String, Value>,
    lookup: &dyn Fn(&Reference) -> Option<Value>,
) -> (Map<String, Value>, BTreeSet<String>) {
    let mut resolved = Map::new();
    let mut unknown = BTreeSet::new();
    for (key, value) in config {
        match resolve(value, lookup) {
            Some(v) => {
                resolved.insert(key.clone(), v);
            }
            None => {
                unknown.insert(key.clone());
                resolved.insert(key.clone(), value.clone());
            }
        }
    }
    (resolved, unknown)
}

/// Group nodes into waves: every node's dependencies are in earlier waves.
///
/// Dependencies on addresses that are not nodes are ignored. Waves are
/// sorted, so the result is deterministic.
pub fn waves(nodes: &BTreeMap<Address, BTreeSet<Address>>) -> Result<Vec<Vec<Address>>> {
    let mut remaining: BTreeMap<&Address, BTreeSet<&Address>> = nodes
        .iter()
        .map(|(node, deps)| {
            let deps = deps.iter().filter(|d| nodes.contains_key(*d) && *d != node).collect();
            (node, deps)
        })
        .collect();

    let mut result = Vec::new();
    while !remaining.is_empty() {
        let ready: Vec<&Address> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(node, _)| *node)
            .collect();

        if ready.is_empty() {
            let cycle: Vec<String> = remaining.keys().map(ToString::to_string).collect();
            return Err(Error::Cycle(cycle.join(", ")));
        }

        for node in &ready {
            remaining.remove(*node);
        }
        for deps in remaining.values_mut() {
            for node in &ready {
                deps.remove(*node);
            }
        }
        result.push(ready.into_iter().cloned().collect());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup(reference: &Reference) -> Option<Value> {
        match (reference.target.to_string().as_str(), reference.attribute.as_str()) {
            ("quismon_check.api", "id") => Some(json!("c1")),
            ("quismon_check.api", "interval_seconds") => Some(json!(60)),
            ("data.quismon_check.legacy", "id") => Some(json!("c0")),
            _ => None,
        }
    }

    #[test]
    fn test_references_found_in_nested_values() {
        let value = json!({
            "check_id": "${quismon_check.api.id}",
            "ids": ["${quismon_notification_channel.ops.id}", "literal"],
            "note": "legacy ${data.quismon_check.legacy.id}"
        });
        let refs: Vec<String> = references(&value).into_iter().map(|r| r.target.to_string()).collect();
        assert_eq!(
            refs,
            vec![
                "quismon_check.api",
                "quismon_notification_channel.ops",
                "data.quismon_check.legacy"
            ]
        );
    }

    #[test]
    fn test_whole_reference_keeps_type() {
        let resolved = resolve(&json!("${quismon_check.api.interval_seconds}"), &lookup).unwrap();
        assert_eq!(resolved, json!(60));
    }

    #[test]
    fn test_embedded_reference_interpolates() {
        let resolved = resolve(&json!("check ${quismon_check.api.id} every ${quismon_check.api.interval_seconds}s"), &lookup).unwrap();
        assert_eq!(resolved, json!("check c1 every 60s"));
    }

    #[test]
    fn test_unresolved_attribute_is_unknown() {
        let config = json!({
            "name": "down",
            "check_id": "${quismon_check.api.id}",
            "notification_channel_ids": ["${quismon_notification_channel.ops.id}"]
        });
        let (resolved, unknown) = resolve_attributes(config.as_object().unwrap(), &lookup);
        assert_eq!(resolved["check_id"], json!("c1"));
        assert_eq!(unknown, ["notification_channel_ids".to_string()].into());
        assert_eq!(resolved["notification_channel_ids"], config["notification_channel_ids"]);
    }

    #[test]
    fn test_waves_order_dependencies() {
        let check = Address::managed("quismon_check", "api");
        let channel = Address::managed("quismon_notification_channel", "ops");
        let rule = Address::managed("quismon_alert_rule", "down");
        let external = Address::data("quismon_check", "legacy");

        let mut nodes = BTreeMap::new();
        nodes.insert(check.clone(), BTreeSet::new());
        nodes.insert(channel.clone(), BTreeSet::new());
        nodes.insert(rule.clone(), [check.clone(), channel.clone(), external].into());

        let waves = waves(&nodes).unwrap();
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0], vec![check, channel]);
        assert_eq!(waves[1], vec![rule]);
    }

    #[test]
    fn test_waves_detect_cycle() {
        let a = Address::managed("t", "a");
        let b = Address::managed("t", "b");
        let mut nodes = BTreeMap::new();
        nodes.insert(a.clone(), [b.clone()].into());
        nodes.insert(b, [a].into());
        let err = waves(&nodes).unwrap_err();
        assert!(err.to_string().contains("t.a, t.b"));
    }
}
