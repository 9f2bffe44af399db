//! Execution planner - diffs declared configuration against state

use crate::address::Address;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::diff::{AttributeChange, InstancePlan, PlanSummary};
use crate::error::{Error, Result};
use crate::graph::{self, Reference};
use crate::modifiers::{ModifyRequest, PlannedValue};
use crate::resource::{DynDataSource, DynResource};
use crate::schema::Attribute;
use crate::state::StateDocument;
use crate::types::PlanAction;
use log::debug;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Lookup of resource and data source implementations by type name
pub trait Registry: Sync {
    fn resource(&self, type_name: &str) -> Option<&dyn DynResource>;
    fn data_source(&self, type_name: &str) -> Option<&dyn DynDataSource>;
}

/// One declared instance, with references still unresolved
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub address: Address,
    pub config: Map<String, Value>,
}

impl Declaration {
    pub fn new(address: Address, config: Map<String, Value>) -> Self {
        Self { address, config }
    }

    pub fn dependencies(&self) -> BTreeSet<Address> {
        graph::dependencies(&self.config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Plan deletion of everything in state
    pub destroy: bool,
    /// Restrict to "type" or "type.name" (plus dependencies)
    pub target: Option<String>,
}

/// Input to [`plan_instance`]
pub struct PlanRequest<'a> {
    pub address: &'a Address,
    /// Resolved declared attributes; `None` plans a delete
    pub config: Option<&'a Map<String, Value>>,
    /// Attributes whose references are not resolved yet
    pub unknown: &'a BTreeSet<String>,
    pub prior: Option<&'a Map<String, Value>>,
}

/// A complete plan: every instance with its action, in execution order
#[derive(Debug, Default)]
pub struct ExecutionPlan {
    pub instances: Vec<InstancePlan>,
    /// Create/update/replace order; each wave only depends on earlier ones
    pub waves: Vec<Vec<Address>>,
    /// Delete order; dependents before their dependencies
    pub destroy_waves: Vec<Vec<Address>>,
    /// Declared (unresolved) configuration, re-resolved at apply time
    pub declarations: BTreeMap<Address, Map<String, Value>>,
    /// Warnings raised while planning
    pub diagnostics: Diagnostics,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<&InstancePlan> {
        self.instances.iter().find(|p| &p.address == address)
    }

    /// Instances that will change
    pub fn changes(&self) -> impl Iterator<Item = &InstancePlan> {
        self.instances.iter().filter(|p| p.is_change())
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary::from_plans(&self.instances)
    }

    pub fn has_changes(&self) -> bool {
        self.summary().has_changes()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Total number of instances in the plan
    pub fn total_instances(&self) -> usize {
        self.instances.len()
    }
}

/// Value of a referenced attribute, or `None` while it is unknown.
///
/// Instances already planned in this run take precedence over state.
fn lookup(
    reference: &Reference,
    planned: &BTreeMap<Address, InstancePlan>,
    state: &StateDocument,
) -> Option<Value> {
    if let Some(plan) = planned.get(&reference.target) {
        if plan.unknown.contains(&reference.attribute) || plan.action == PlanAction::Delete {
            return None;
        }
        return plan.planned.get(&reference.attribute).cloned();
    }
    state
        .attributes(&reference.target)
        .and_then(|attrs| attrs.get(&reference.attribute))
        .cloned()
}

/// Resolve a declaration's references against state only.
pub fn resolve_against_state(
    config: &Map<String, Value>,
    state: &StateDocument,
) -> (Map<String, Value>, BTreeSet<String>) {
    let planned = BTreeMap::new();
    graph::resolve_attributes(config, &|r| lookup(r, &planned, state))
}

/// Build a plan for every declared instance plus every orphan in state
pub fn plan(
    declarations: &[Declaration],
    state: &StateDocument,
    registry: &dyn Registry,
    options: &PlanOptions,
) -> Result<ExecutionPlan> {
    if options.destroy {
        return plan_destroy(state, registry, options.target.as_deref());
    }

    let mut diags = Diagnostics::new();
    let declared: BTreeMap<Address, &Declaration> = declarations
        .iter()
        .filter(|d| !d.address.is_data())
        .map(|d| (d.address.clone(), d))
        .collect();
    let data_declared: BTreeSet<&Address> = declarations
        .iter()
        .filter(|d| d.address.is_data())
        .map(|d| &d.address)
        .collect();

    for declaration in declared.values() {
        if registry.resource(&declaration.address.resource_type).is_none() {
            diags.push(
                Diagnostic::error(
                    "Invalid resource type",
                    format!("The provider does not support resource type {:?}.", declaration.address.resource_type),
                )
                .with_address(&declaration.address),
            );
        }
        for dependency in declaration.dependencies() {
            let known = declared.contains_key(&dependency)
                || data_declared.contains(&dependency)
                || state.contains(&dependency);
            if !known {
                diags.push(
                    Diagnostic::error(
                        "Reference to undeclared resource",
                        format!("A resource {dependency} has not been declared."),
                    )
                    .with_address(&declaration.address),
                );
            }
        }
    }
    if diags.has_errors() {
        return Err(Error::Invalid(diags));
    }

    let selected = select_targets(&declared, options.target.as_deref());
    let nodes: BTreeMap<Address, BTreeSet<Address>> = declared
        .iter()
        .filter(|(address, _)| selected.contains(*address))
        .map(|(address, d)| (address.clone(), d.dependencies()))
        .collect();
    let waves = graph::waves(&nodes)?;

    let mut planned: BTreeMap<Address, InstancePlan> = BTreeMap::new();
    for address in waves.iter().flatten() {
        let declaration = declared[address];
        let Some(resource) = registry.resource(&address.resource_type) else {
            continue;
        };
        let (config, unknown) =
            graph::resolve_attributes(&declaration.config, &|r| lookup(r, &planned, state));
        let request = PlanRequest {
            address,
            config: Some(&config),
            unknown: &unknown,
            prior: state.attributes(address),
        };
        match plan_instance(resource, &request) {
            Ok(mut instance) => {
                instance.dependencies = declaration.dependencies();
                debug!("planned {address}: {}", instance.action);
                planned.insert(address.clone(), instance);
            }
            Err(err) => diags.extend(err.into_diagnostics().with_address(address)),
        }
    }

    let orphans: Vec<Address> = state
        .managed_addresses()
        .into_iter()
        .filter(|a| !declared.contains_key(a))
        .filter(|a| target_matches(a, options.target.as_deref()))
        .collect();
    let destroy_waves = destroy_order(&orphans, state)?;
    for address in &orphans {
        if let Some(prior) = state.attributes(address) {
            let sensitive = registry
                .resource(&address.resource_type)
                .map(|r| r.schema().sensitive_attributes())
                .unwrap_or_default();
            planned.insert(address.clone(), delete_plan(address, prior, &sensitive));
        }
    }

    if diags.has_errors() {
        return Err(Error::Invalid(diags));
    }

    let mut instances = Vec::with_capacity(planned.len());
    for address in waves.iter().chain(destroy_waves.iter()).flatten() {
        if let Some(instance) = planned.remove(address) {
            instances.push(instance);
        }
    }

    Ok(ExecutionPlan {
        instances,
        waves,
        destroy_waves,
        declarations: declared
            .into_iter()
            .filter(|(address, _)| selected.contains(address))
            .map(|(address, d)| (address, d.config.clone()))
            .collect(),
        diagnostics: diags,
    })
}

fn plan_destroy(state: &StateDocument, registry: &dyn Registry, target: Option<&str>) -> Result<ExecutionPlan> {
    let addresses: Vec<Address> = state
        .managed_addresses()
        .into_iter()
        .filter(|a| target_matches(a, target))
        .collect();
    let destroy_waves = destroy_order(&addresses, state)?;

    let mut instances = Vec::new();
    for address in destroy_waves.iter().flatten() {
        if let Some(prior) = state.attributes(address) {
            let sensitive = registry
                .resource(&address.resource_type)
                .map(|r| r.schema().sensitive_attributes())
                .unwrap_or_default();
            instances.push(delete_plan(address, prior, &sensitive));
        }
    }

    Ok(ExecutionPlan {
        instances,
        destroy_waves,
        ..ExecutionPlan::default()
    })
}

/// Dependents first: the reverse of the creation waves recorded in state.
fn destroy_order(addresses: &[Address], state: &StateDocument) -> Result<Vec<Vec<Address>>> {
    let nodes: BTreeMap<Address, BTreeSet<Address>> = addresses
        .iter()
        .map(|a| (a.clone(), state.dependencies(a).into_iter().collect()))
        .collect();
    let mut waves = graph::waves(&nodes)?;
    waves.reverse();
    Ok(waves)
}

fn delete_plan(address: &Address, prior: &Map<String, Value>, sensitive: &BTreeSet<String>) -> InstancePlan {
    let changes = prior
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| AttributeChange::removed(k.clone(), v.clone()).sensitive(sensitive.contains(k)))
        .collect();
    InstancePlan {
        action: PlanAction::Delete,
        planned: Map::new(),
        changes,
        ..InstancePlan::no_op(address.clone(), prior.clone())
    }
}

fn differs(planned: &PlannedValue, prior: Option<&Value>) -> bool {
    match planned {
        PlannedValue::Unknown => true,
        PlannedValue::Known(value) => value != prior.unwrap_or(&Value::Null),
    }
}

fn apply_modifiers(
    attribute: &Attribute,
    config: &Value,
    mut planned: PlannedValue,
    prior: Option<&Value>,
    replace_because: &mut Vec<String>,
) -> PlannedValue {
    for modifier in &attribute.modifiers {
        let response = modifier.modify(&ModifyRequest {
            attribute: attribute.name,
            config,
            planned: &planned,
            prior,
        });
        planned = response.planned;
        if response.requires_replace && !replace_because.iter().any(|a| a == attribute.name) {
            replace_because.push(attribute.name.to_string());
        }
    }
    planned
}

/// Plan a single instance
///
/// Declared attributes take their configured value, then their default,
/// then (if also computed) their prior value. Computed-only attributes keep
/// their prior value when nothing declared changed, and are unknown
/// otherwise. Plan modifiers run last and may flag replacement.
pub fn plan_instance(resource: &dyn DynResource, request: &PlanRequest<'_>) -> Result<InstancePlan> {
    let address = request.address;
    let schema = resource.schema();
    let sensitive = schema.sensitive_attributes();

    let Some(config) = request.config else {
        return Ok(match request.prior {
            Some(prior) => delete_plan(address, prior, &sensitive),
            None => InstancePlan::no_op(address.clone(), Map::new()),
        });
    };

    let config = &schema.conform(config.clone());
    let diags = resource.validate(config, request.unknown).with_address(address);
    if diags.has_errors() {
        return Err(Error::Invalid(diags));
    }

    let prior = request.prior;
    let prior_value = |name: &str| prior.and_then(|p| p.get(name));
    let mut values: Vec<(&Attribute, PlannedValue)> = Vec::with_capacity(schema.attributes.len());
    let mut replace_because = Vec::new();

    for attr in schema.attributes.iter().filter(|a| a.is_configurable()) {
        let config_value = config.get(attr.name).unwrap_or(&Value::Null);
        let value = if request.unknown.contains(attr.name) {
            PlannedValue::Unknown
        } else if !config_value.is_null() {
            PlannedValue::Known(config_value.clone())
        } else if let Some(default) = &attr.default {
            PlannedValue::Known(default.clone())
        } else if attr.computed {
            PlannedValue::Known(prior_value(attr.name).cloned().unwrap_or(Value::Null))
        } else {
            PlannedValue::Known(Value::Null)
        };
        let value = apply_modifiers(attr, config_value, value, prior_value(attr.name), &mut replace_because);
        values.push((attr, value));
    }

    let declared_change =
        prior.is_none() || values.iter().any(|(attr, value)| differs(value, prior_value(attr.name)));
    let replacing = prior.is_some() && !replace_because.is_empty();

    for attr in schema.attributes.iter().filter(|a| a.is_computed_only()) {
        let value = if declared_change {
            PlannedValue::Unknown
        } else {
            PlannedValue::Known(prior_value(attr.name).cloned().unwrap_or(Value::Null))
        };
        let value = if replacing {
            value
        } else {
            apply_modifiers(attr, &Value::Null, value, prior_value(attr.name), &mut replace_because)
        };
        values.push((attr, value));
    }

    let action = match prior {
        None => PlanAction::Create,
        Some(_) if !declared_change => PlanAction::NoOp,
        Some(_) if replacing => PlanAction::Replace,
        Some(_) => PlanAction::Update,
    };

    let mut planned = Map::new();
    let mut unknown = BTreeSet::new();
    let mut changes = Vec::new();
    for attr in &schema.attributes {
        let Some((_, value)) = values.iter().find(|(a, _)| a.name == attr.name) else {
            continue;
        };
        let before = prior_value(attr.name).filter(|v| !v.is_null()).cloned();
        let change = match value {
            PlannedValue::Unknown => {
                unknown.insert(attr.name.to_string());
                planned.insert(attr.name.to_string(), Value::Null);
                Some(AttributeChange::unknown(attr.name, before))
            }
            PlannedValue::Known(after) => {
                planned.insert(attr.name.to_string(), after.clone());
                match (before, after.is_null()) {
                    (None, true) => None,
                    (None, false) => Some(AttributeChange::added(attr.name, after.clone())),
                    (Some(before), true) => Some(AttributeChange::removed(attr.name, before)),
                    (Some(before), false) if &before != after => {
                        Some(AttributeChange::modified(attr.name, before, after.clone()))
                    }
                    (Some(_), false) => None,
                }
            }
        };
        if let Some(mut change) = change.filter(|_| action.is_change()) {
            change.sensitive = attr.sensitive;
            change.forces_replacement = replace_because.iter().any(|a| a == attr.name);
            changes.push(change);
        }
    }

    Ok(InstancePlan {
        address: address.clone(),
        action,
        planned,
        unknown,
        prior: prior.cloned(),
        changes,
        replace_because: if action == PlanAction::Replace {
            replace_because
        } else {
            Vec::new()
        },
        dependencies: BTreeSet::new(),
    })
}

/// Declared addresses selected by `target`, plus everything they depend on
fn select_targets(declared: &BTreeMap<Address, &Declaration>, target: Option<&str>) -> BTreeSet<Address> {
    let mut selected: BTreeSet<Address> = declared
        .keys()
        .filter(|a| target_matches(a, target))
        .cloned()
        .collect();

    let mut frontier: Vec<Address> = selected.iter().cloned().collect();
    while let Some(address) = frontier.pop() {
        if let Some(declaration) = declared.get(&address) {
            for dependency in declaration.dependencies() {
                if declared.contains_key(&dependency) && selected.insert(dependency.clone()) {
                    frontier.push(dependency);
                }
            }
        }
    }
    selected
}

fn target_matches(address: &Address, target: Option<&str>) -> bool {
    match target {
        None => true,
        Some(t) => {
            let (resource_type, name) = parse_target(t);
            matches_filter(address, resource_type.as_deref(), name.as_deref())
        }
    }
}

/// Parse a target string like "type.name" into (type, name)
pub fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = target.split('.').collect();
    match parts.len() {
        1 => (Some(parts[0].to_string()), None),
        2 => (Some(parts[0].to_string()), Some(parts[1].to_string())),
        _ => (None, Some(target.to_string())),
    }
}

/// Check if an address matches the filter criteria
fn matches_filter(address: &Address, resource_type: Option<&str>, name: Option<&str>) -> bool {
    if let Some(rt) = resource_type {
        // Allow the type without its provider prefix
        let short = address
            .resource_type
            .split_once('_')
            .map_or(address.resource_type.as_str(), |(_, rest)| rest);
        if address.resource_type != rt && short != rt {
            return false;
        }
    }

    if let Some(n) = name
        && address.name != n
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::Widgets;
    use serde_json::json;

    struct TestRegistry {
        widgets: Widgets,
    }

    impl Registry for TestRegistry {
        fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
            (type_name == "widget").then_some(&self.widgets as &dyn DynResource)
        }

        fn data_source(&self, _type_name: &str) -> Option<&dyn DynDataSource> {
            None
        }
    }

    fn registry() -> TestRegistry {
        TestRegistry {
            widgets: Widgets::default(),
        }
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn declare(name: &str, config: Value) -> Declaration {
        Declaration::new(Address::managed("widget", name), map(config))
    }

    fn request<'a>(
        address: &'a Address,
        config: &'a Map<String, Value>,
        unknown: &'a BTreeSet<String>,
        prior: Option<&'a Map<String, Value>>,
    ) -> PlanRequest<'a> {
        PlanRequest {
            address,
            config: Some(config),
            unknown,
            prior,
        }
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("widget"), (Some("widget".to_string()), None));
        assert_eq!(
            parse_target("widget.a"),
            (Some("widget".to_string()), Some("a".to_string()))
        );
        assert_eq!(parse_target("a.b.c"), (None, Some("a.b.c".to_string())));
    }

    #[test]
    fn test_matches_filter_short_type() {
        let addr = Address::managed("quismon_check", "api");
        assert!(matches_filter(&addr, Some("check"), None));
        assert!(matches_filter(&addr, Some("quismon_check"), Some("api")));
        assert!(!matches_filter(&addr, Some("alert_rule"), None));
        assert!(!matches_filter(&addr, Some("check"), Some("db")));
    }

    #[test]
    fn test_plan_create_applies_defaults() {
        let widgets = Widgets::default();
        let addr = Address::managed("widget", "a");
        let config = map(json!({"name": "a"}));
        let unknown = BTreeSet::new();

        let plan = plan_instance(&widgets, &request(&addr, &config, &unknown, None)).unwrap();
        assert_eq!(plan.action, PlanAction::Create);
        assert_eq!(plan.planned["size"], json!(1));
        assert!(plan.unknown.contains("id"));
        assert!(plan.unknown.contains("revision"));
        assert!(plan.changes.iter().any(|c| c.path == "id" && c.after_unknown));
    }

    #[test]
    fn test_plan_unchanged_is_noop() {
        let widgets = Widgets::default();
        let addr = Address::managed("widget", "a");
        let config = map(json!({"name": "a"}));
        let prior = map(json!({"id": "w1", "parent_id": null, "name": "a", "size": 1, "color": "grey", "revision": 3}));
        let unknown = BTreeSet::new();

        let plan = plan_instance(&widgets, &request(&addr, &config, &unknown, Some(&prior))).unwrap();
        assert_eq!(plan.action, PlanAction::NoOp);
        assert!(plan.changes.is_empty());
        assert_eq!(plan.planned, prior);
    }

    #[test]
    fn test_plan_update_keeps_id_and_unknowns_revision() {
        let widgets = Widgets::default();
        let addr = Address::managed("widget", "a");
        let config = map(json!({"name": "a", "size": 5}));
        let prior = map(json!({"id": "w1", "parent_id": null, "name": "a", "size": 1, "color": "grey", "revision": 3}));
        let unknown = BTreeSet::new();

        let plan = plan_instance(&widgets, &request(&addr, &config, &unknown, Some(&prior))).unwrap();
        assert_eq!(plan.action, PlanAction::Update);
        assert_eq!(plan.planned["id"], json!("w1"));
        assert_eq!(plan.planned["color"], json!("grey"));
        assert!(plan.unknown.contains("revision"));
        let size = plan.changes.iter().find(|c| c.path == "size").unwrap();
        assert_eq!(size.before, Some(json!(1)));
        assert_eq!(size.after, Some(json!(5)));
    }

    #[test]
    fn test_plan_requires_replace() {
        let widgets = Widgets::default();
        let addr = Address::managed("widget", "a");
        let config = map(json!({"name": "a", "parent_id": "p2"}));
        let prior = map(json!({"id": "w1", "parent_id": "p1", "name": "a", "size": 1, "color": "grey", "revision": 1}));
        let unknown = BTreeSet::new();

        let plan = plan_instance(&widgets, &request(&addr, &config, &unknown, Some(&prior))).unwrap();
        assert_eq!(plan.action, PlanAction::Replace);
        assert_eq!(plan.replace_because, vec!["parent_id"]);
        assert!(plan.unknown.contains("id"));
        let parent = plan.changes.iter().find(|c| c.path == "parent_id").unwrap();
        assert!(parent.forces_replacement);
    }

    #[test]
    fn test_plan_invalid_config() {
        let widgets = Widgets::default();
        let addr = Address::managed("widget", "a");
        let config = map(json!({"name": "a", "size": 0}));
        let unknown = BTreeSet::new();

        let err = plan_instance(&widgets, &request(&addr, &config, &unknown, None)).unwrap_err();
        let Error::Invalid(diags) = err else {
            panic!("expected validation error");
        };
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.address.as_deref(), Some("widget.a"));
        assert_eq!(diag.attribute.as_deref(), Some("size"));
    }

    #[test]
    fn test_plan_orders_and_resolves_references() {
        let registry = registry();
        let declarations = vec![
            declare("child", json!({"name": "child", "parent_id": "${widget.parent.id}"})),
            declare("parent", json!({"name": "parent"})),
        ];
        let state = StateDocument::default();

        let plan = plan(&declarations, &state, &registry, &PlanOptions::default()).unwrap();
        assert_eq!(plan.waves.len(), 2);
        assert_eq!(plan.waves[0], vec![Address::managed("widget", "parent")]);

        let child = plan.get(&Address::managed("widget", "child")).unwrap();
        assert_eq!(child.action, PlanAction::Create);
        assert!(child.unknown.contains("parent_id"));
        assert_eq!(plan.summary().to_add, 2);
    }

    #[test]
    fn test_plan_resolves_known_reference_from_state() {
        let registry = registry();
        let mut state = StateDocument::default();
        state.upsert(
            &Address::managed("widget", "parent"),
            map(json!({"id": "w9", "parent_id": null, "name": "parent", "size": 1, "color": "grey", "revision": 1})),
            vec![],
        );
        let declarations = vec![
            declare("parent", json!({"name": "parent"})),
            declare("child", json!({"name": "child", "parent_id": "${widget.parent.id}"})),
        ];

        let plan = plan(&declarations, &state, &registry, &PlanOptions::default()).unwrap();
        let child = plan.get(&Address::managed("widget", "child")).unwrap();
        assert_eq!(child.planned["parent_id"], json!("w9"));
        assert!(!child.unknown.contains("parent_id"));
    }

    #[test]
    fn test_plan_orphans_are_deleted_dependents_first() {
        let registry = registry();
        let mut state = StateDocument::default();
        state.upsert(&Address::managed("widget", "parent"), map(json!({"id": "w1", "name": "parent"})), vec![]);
        state.upsert(
            &Address::managed("widget", "child"),
            map(json!({"id": "w2", "name": "child", "parent_id": "w1"})),
            vec!["widget.parent".to_string()],
        );

        let plan = plan(&[], &state, &registry, &PlanOptions::default()).unwrap();
        let order: Vec<String> = plan.instances.iter().map(|p| p.address.to_string()).collect();
        assert_eq!(order, vec!["widget.child", "widget.parent"]);
        assert!(plan.instances.iter().all(|p| p.action == PlanAction::Delete));
    }

    #[test]
    fn test_plan_destroy_ignores_declarations() {
        let registry = registry();
        let mut state = StateDocument::default();
        state.upsert(&Address::managed("widget", "a"), map(json!({"id": "w1", "name": "a"})), vec![]);

        let options = PlanOptions {
            destroy: true,
            target: None,
        };
        let plan = plan(&[declare("a", json!({"name": "a"}))], &state, &registry, &options).unwrap();
        assert_eq!(plan.summary().to_destroy, 1);
        assert!(plan.waves.is_empty());
    }

    #[test]
    fn test_plan_rejects_undeclared_reference_and_unknown_type() {
        let registry = registry();
        let declarations = vec![
            declare("a", json!({"name": "a", "parent_id": "${widget.missing.id}"})),
            Declaration::new(Address::managed("gadget", "g"), Map::new()),
        ];
        let err = plan(&declarations, &StateDocument::default(), &registry, &PlanOptions::default()).unwrap_err();
        let Error::Invalid(diags) = err else {
            panic!("expected diagnostics");
        };
        let summaries: Vec<_> = diags.errors().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Reference to undeclared resource"));
        assert!(summaries.contains(&"Invalid resource type"));
    }

    #[test]
    fn test_plan_target_includes_dependencies() {
        let registry = registry();
        let declarations = vec![
            declare("parent", json!({"name": "parent"})),
            declare("child", json!({"name": "child", "parent_id": "${widget.parent.id}"})),
            declare("other", json!({"name": "other"})),
        ];
        let options = PlanOptions {
            destroy: false,
            target: Some("widget.child".to_string()),
        };
        let plan = plan(&declarations, &StateDocument::default(), &registry, &options).unwrap();
        let addresses: BTreeSet<String> = plan.instances.iter().map(|p| p.address.to_string()).collect();
        assert_eq!(addresses, ["widget.child".to_string(), "widget.parent".to_string()].into());
    }

    #[test]
    fn test_plan_cycle_is_error() {
        let registry = registry();
        let declarations = vec![
            declare("a", json!({"name": "a", "parent_id": "${widget.b.id}"})),
            declare("b", json!({"name": "b", "parent_id": "${widget.a.id}"})),
        ];
        let err = plan(&declarations, &StateDocument::default(), &registry, &PlanOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Cycle(_)));
    }
}
