//! Execution engine - applies a plan wave by wave with bounded parallelism

use crate::address::Address;
use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Error;
use crate::graph;
use crate::planner::{Declaration, ExecutionPlan, PlanRequest, Registry, plan_instance, resolve_against_state};
use crate::resource::DynResource;
use crate::state::StateDocument;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, PlanAction};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// How one finished instance changes the state document
enum StateChange {
    Keep,
    Upsert(Map<String, Value>),
    Remove,
}

struct Outcome {
    address: Address,
    result: ApplyResult,
    change: StateChange,
    diagnostics: Diagnostics,
}

impl Outcome {
    fn new(address: &Address, result: ApplyResult, change: StateChange) -> Self {
        Self {
            address: address.clone(),
            result,
            change,
            diagnostics: Diagnostics::new(),
        }
    }

    fn failed(address: &Address, err: Error, change: StateChange) -> Self {
        let error = err.to_string();
        Self {
            address: address.clone(),
            result: ApplyResult::Failed { error },
            change,
            diagnostics: err.into_diagnostics().with_address(address),
        }
    }

    fn skipped(address: &Address, reason: String) -> Self {
        Self::new(address, ApplyResult::Skipped { reason }, StateChange::Keep)
    }
}

fn thread_pool(jobs: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create thread pool")
}

/// Execute a plan, recording every result in `state`
///
/// Deletes run first (dependents before dependencies), then each apply
/// wave. Instances in a wave run in parallel; state is updated after each
/// wave so later waves resolve references against fresh values. An
/// instance whose dependency failed is skipped.
pub fn execute<P, C>(
    plan: &ExecutionPlan,
    registry: &dyn Registry,
    state: &mut StateDocument,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let total_changes = plan.summary().total();
    if total_changes == 0 {
        return Ok(ExecuteSummary::default());
    }

    // Confirm before proceeding (unless dry_run)
    if !opts.dry_run && !confirm.confirm("Do you want to perform these actions?")? {
        return Ok(ExecuteSummary {
            skipped: total_changes,
            ..Default::default()
        });
    }

    if opts.dry_run {
        return Ok(ExecuteSummary::default());
    }

    let pool = thread_pool(opts.jobs)?;
    let mut summary = ExecuteSummary::default();
    let mut blocked: BTreeSet<Address> = BTreeSet::new();

    for wave in &plan.destroy_waves {
        let items: Vec<&Address> = wave
            .iter()
            .filter(|a| plan.get(a).is_some_and(|p| p.action == PlanAction::Delete))
            .collect();
        if items.is_empty() {
            continue;
        }

        progress.on_wave_start(items.len());
        for address in &items {
            progress.on_instance_start(address, PlanAction::Delete);
        }
        let snapshot: &StateDocument = state;
        let failed = &blocked;
        let outcomes: Vec<Outcome> = pool.install(|| {
            items
                .par_iter()
                .map(|address| destroy_instance(address, registry, snapshot, failed))
                .collect()
        });
        record_wave(outcomes, state, &mut summary, &mut blocked, progress, plan);
    }

    for wave in &plan.waves {
        progress.on_wave_start(wave.len());
        for address in wave {
            let action = plan.get(address).map_or(PlanAction::NoOp, |p| p.action);
            progress.on_instance_start(address, action);
        }
        let snapshot: &StateDocument = state;
        let failed = &blocked;
        let outcomes: Vec<Outcome> = pool.install(|| {
            wave.par_iter()
                .map(|address| apply_instance(address, plan, registry, snapshot, failed))
                .collect()
        });
        record_wave(outcomes, state, &mut summary, &mut blocked, progress, plan);
    }

    info!(
        "apply finished: {} created, {} updated, {} replaced, {} destroyed, {} failed",
        summary.created, summary.updated, summary.replaced, summary.deleted, summary.failed
    );
    Ok(summary)
}

fn record_wave<P: ProgressCallback>(
    outcomes: Vec<Outcome>,
    state: &mut StateDocument,
    summary: &mut ExecuteSummary,
    blocked: &mut BTreeSet<Address>,
    progress: &mut P,
    plan: &ExecutionPlan,
) {
    for outcome in outcomes {
        match outcome.change {
            StateChange::Keep => {}
            StateChange::Remove => {
                state.remove(&outcome.address);
            }
            StateChange::Upsert(attributes) => {
                let dependencies = plan
                    .get(&outcome.address)
                    .map(|p| p.dependencies.iter().map(ToString::to_string).collect())
                    .unwrap_or_default();
                state.upsert(&outcome.address, attributes, dependencies);
            }
        }
        if !outcome.result.is_success() || matches!(outcome.result, ApplyResult::Skipped { .. }) {
            blocked.insert(outcome.address.clone());
        }
        progress.on_instance_complete(&outcome.address, &outcome.result);
        summary.add_result(&outcome.result);
        summary.diagnostics.extend(outcome.diagnostics);
    }
    progress.on_wave_complete();
}

fn destroy_instance(
    address: &Address,
    registry: &dyn Registry,
    state: &StateDocument,
    failed: &BTreeSet<Address>,
) -> Outcome {
    // A dependent that could not be deleted still needs this instance.
    let still_needed = failed
        .iter()
        .find(|dependent| state.dependencies(dependent).contains(address));
    if let Some(dependent) = still_needed {
        return Outcome::skipped(address, format!("{dependent} was not destroyed"));
    }

    let Some(resource) = registry.resource(&address.resource_type) else {
        return Outcome::failed(
            address,
            Error::UnknownType {
                kind: "resource",
                name: address.resource_type.clone(),
            },
            StateChange::Keep,
        );
    };
    let Some(prior) = state.attributes(address) else {
        return Outcome::new(address, ApplyResult::NoChange, StateChange::Keep);
    };

    debug!("destroying {address}");
    match resource.delete(prior) {
        Ok(()) => Outcome::new(address, ApplyResult::Deleted, StateChange::Remove),
        Err(err) => Outcome::failed(address, err, StateChange::Keep),
    }
}

fn apply_instance(
    address: &Address,
    plan: &ExecutionPlan,
    registry: &dyn Registry,
    state: &StateDocument,
    failed: &BTreeSet<Address>,
) -> Outcome {
    let Some(config) = plan.declarations.get(address) else {
        return Outcome::new(address, ApplyResult::NoChange, StateChange::Keep);
    };
    let dependencies = graph::dependencies(config);
    if let Some(dependency) = dependencies.iter().find(|d| failed.contains(*d)) {
        return Outcome::skipped(address, format!("dependency {dependency} was not applied"));
    }
    let Some(resource) = registry.resource(&address.resource_type) else {
        return Outcome::failed(
            address,
            Error::UnknownType {
                kind: "resource",
                name: address.resource_type.clone(),
            },
            StateChange::Keep,
        );
    };

    let (config, unknown) = resolve_against_state(config, state);
    if !unknown.is_empty() {
        let names: Vec<&str> = unknown.iter().map(String::as_str).collect();
        return Outcome::failed(
            address,
            Error::configuration(
                names.join(", "),
                "value depends on attributes that are still unknown after their resources were applied",
            ),
            StateChange::Keep,
        );
    }

    let prior = state.attributes(address);
    let request = PlanRequest {
        address,
        config: Some(&config),
        unknown: &unknown,
        prior,
    };
    let instance = match plan_instance(resource, &request) {
        Ok(instance) => instance,
        Err(err) => return Outcome::failed(address, err, StateChange::Keep),
    };

    debug!("applying {address}: {}", instance.action);
    match (instance.action, prior) {
        (PlanAction::NoOp, _) => Outcome::new(address, ApplyResult::NoChange, StateChange::Keep),
        (PlanAction::Create, _) | (_, None) => match resource.create(&instance.planned) {
            Ok(created) => Outcome::new(address, ApplyResult::Created, StateChange::Upsert(created)),
            Err(err) => Outcome::failed(address, err, StateChange::Keep),
        },
        (PlanAction::Update, Some(prior)) => match resource.update(&instance.planned, prior) {
            Ok(updated) => Outcome::new(address, ApplyResult::Updated, StateChange::Upsert(updated)),
            Err(err) => Outcome::failed(address, err, StateChange::Keep),
        },
        (PlanAction::Replace, Some(prior)) => replace_instance(resource, address, &instance.planned, prior),
        (PlanAction::Delete, Some(prior)) => match resource.delete(prior) {
            Ok(()) => Outcome::new(address, ApplyResult::Deleted, StateChange::Remove),
            Err(err) => Outcome::failed(address, err, StateChange::Keep),
        },
    }
}

fn replace_instance(
    resource: &dyn DynResource,
    address: &Address,
    planned: &Map<String, Value>,
    prior: &Map<String, Value>,
) -> Outcome {
    match resource.delete(prior) {
        Ok(()) => {}
        Err(err) => return Outcome::failed(address, err, StateChange::Keep),
    }
    match resource.create(planned) {
        Ok(created) => Outcome::new(address, ApplyResult::Replaced, StateChange::Upsert(created)),
        // The old object is gone either way
        Err(err) => Outcome::failed(address, err, StateChange::Remove),
    }
}

/// Re-read every managed instance in state
///
/// Instances whose remote object no longer exists are dropped with a
/// warning; other read failures are reported and leave state untouched.
pub fn refresh(registry: &dyn Registry, state: &mut StateDocument, jobs: usize) -> Result<Diagnostics> {
    let pool = thread_pool(jobs)?;
    let addresses = state.managed_addresses();

    let snapshot: &StateDocument = state;
    let outcomes: Vec<Outcome> = pool.install(|| {
        addresses
            .par_iter()
            .map(|address| refresh_instance(address, registry, snapshot))
            .collect()
    });

    let mut diags = Diagnostics::new();
    for outcome in outcomes {
        match outcome.change {
            StateChange::Keep => {}
            StateChange::Remove => {
                state.remove(&outcome.address);
            }
            StateChange::Upsert(attributes) => {
                let dependencies = state
                    .dependencies(&outcome.address)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                state.upsert(&outcome.address, attributes, dependencies);
            }
        }
        diags.extend(outcome.diagnostics);
    }
    Ok(diags)
}

fn refresh_instance(address: &Address, registry: &dyn Registry, state: &StateDocument) -> Outcome {
    let Some(resource) = registry.resource(&address.resource_type) else {
        return Outcome::failed(
            address,
            Error::UnknownType {
                kind: "resource",
                name: address.resource_type.clone(),
            },
            StateChange::Keep,
        );
    };
    let Some(current) = state.attributes(address) else {
        return Outcome::new(address, ApplyResult::NoChange, StateChange::Keep);
    };

    match resource.read(current) {
        Ok(attributes) => Outcome::new(address, ApplyResult::NoChange, StateChange::Upsert(attributes)),
        Err(err) if err.is_not_found() => {
            warn!("{address} no longer exists, removing it from state");
            let mut outcome = Outcome::new(address, ApplyResult::Deleted, StateChange::Remove);
            outcome.diagnostics.push(
                Diagnostic::warning(
                    "Resource not found",
                    format!("{err}. It was deleted outside of this tool and has been removed from state."),
                )
                .with_address(address),
            );
            outcome
        }
        Err(err) => Outcome::failed(address, err, StateChange::Keep),
    }
}

/// Read every declared data source and store the results in state
///
/// Data sources are read in dependency order. One whose arguments depend on
/// values not known until apply is deferred with a warning.
pub fn read_data_sources(
    declarations: &[Declaration],
    registry: &dyn Registry,
    state: &mut StateDocument,
) -> Result<Diagnostics> {
    let data: BTreeMap<Address, &Declaration> = declarations
        .iter()
        .filter(|d| d.address.is_data())
        .map(|d| (d.address.clone(), d))
        .collect();
    let nodes: BTreeMap<Address, BTreeSet<Address>> = data
        .iter()
        .map(|(address, d)| (address.clone(), d.dependencies()))
        .collect();
    let waves = graph::waves(&nodes)?;

    let mut diags = Diagnostics::new();
    for address in waves.iter().flatten() {
        let declaration = data[address];
        let Some(source) = registry.data_source(&address.resource_type) else {
            diags.push(
                Diagnostic::error(
                    "Invalid data source",
                    format!("The provider does not support data source {:?}.", address.resource_type),
                )
                .with_address(address),
            );
            continue;
        };

        let (config, unknown) = resolve_against_state(&declaration.config, state);
        if !unknown.is_empty() {
            diags.push(
                Diagnostic::warning(
                    "Data source read deferred",
                    "Its arguments depend on values that are only known after apply.",
                )
                .with_address(address),
            );
            continue;
        }

        let config = source.schema().conform(config);
        let validation = source.validate(&config).with_address(address);
        let invalid = validation.has_errors();
        diags.extend(validation);
        if invalid {
            continue;
        }

        debug!("reading {address}");
        match source.read(&config) {
            Ok(attributes) => {
                let dependencies = declaration.dependencies().iter().map(ToString::to_string).collect();
                state.upsert(address, attributes, dependencies);
            }
            Err(err) => diags.extend(err.into_diagnostics().with_address(address)),
        }
    }
    Ok(diags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::planner::{PlanOptions, plan};
    use crate::resource::testing::Widgets;
    use crate::resource::{DataSource, DynDataSource};
    use crate::schema::{Attribute, Schema};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct LookupModel {
        name: String,
        id: Option<String>,
    }

    /// Looks widgets up by name in a fixed table
    struct WidgetLookup;

    impl DataSource for WidgetLookup {
        type Model = LookupModel;

        fn type_name(&self) -> &'static str {
            "widget"
        }

        fn schema(&self) -> Schema {
            Schema::new("lookup")
                .attribute(Attribute::string("name").required())
                .attribute(Attribute::string("id").computed())
        }

        fn read(&self, mut config: LookupModel) -> crate::error::Result<LookupModel> {
            if config.name != "existing" {
                return Err(Error::NotFound {
                    resource_type: "widget".to_string(),
                    id: config.name,
                });
            }
            config.id = Some("w100".to_string());
            Ok(config)
        }
    }

    #[derive(Default)]
    struct TestRegistry {
        widgets: Widgets,
    }

    impl Registry for TestRegistry {
        fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
            (type_name == "widget").then_some(&self.widgets as &dyn DynResource)
        }

        fn data_source(&self, type_name: &str) -> Option<&dyn DynDataSource> {
            (type_name == "widget").then_some(&WidgetLookup as &dyn DynDataSource)
        }
    }

    fn declare(name: &str, config: Value) -> Declaration {
        Declaration::new(Address::managed("widget", name), config.as_object().unwrap().clone())
    }

    fn run(
        registry: &TestRegistry,
        declarations: &[Declaration],
        state: &mut StateDocument,
        options: &PlanOptions,
    ) -> ExecuteSummary {
        let plan = plan(declarations, state, registry, options).unwrap();
        execute(
            &plan,
            registry,
            state,
            &ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap()
    }

    fn parent_child() -> Vec<Declaration> {
        vec![
            declare("parent", json!({"name": "parent"})),
            declare("child", json!({"name": "child", "parent_id": "${widget.parent.id}"})),
        ]
    }

    #[test]
    fn test_execute_empty_plan() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let summary = run(&registry, &[], &mut state, &PlanOptions::default());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_apply_creates_in_dependency_order() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let summary = run(&registry, &parent_child(), &mut state, &PlanOptions::default());

        assert_eq!(summary.created, 2);
        assert!(summary.is_success());
        assert_eq!(registry.widgets.calls(), vec!["create parent", "create child"]);

        let child = state.attributes(&Address::managed("widget", "child")).unwrap();
        assert_eq!(child["parent_id"], json!("w1"));
        assert_eq!(child["color"], json!("grey"));
        assert_eq!(
            state.dependencies(&Address::managed("widget", "child")),
            vec![Address::managed("widget", "parent")]
        );
    }

    #[test]
    fn test_second_apply_is_noop() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &parent_child(), &mut state, &PlanOptions::default());

        let plan = plan(&parent_child(), &state, &registry, &PlanOptions::default()).unwrap();
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_failed_dependency_skips_dependents() {
        let registry = TestRegistry::default();
        registry.widgets.fail_on.lock().unwrap().insert("parent".to_string());
        let mut state = StateDocument::default();
        let summary = run(&registry, &parent_child(), &mut state, &PlanOptions::default());

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(state.resources.is_empty());
        let diag = &summary.diagnostics[0];
        assert_eq!(diag.summary, "Error during create");
        assert_eq!(diag.address.as_deref(), Some("widget.parent"));
    }

    #[test]
    fn test_replace_propagates_new_id() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let mut declarations = parent_child();
        declarations.insert(0, declare("other", json!({"name": "other"})));
        run(&registry, &declarations, &mut state, &PlanOptions::default());

        // Point child at a different parent
        declarations[2] = declare("child", json!({"name": "child", "parent_id": "${widget.other.id}"}));
        let summary = run(&registry, &declarations, &mut state, &PlanOptions::default());
        assert_eq!(summary.replaced, 1);

        let other_id = state.attributes(&Address::managed("widget", "other")).unwrap()["id"].clone();
        let child = state.attributes(&Address::managed("widget", "child")).unwrap();
        assert_eq!(child["parent_id"], other_id);
        assert!(registry.widgets.calls().ends_with(&["delete child".to_string(), "create child".to_string()]));
    }

    #[test]
    fn test_update_in_place() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &[declare("a", json!({"name": "a"}))], &mut state, &PlanOptions::default());
        let summary = run(&registry, &[declare("a", json!({"name": "a", "size": 3}))], &mut state, &PlanOptions::default());

        assert_eq!(summary.updated, 1);
        let a = state.attributes(&Address::managed("widget", "a")).unwrap();
        assert_eq!(a["size"], json!(3));
        assert_eq!(a["revision"], json!(2));
        assert_eq!(a["id"], json!("w1"));
    }

    #[test]
    fn test_destroy_removes_dependents_first() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &parent_child(), &mut state, &PlanOptions::default());

        let options = PlanOptions {
            destroy: true,
            target: None,
        };
        let summary = run(&registry, &parent_child(), &mut state, &options);
        assert_eq!(summary.deleted, 2);
        assert!(state.resources.is_empty());
        assert!(registry.widgets.calls().ends_with(&["delete child".to_string(), "delete parent".to_string()]));
    }

    #[test]
    fn test_failed_delete_keeps_dependencies() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &parent_child(), &mut state, &PlanOptions::default());
        registry.widgets.fail_on.lock().unwrap().insert("child".to_string());

        let summary = run(&registry, &[], &mut state, &PlanOptions::default());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(state.contains(&Address::managed("widget", "parent")));
        assert!(state.contains(&Address::managed("widget", "child")));
    }

    #[test]
    fn test_delete_of_missing_object_is_reported() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &parent_child(), &mut state, &PlanOptions::default());
        registry.widgets.gone.lock().unwrap().insert("child".to_string());

        let options = PlanOptions {
            destroy: true,
            target: Some("widget.child".to_string()),
        };
        let summary = run(&registry, &parent_child(), &mut state, &options);
        assert_eq!(summary.deleted, 0);
        assert_eq!(summary.failed, 1);
        let diag = &summary.diagnostics[0];
        assert_eq!(diag.summary, "Resource not found");
        assert_eq!(diag.address.as_deref(), Some("widget.child"));
        assert!(state.contains(&Address::managed("widget", "child")));
    }

    #[test]
    fn test_replace_fails_when_old_object_is_missing() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let mut declarations = parent_child();
        declarations.insert(0, declare("other", json!({"name": "other"})));
        run(&registry, &declarations, &mut state, &PlanOptions::default());
        registry.widgets.gone.lock().unwrap().insert("child".to_string());

        declarations[2] = declare("child", json!({"name": "child", "parent_id": "${widget.other.id}"}));
        let summary = run(&registry, &declarations, &mut state, &PlanOptions::default());
        assert_eq!(summary.replaced, 0);
        assert_eq!(summary.failed, 1);
        let creates = registry.widgets.calls().iter().filter(|c| *c == "create child").count();
        assert_eq!(creates, 1);
        let child = state.attributes(&Address::managed("widget", "child")).unwrap();
        let parent = state.attributes(&Address::managed("widget", "parent")).unwrap();
        assert_eq!(child["parent_id"], parent["id"]);
    }

    #[test]
    fn test_declined_and_dry_run_make_no_calls() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let plan = plan(&parent_child(), &state, &registry, &PlanOptions::default()).unwrap();

        let summary = execute(
            &plan,
            &registry,
            &mut state,
            &ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();
        assert_eq!(summary.skipped, 2);

        let dry = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = execute(&plan, &registry, &mut state, &dry, &mut NoProgress, &mut AutoConfirm).unwrap();
        assert_eq!(summary.total(), 0);
        assert!(registry.widgets.calls().is_empty());
    }

    #[test]
    fn test_refresh_drops_missing_instances() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &parent_child(), &mut state, &PlanOptions::default());
        registry.widgets.gone.lock().unwrap().insert("child".to_string());

        let diags = refresh(&registry, &mut state, 2).unwrap();
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
        assert!(!state.contains(&Address::managed("widget", "child")));
        assert!(state.contains(&Address::managed("widget", "parent")));
    }

    #[test]
    fn test_refresh_then_plan_recreates() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        run(&registry, &parent_child(), &mut state, &PlanOptions::default());
        registry.widgets.gone.lock().unwrap().insert("parent".to_string());
        refresh(&registry, &mut state, 1).unwrap();

        let plan = plan(&parent_child(), &state, &registry, &PlanOptions::default()).unwrap();
        assert_eq!(plan.get(&Address::managed("widget", "parent")).unwrap().action, PlanAction::Create);
        assert_eq!(plan.get(&Address::managed("widget", "child")).unwrap().action, PlanAction::Replace);
    }

    #[test]
    fn test_read_data_sources() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let declarations = vec![
            Declaration::new(Address::data("widget", "found"), json!({"name": "existing"}).as_object().unwrap().clone()),
            Declaration::new(Address::data("widget", "missing"), json!({"name": "nope"}).as_object().unwrap().clone()),
        ];

        let diags = read_data_sources(&declarations, &registry, &mut state).unwrap();
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(diags.errors().next().unwrap().address.as_deref(), Some("data.widget.missing"));
        assert_eq!(state.attributes(&Address::data("widget", "found")).unwrap()["id"], json!("w100"));
    }

    #[test]
    fn test_data_source_feeds_resource() {
        let registry = TestRegistry::default();
        let mut state = StateDocument::default();
        let declarations = vec![
            Declaration::new(Address::data("widget", "found"), json!({"name": "existing"}).as_object().unwrap().clone()),
            declare("child", json!({"name": "child", "parent_id": "${data.widget.found.id}"})),
        ];

        read_data_sources(&declarations, &registry, &mut state).unwrap();
        run(&registry, &declarations, &mut state, &PlanOptions::default());
        let child = state.attributes(&Address::managed("widget", "child")).unwrap();
        assert_eq!(child["parent_id"], json!("w100"));
    }
}
