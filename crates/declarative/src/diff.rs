//! Per-instance plans and attribute-level diffs

use crate::address::Address;
use crate::types::PlanAction;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A change to a single attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub path: String,
    /// `None` when the attribute did not exist before
    pub before: Option<Value>,
    /// `None` when the attribute is removed or only known after apply
    pub after: Option<Value>,
    pub after_unknown: bool,
    pub sensitive: bool,
    /// This change forces replacement
    pub forces_replacement: bool,
}

impl AttributeChange {
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(value),
            after_unknown: false,
            sensitive: false,
            forces_replacement: false,
        }
    }

    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(value),
            after: None,
            after_unknown: false,
            sensitive: false,
            forces_replacement: false,
        }
    }

    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(before),
            after: Some(after),
            after_unknown: false,
            sensitive: false,
            forces_replacement: false,
        }
    }

    pub fn unknown(path: impl Into<String>, before: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after: None,
            after_unknown: true,
            sensitive: false,
            forces_replacement: false,
        }
    }

    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }
}

/// The planned outcome for one instance
#[derive(Debug, Clone)]
pub struct InstancePlan {
    pub address: Address,
    pub action: PlanAction,
    /// Planned attributes; unknown ones are `null` and listed in `unknown`
    pub planned: Map<String, Value>,
    pub unknown: BTreeSet<String>,
    pub prior: Option<Map<String, Value>>,
    pub changes: Vec<AttributeChange>,
    /// Attributes whose change forces replacement
    pub replace_because: Vec<String>,
    pub dependencies: BTreeSet<Address>,
}

impl InstancePlan {
    pub fn no_op(address: Address, prior: Map<String, Value>) -> Self {
        Self {
            address,
            action: PlanAction::NoOp,
            planned: prior.clone(),
            unknown: BTreeSet::new(),
            prior: Some(prior),
            changes: Vec::new(),
            replace_because: Vec::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn is_change(&self) -> bool {
        self.action.is_change()
    }

    pub fn resource_type(&self) -> &str {
        &self.address.resource_type
    }
}

/// Plan summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub to_add: usize,
    pub to_change: usize,
    pub to_replace: usize,
    pub to_destroy: usize,
}

impl PlanSummary {
    /// Create a summary from a list of instance plans
    pub fn from_plans<'a>(plans: impl IntoIterator<Item = &'a InstancePlan>) -> Self {
        let mut summary = Self::default();
        for plan in plans {
            match plan.action {
                PlanAction::Create => summary.to_add += 1,
                PlanAction::Update => summary.to_change += 1,
                PlanAction::Replace => summary.to_replace += 1,
                PlanAction::Delete => summary.to_destroy += 1,
                PlanAction::NoOp => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.to_add + self.to_change + self.to_replace + self.to_destroy
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group plans by resource type
pub fn group_by_type<'a>(
    plans: impl IntoIterator<Item = &'a InstancePlan>,
) -> BTreeMap<String, Vec<&'a InstancePlan>> {
    let mut groups: BTreeMap<String, Vec<&InstancePlan>> = BTreeMap::new();
    for plan in plans {
        groups
            .entry(plan.resource_type().to_string())
            .or_default()
            .push(plan);
    }
    groups
}
