//! Attribute plan modifiers.
//!
//! A modifier runs after the planner has computed an attribute's planned
//! value. It may replace that value and may flag that a change to the
//! attribute forces the instance to be replaced.

use serde_json::Value;
use std::fmt;

/// Planned value of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedValue {
    Known(Value),
    /// Only known after apply.
    Unknown,
}

impl PlannedValue {
    pub fn known(&self) -> Option<&Value> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Null or unknown.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unknown | Self::Known(Value::Null))
    }
}

pub struct ModifyRequest<'a> {
    pub attribute: &'a str,
    /// Declared value; `Null` when not set.
    pub config: &'a Value,
    pub planned: &'a PlannedValue,
    /// Value in state, `None` when the instance is being created.
    pub prior: Option<&'a Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifyResponse {
    pub planned: PlannedValue,
    pub requires_replace: bool,
}

impl ModifyResponse {
    pub fn keep(request: &ModifyRequest<'_>) -> Self {
        Self {
            planned: request.planned.clone(),
            requires_replace: false,
        }
    }
}

pub trait PlanModifier: Send + Sync + fmt::Debug {
    fn description(&self) -> &'static str;

    fn modify(&self, request: &ModifyRequest<'_>) -> ModifyResponse;
}

/// Keep the prior value instead of showing "known after apply".
///
/// Used for identifiers that never change once assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> &'static str {
        "Once set, the value of this attribute in state will not change."
    }

    fn modify(&self, request: &ModifyRequest<'_>) -> ModifyResponse {
        match (request.planned, request.prior) {
            (PlannedValue::Unknown, Some(prior)) if !prior.is_null() => ModifyResponse {
                planned: PlannedValue::Known(prior.clone()),
                requires_replace: false,
            },
            _ => ModifyResponse::keep(request),
        }
    }
}

/// Any change to the attribute destroys and recreates the instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> &'static str {
        "If the value of this attribute changes, the resource will be replaced."
    }

    fn modify(&self, request: &ModifyRequest<'_>) -> ModifyResponse {
        let changed = match (request.planned, request.prior) {
            (_, None) => false,
            (PlannedValue::Unknown, Some(_)) => true,
            (PlannedValue::Known(planned), Some(prior)) => planned != prior,
        };
        ModifyResponse {
            planned: request.planned.clone(),
            requires_replace: changed,
        }
    }
}
