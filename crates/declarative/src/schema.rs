//! Attribute schemas.
//!
//! A [`Schema`] lists every attribute a resource or data source exposes,
//! whether it is declared by the user (required/optional), filled in by the
//! provider (computed), or both. The planner relies on these flags; the
//! schema also performs the type and value checks that need no network.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::modifiers::PlanModifier;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Int,
    Bool,
    StringList,
    StringMap,
    /// List of nested objects; only used for computed data source output.
    ObjectList,
}

impl AttributeKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::StringMap => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
            Self::ObjectList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "number",
            Self::Bool => "bool",
            Self::StringList => "list(string)",
            Self::StringMap => "map(string)",
            Self::ObjectList => "list(object)",
        };
        f.write_str(name)
    }
}

/// Value constraints checked during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    AtLeast(i64),
    OneOf(Vec<&'static str>),
    MinLength(usize),
}

impl Validator {
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::AtLeast(min) => match value.as_i64() {
                Some(n) if n < *min => Some(format!("must be at least {min}, got {n}")),
                _ => None,
            },
            Self::OneOf(allowed) => match value.as_str() {
                Some(s) if !allowed.contains(&s) => Some(format!(
                    "value must be one of: {}; got {s:?}",
                    allowed
                        .iter()
                        .map(|a| format!("{a:?}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
                _ => None,
            },
            Self::MinLength(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => {
                    Some(format!("string length must be at least {min}"))
                }
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub description: &'static str,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
    pub validators: Vec<Validator>,
    pub modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl Attribute {
    pub fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            validators: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeKind::String)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttributeKind::Int)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeKind::Bool)
    }

    pub fn string_list(name: &'static str) -> Self {
        Self::new(name, AttributeKind::StringList)
    }

    pub fn string_map(name: &'static str) -> Self {
        Self::new(name, AttributeKind::StringMap)
    }

    pub fn object_list(name: &'static str) -> Self {
        Self::new(name, AttributeKind::ObjectList)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Value used when the attribute is not declared. Implies optional+computed.
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.optional = true;
        self.computed = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.modifiers.push(Arc::new(modifier));
        self
    }

    /// Declared by the user (possibly also computed).
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    /// Only ever set by the provider.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.is_configurable()
    }

    /// Short flag summary for schema listings.
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.required {
            flags.push("required");
        }
        if self.optional {
            flags.push("optional");
        }
        if self.computed {
            flags.push("computed");
        }
        if self.sensitive {
            flags.push("sensitive");
        }
        flags.join(", ")
    }
}

/// Attribute set of one resource or data source type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Apply the implicit primitive conversions declared values get:
    /// numbers and bools become strings where a string is expected, and
    /// numeric or boolean strings become numbers or bools.
    pub fn conform(&self, mut config: Map<String, Value>) -> Map<String, Value> {
        for (key, value) in &mut config {
            let Some(attr) = self.get(key) else {
                continue;
            };
            let replacement = match (attr.kind, &mut *value) {
                (AttributeKind::String, v) => {
                    to_string_primitive(v);
                    None
                }
                (AttributeKind::StringList, Value::Array(items)) => {
                    items.iter_mut().for_each(to_string_primitive);
                    None
                }
                (AttributeKind::StringMap, Value::Object(map)) => {
                    map.values_mut().for_each(to_string_primitive);
                    None
                }
                (AttributeKind::Int, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
                (AttributeKind::Bool, Value::String(s)) => match s.as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            };
            if let Some(replacement) = replacement {
                *value = replacement;
            }
        }
        config
    }

    pub fn sensitive_attributes(&self) -> BTreeSet<String> {
        self.attributes
            .iter()
            .filter(|a| a.sensitive)
            .map(|a| a.name.to_string())
            .collect()
    }

    /// Check declared values against the schema.
    ///
    /// Attributes named in `unknown` hold unresolved references; only their
    /// presence is checked.
    pub fn validate_config(&self, config: &Map<String, Value>, unknown: &BTreeSet<String>) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for key in config.keys() {
            match self.get(key) {
                None => diags.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named {key:?} is not expected here."),
                    )
                    .with_attribute(key.clone()),
                ),
                Some(attr) if attr.is_computed_only() && !config[key].is_null() => diags.push(
                    Diagnostic::error(
                        "Invalid configuration",
                        format!("{key:?} is computed by the provider and cannot be set."),
                    )
                    .with_attribute(key.clone()),
                ),
                Some(_) => {}
            }
        }

        for attr in &self.attributes {
            if unknown.contains(attr.name) {
                continue;
            }
            let value = config.get(attr.name).unwrap_or(&Value::Null);
            if value.is_null() {
                if attr.required {
                    diags.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("The argument {:?} is required, but no definition was found.", attr.name),
                        )
                        .with_attribute(attr.name),
                    );
                }
                continue;
            }
            if !attr.is_configurable() {
                continue;
            }
            if !attr.kind.matches(value) {
                diags.push(
                    Diagnostic::error(
                        "Incorrect attribute value type",
                        format!("{:?} must be {}, got {value}", attr.name, attr.kind),
                    )
                    .with_attribute(attr.name),
                );
                continue;
            }
            for validator in &attr.validators {
                let failures: Vec<String> = match (attr.kind, value) {
                    (AttributeKind::StringList, Value::Array(items)) => {
                        items.iter().filter_map(|item| validator.check(item)).collect()
                    }
                    _ => validator.check(value).into_iter().collect(),
                };
                for message in failures {
                    diags.push(
                        Diagnostic::error("Invalid attribute value", message).with_attribute(attr.name),
                    );
                }
            }
        }

        diags
    }
}

fn to_string_primitive(value: &mut Value) {
    match value {
        Value::Number(n) => *value = Value::String(n.to_string()),
        Value::Bool(b) => *value = Value::String(b.to_string()),
        _ => {}
    }
}
