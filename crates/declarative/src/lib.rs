//! # Declarative
//!
//! A framework for declarative management of remote resources.
//!
//! Resources describe their attributes with a [`Schema`] and implement
//! create/read/update/delete over a typed model. The planner diffs declared
//! configuration against a persisted [`StateDocument`], orders instances by
//! the references between them, and the executor applies the result.
//!
//! ## Core Concepts
//!
//! - **Resource**: A remote object with create/read/update/delete semantics
//! - **DataSource**: A read-only lookup whose results other instances can reference
//! - **Schema**: Attribute kinds, required/optional/computed flags, validators and plan modifiers
//! - **ExecutionPlan**: Per-instance actions grouped into dependency waves
//! - **StateDocument**: The last known attributes of every instance
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     AutoConfirm, Declaration, ExecuteOptions, NoProgress, PlanOptions, StateDocument,
//!     execute, plan,
//! };
//!
//! let mut state = StateDocument::load(path)?;
//! let plan = plan(&declarations, &state, &registry, &PlanOptions::default())?;
//! let summary = execute(
//!     &plan,
//!     &registry,
//!     &mut state,
//!     &ExecuteOptions::default(),
//!     &mut NoProgress,
//!     &mut AutoConfirm,
//! )?;
//! state.save(path)?;
//! ```
//!
//! ## Hooks
//!
//! - [`Registry`]: Looks up resource and data source implementations
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific providers or UI frameworks.

pub mod address;
pub mod context;
pub mod diagnostics;
pub mod diff;
pub mod error;
pub mod executor;
pub mod graph;
pub mod modifiers;
pub mod planner;
pub mod resource;
pub mod schema;
pub mod state;
pub mod types;

// Re-export main types at crate root
pub use address::{Address, Mode};
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use diff::{AttributeChange, InstancePlan, PlanSummary, group_by_type};
pub use error::{Error, Result};
pub use executor::{execute, read_data_sources, refresh};
pub use modifiers::{ModifyRequest, ModifyResponse, PlanModifier, PlannedValue, RequiresReplace, UseStateForUnknown};
pub use planner::{Declaration, ExecutionPlan, PlanOptions, PlanRequest, Registry, plan, plan_instance};
pub use resource::{BoxedDataSource, BoxedResource, DataSource, DynDataSource, DynResource, Resource};
pub use schema::{Attribute, AttributeKind, Schema, Validator};
pub use state::{STATE_VERSION, StateDocument};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, PlanAction};
