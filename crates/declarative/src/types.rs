//! Core types for planning and applying resources

use crate::diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the planner decided to do with an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    NoOp,
    Create,
    Update,
    /// Delete, then create
    Replace,
    Delete,
}

impl PlanAction {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Marker used in plan output
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::NoOp => " ",
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "-/+",
            Self::Delete => "-",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::NoOp => "unchanged",
            Self::Create => "created",
            Self::Update => "updated in-place",
            Self::Replace => "replaced",
            Self::Delete => "destroyed",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Result of applying one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    Created,
    Updated,
    Replaced,
    Deleted,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Updated | Self::Replaced | Self::Deleted
        )
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
    /// Errors and warnings raised while applying, with instance addresses
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.deleted
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of instances processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: ExecuteSummary) {
        self.created += other.created;
        self.updated += other.updated;
        self.replaced += other.replaced;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.no_change += other.no_change;
        self.diagnostics.extend(other.diagnostics);
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Updated => self.updated += 1,
            ApplyResult::Replaced => self.replaced += 1,
            ApplyResult::Deleted => self.deleted += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of instances applied in parallel within a wave
    pub jobs: usize,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        for result in [
            ApplyResult::Created,
            ApplyResult::Replaced,
            ApplyResult::NoChange,
            ApplyResult::Failed { error: "boom".into() },
        ] {
            summary.add_result(&result);
        }
        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_merge() {
        let mut a = ExecuteSummary {
            created: 1,
            ..Default::default()
        };
        a.merge(ExecuteSummary {
            deleted: 2,
            diagnostics: vec![Diagnostic::warning("x", "")],
            ..Default::default()
        });
        assert_eq!(a.total_changes(), 3);
        assert_eq!(a.diagnostics.len(), 1);
    }

    #[test]
    fn test_plan_action_symbols() {
        assert_eq!(PlanAction::Replace.symbol(), "-/+");
        assert!(!PlanAction::NoOp.is_change());
        assert_eq!(PlanAction::Update.to_string(), "update");
    }
}
