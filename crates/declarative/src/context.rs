//! Progress and confirmation hooks
//!
//! These traits keep the executor independent of any terminal UI.

use crate::address::Address;
use crate::types::{ApplyResult, PlanAction};
use anyhow::Result;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting a wave of independent instances
    fn on_wave_start(&mut self, count: usize);

    /// Called when starting to apply a single instance
    fn on_instance_start(&mut self, address: &Address, action: PlanAction);

    /// Called when an instance completes
    fn on_instance_complete(&mut self, address: &Address, result: &ApplyResult);

    /// Called when a wave completes
    fn on_wave_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_wave_start(&mut self, _count: usize) {}
    fn on_instance_start(&mut self, _address: &Address, _action: PlanAction) {}
    fn on_instance_complete(&mut self, _address: &Address, _result: &ApplyResult) {}
    fn on_wave_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
