//! Terminal feedback while a plan is applied.

use anyhow::{Context, Result};
use colored::Colorize;
use declarative::{Address, ApplyResult, ConfirmCallback, PlanAction, ProgressCallback};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Progress bar that grows with every wave.
pub struct ApplyProgress {
    bar: ProgressBar,
    verbose: bool,
}

impl ApplyProgress {
    pub fn new(verbose: bool) -> Result<Self> {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .context("Invalid progress template")?
            .progress_chars("=> ");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Ok(Self { bar, verbose })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created | ApplyResult::Updated | ApplyResult::Replaced | ApplyResult::Deleted => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

impl ProgressCallback for ApplyProgress {
    fn on_wave_start(&mut self, count: usize) {
        self.bar.inc_length(count as u64);
    }

    fn on_instance_start(&mut self, address: &Address, action: PlanAction) {
        if action.is_change() {
            self.bar.set_message(format!("{address}: {action}..."));
        }
    }

    fn on_instance_complete(&mut self, address: &Address, result: &ApplyResult) {
        self.bar.set_message(format!("{} {address}", result_symbol(result)));
        self.bar.inc(1);

        let line = match result {
            ApplyResult::Failed { error } => Some(format!("    {} {address}: {}", "✗".red(), error.red())),
            ApplyResult::Skipped { reason } if self.verbose => {
                Some(format!("    {} {address}: {}", "⊘".dimmed(), reason.dimmed()))
            }
            r if r.is_change() && self.verbose => Some(format!("    {} {address}", "✓".green())),
            _ => None,
        };
        if let Some(line) = line {
            self.bar.println(line);
        }
    }

    fn on_wave_complete(&mut self) {}
}

/// Yes/no prompt on the terminal.
pub struct TerminalConfirm;

impl ConfirmCallback for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        println!();
        let confirmed = Confirm::new().with_prompt(prompt).default(false).interact()?;
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_waves() {
        let mut progress = ApplyProgress::new(false).unwrap();
        progress.on_wave_start(2);
        progress.on_wave_start(1);
        assert_eq!(progress.bar.length(), Some(3));

        let address = Address::managed("quismon_check", "api");
        progress.on_instance_start(&address, PlanAction::Create);
        progress.on_instance_complete(&address, &ApplyResult::Created);
        assert_eq!(progress.bar.position(), 1);
        progress.finish();
    }

    #[test]
    fn test_result_symbols() {
        assert_eq!(result_symbol(&ApplyResult::Created), "✓");
        assert_eq!(result_symbol(&ApplyResult::NoChange), "○");
        assert_eq!(
            result_symbol(&ApplyResult::Failed {
                error: "boom".into()
            }),
            "✗"
        );
    }
}
