use crate::Context;
use crate::cli::DestroyArgs;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::Result;
use colored::Colorize;
use declarative::PlanOptions;

pub fn run(ctx: &Context, args: DestroyArgs) -> Result<()> {
    if !ctx.quiet {
        ui::header("Destroying Resources");
    }
    let mut workspace = Workspace::open(ctx)?;
    if workspace.state.managed_addresses().is_empty() {
        ui::info("Nothing to destroy: state is empty.");
        return Ok(());
    }
    let provider = workspace.connect(ctx)?;

    let options = PlanOptions {
        destroy: true,
        target: args.target,
    };
    let plan = super::build_plan(ctx, &workspace, &provider, &options)?;
    ui::print_plan(&plan);
    if !plan.has_changes() {
        return Ok(());
    }

    if !ctx.quiet {
        println!();
        println!(
            "  {} Destroying {} resources...",
            "→".cyan(),
            plan.summary().to_destroy
        );
    }
    let jobs = usize::from(args.jobs.max(1));
    super::execute_plan(ctx, &mut workspace, &provider, &plan, args.auto_approve, jobs, "Destroy")?;
    Ok(())
}
