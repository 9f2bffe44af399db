use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::Result;
use colored::Colorize;
use declarative::PlanOptions;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    if !ctx.quiet {
        ui::header("Applying Configuration");
    }
    let jobs = usize::from(args.jobs.max(1));
    let mut workspace = Workspace::open(ctx)?;
    let provider = workspace.connect(ctx)?;
    super::prepare(ctx, &mut workspace, &provider, !args.no_refresh, jobs)?;

    let options = PlanOptions {
        destroy: false,
        target: args.target,
    };
    let plan = super::build_plan(ctx, &workspace, &provider, &options)?;
    ui::print_plan(&plan);

    if !plan.has_changes() {
        // Refreshed attributes and data source results are still worth keeping
        return workspace.save();
    }

    if !ctx.quiet {
        println!();
        println!(
            "  {} Applying {} changes...",
            "→".cyan(),
            plan.summary().total()
        );
    }
    super::execute_plan(ctx, &mut workspace, &provider, &plan, args.auto_approve, jobs, "Apply")?;
    Ok(())
}
