use crate::Context;
use crate::cli::PlanArgs;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::Result;
use declarative::PlanOptions;

const JOBS: usize = 4;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let mut workspace = Workspace::open(ctx)?;
    let provider = workspace.connect(ctx)?;
    super::prepare(ctx, &mut workspace, &provider, !args.no_refresh, JOBS)?;

    let options = PlanOptions {
        destroy: false,
        target: args.target,
    };
    let plan = super::build_plan(ctx, &workspace, &provider, &options)?;
    ui::print_plan(&plan);

    if plan.has_changes() && !ctx.quiet {
        println!();
        ui::dim("Run `quismon-iac apply` to perform these actions.");
    }
    Ok(())
}
