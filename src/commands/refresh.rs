use crate::Context;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::Result;

const JOBS: usize = 4;

pub fn run(ctx: &Context) -> Result<()> {
    let mut workspace = Workspace::open(ctx)?;
    let provider = workspace.connect(ctx)?;
    let before = workspace.state.managed_addresses().len();

    super::prepare(ctx, &mut workspace, &provider, true, JOBS)?;
    workspace.save()?;

    let after = workspace.state.managed_addresses().len();
    ui::success(&format!("Refreshed {after} resources"));
    if after < before {
        ui::warn(&format!("{} resources no longer exist and were removed from state", before - after));
    }
    Ok(())
}
