use crate::Context;
use crate::cli::StateCommand;
use crate::provider::Provider;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::{Result, bail};
use chrono::Utc;
use declarative::{Address, Registry};
use std::collections::BTreeSet;

pub fn run(ctx: &Context, cmd: StateCommand) -> Result<()> {
    match cmd {
        StateCommand::List => list(ctx),
        StateCommand::Show { address } => show(ctx, &address),
        StateCommand::Rm { address } => rm(ctx, &address),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let workspace = Workspace::open_state(ctx)?;
    let addresses = workspace.state.addresses();
    if addresses.is_empty() {
        if !ctx.quiet {
            ui::info(&format!("No resources in {}", workspace.state_path.display()));
        }
        return Ok(());
    }
    for address in addresses {
        println!("{address}");
    }
    Ok(())
}

/// Attributes the schema marks sensitive for the type at `address`.
fn sensitive_attributes(address: &Address) -> Result<BTreeSet<String>> {
    let provider = Provider::offline()?;
    let schema = if address.is_data() {
        provider.data_source(&address.resource_type).map(|d| d.schema())
    } else {
        provider.resource(&address.resource_type).map(|r| r.schema())
    };
    Ok(schema.map(|s| s.sensitive_attributes()).unwrap_or_default())
}

fn show(ctx: &Context, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let workspace = Workspace::open_state(ctx)?;
    let Some(attributes) = workspace.state.attributes(&address) else {
        bail!("No instance {address} in {}", workspace.state_path.display());
    };

    let sensitive = sensitive_attributes(&address)?;
    ui::header(&address.to_string());
    print!("{}", ui::format_attributes(attributes, &sensitive, Utc::now()));

    let dependencies = workspace.state.dependencies(&address);
    if !dependencies.is_empty() && !ctx.quiet {
        ui::section("Depends on");
        for dependency in dependencies {
            println!("  {dependency}");
        }
    }
    Ok(())
}

fn rm(ctx: &Context, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let mut workspace = Workspace::open_state(ctx)?;
    if workspace.state.remove(&address).is_none() {
        bail!("No instance {address} in {}", workspace.state_path.display());
    }
    workspace.save()?;
    ui::success(&format!("Removed {address} from state"));
    if !ctx.quiet && !address.is_data() {
        ui::dim("The remote object still exists; it is no longer managed.");
    }
    Ok(())
}
