use crate::Context;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::{Result, anyhow, bail};
use declarative::{Address, Registry};

pub fn run(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let address: Address = address.parse()?;
    if address.is_data() {
        bail!("Data sources cannot be imported; {address} is read on every plan");
    }

    let mut workspace = Workspace::open(ctx)?;
    let Some(declaration) = workspace.document.get(&address) else {
        bail!(
            "Configuration for import target does not exist: declare {address} in {} before importing",
            workspace.config_path.display()
        );
    };
    let dependencies: Vec<String> = declaration.dependencies().iter().map(ToString::to_string).collect();
    if workspace.state.contains(&address) {
        bail!("Resource already managed: {address} is already in state. Remove it with `state rm` to import a different object");
    }

    let provider = workspace.connect(ctx)?;
    let resource = provider
        .resource(&address.resource_type)
        .ok_or_else(|| anyhow!("The provider does not support resource type {:?}", address.resource_type))?;

    let imported = resource.import(id).map_err(|err| super::fail(err, "Import"))?;
    let attributes = resource.read(&imported).map_err(|err| super::fail(err, "Import"))?;
    workspace.state.upsert(&address, attributes, dependencies);
    workspace.save()?;

    ui::success(&format!("Imported {address} (id {id})"));
    if !ctx.quiet {
        ui::dim("Run `quismon-iac plan` to compare it with the configuration.");
    }
    Ok(())
}
