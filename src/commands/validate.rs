use crate::Context;
use crate::config::Document;
use crate::provider::{Provider, provider_schema};
use crate::ui;
use crate::workspace::Workspace;
use anyhow::{Result, bail};
use declarative::graph::resolve_attributes;
use declarative::{Diagnostic, Diagnostics, Registry};
use std::collections::BTreeSet;

pub fn run(ctx: &Context) -> Result<()> {
    let workspace = Workspace::open(ctx)?;
    let provider = Provider::offline()?;
    let diags = validate_document(&workspace.document, &provider);
    super::report(ctx, &diags);

    if diags.has_errors() {
        bail!(
            "{} has {} error(s)",
            workspace.config_path.display(),
            diags.errors().count()
        );
    }
    ui::success("The configuration is valid.");
    Ok(())
}

/// Check every block against its schema without contacting the API.
///
/// Attributes that hold references are only checked for presence.
pub fn validate_document(document: &Document, registry: &dyn Registry) -> Diagnostics {
    let mut diags = Diagnostics::new();

    let (_, unknown) = resolve_attributes(&document.provider, &|_| None);
    diags.extend(
        provider_schema()
            .validate_config(&document.provider, &unknown)
            .with_address("provider"),
    );

    let declared: BTreeSet<_> = document.declarations.iter().map(|d| &d.address).collect();
    for declaration in &document.declarations {
        let address = &declaration.address;
        let (_, unknown) = resolve_attributes(&declaration.config, &|_| None);

        let found = if address.is_data() {
            registry
                .data_source(&address.resource_type)
                .map(|d| d.schema().validate_config(&declaration.config, &unknown))
        } else {
            registry
                .resource(&address.resource_type)
                .map(|r| r.validate(&declaration.config, &unknown))
        };
        match found {
            Some(found) => diags.extend(found.with_address(address)),
            None => diags.push(
                Diagnostic::error(
                    "Invalid type",
                    format!("The provider does not support {:?}.", address.resource_type),
                )
                .with_address(address),
            ),
        }

        for dependency in declaration.dependencies() {
            if !declared.contains(&dependency) {
                diags.push(
                    Diagnostic::error(
                        "Reference to undeclared resource",
                        format!("A resource {dependency} has not been declared."),
                    )
                    .with_address(address),
                );
            }
        }
    }
    diags
}
