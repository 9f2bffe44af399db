//! Offline commands: region catalog and schemas

use crate::provider::{Provider, provider_schema};
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::Schema;
use quismon::regions::{self, DEPRECATED_CODES};

pub fn regions(check: Option<&str>) -> Result<()> {
    if let Some(code) = check {
        return check_region(code);
    }

    ui::header("Probe Regions");
    for region in regions::catalog() {
        let legacy = if region.legacy {
            " (legacy)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {:<18} {}{legacy}", region.code.bold(), region.display_name);
    }
    println!();
    ui::dim(&format!(
        "Deprecated codes still accepted: {}",
        DEPRECATED_CODES.join(", ")
    ));
    Ok(())
}

fn check_region(code: &str) -> Result<()> {
    regions::validate_region(code)?;
    match regions::find(code) {
        Some(region) if region.legacy => {
            ui::warn(&format!("{code} is a legacy region ({})", region.display_name));
        }
        Some(region) => ui::success(&format!("{code}: {}", region.display_name)),
        None => ui::warn(&format!(
            "{code} is deprecated; choose a code from `quismon-iac regions`"
        )),
    }
    Ok(())
}

fn print_schema(kind: &str, name: &str, schema: &Schema) {
    ui::section(&format!("{kind} {name}"));
    if !schema.description.is_empty() {
        ui::dim(schema.description);
    }
    for attribute in &schema.attributes {
        println!(
            "  {:<28} {:<14} {}",
            attribute.name,
            attribute.kind.to_string(),
            attribute.flags().dimmed()
        );
        if !attribute.description.is_empty() {
            ui::dim(&format!("  {}", attribute.description));
        }
    }
}

pub fn schema(type_name: Option<&str>) -> Result<()> {
    let provider = Provider::offline()?;
    let wanted = |name: &str| type_name.is_none_or(|t| t == name);
    let mut shown = 0;

    if wanted("provider") {
        print_schema("provider", "quismon", &provider_schema());
        shown += 1;
    }
    for resource in provider.resources() {
        if wanted(resource.type_name()) {
            print_schema("resource", resource.type_name(), &resource.schema());
            shown += 1;
        }
    }
    for source in provider.data_sources() {
        if wanted(source.type_name()) {
            print_schema("data", source.type_name(), &source.schema());
            shown += 1;
        }
    }

    if shown == 0 {
        bail!("Unknown resource or data source type {:?}", type_name.unwrap_or_default());
    }
    Ok(())
}
