//! Human and JSON rendering for CLI results.

use clap::ValueEnum;
use pcbuilder::{
    CompatibilityReport, Component, Configuration, InventoryReport, RulesEngine,
};
use serde_json::{json, Value};

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn print_json(value: serde_json::Result<String>) {
    match value {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: failed to serialize output: {}", e),
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn configuration_json(config: &Configuration) -> Value {
    json!({
        "id": config.id,
        "name": config.name,
        "created_at": config.created_at.to_rfc3339(),
        "status": config.status,
        "total_price": config.total_price(),
        "recorded_total": config.recorded_total,
        "components": config.components,
    })
}

pub fn print_components(components: &[Component], format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(serde_json::to_string_pretty(components)),
        OutputFormat::Human => {
            if components.is_empty() {
                println!("No components found");
                return;
            }
            println!(
                "{:>4}  {:<32} {:<13} {:>10} {:>5}  {:<8} {:<6} {:<12} {:>6}",
                "ID", "Name", "Type", "Price", "Qty", "Socket", "Memory", "Form factor", "Watts"
            );
            println!("{}", "─".repeat(108));
            for c in components {
                println!(
                    "{:>4}  {:<32} {:<13} {:>10.2} {:>5}  {:<8} {:<6} {:<12} {:>6}",
                    c.id.map(|id| id.to_string()).unwrap_or_default(),
                    c.name,
                    c.kind,
                    c.price,
                    c.quantity,
                    or_dash(c.socket.as_deref()),
                    or_dash(c.memory_type.as_deref()),
                    or_dash(c.form_factor.as_deref()),
                    c.power_watts.map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
                );
            }
            println!("\n{} component(s)", components.len());
        }
    }
}

pub fn print_component_saved(action: &str, component: &Component, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(serde_json::to_string_pretty(component)),
        OutputFormat::Human => println!(
            "{} component {}: {} ({}, {:.2})",
            action,
            component.id.unwrap_or_default(),
            component.name,
            component.kind,
            component.price
        ),
    }
}

pub fn print_removed(entity: &str, id: i64, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(serde_json::to_string_pretty(&json!({
            "removed": entity.to_lowercase(),
            "id": id,
        }))),
        OutputFormat::Human => println!("Removed {} {}", entity.to_lowercase(), id),
    }
}

pub fn print_seeded(inserted: usize, format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            print_json(serde_json::to_string_pretty(&json!({ "inserted": inserted })))
        }
        OutputFormat::Human if inserted == 0 => {
            println!("Catalog already has components; sample data not loaded")
        }
        OutputFormat::Human => println!("Loaded {} sample components", inserted),
    }
}

pub fn print_inventory(report: &InventoryReport, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(serde_json::to_string_pretty(report)),
        OutputFormat::Human => {
            println!("Inventory");
            println!("{}", "─".repeat(60));
            println!(
                "  {:<16} {:>10} {:>8} {:>14}",
                "Type", "Components", "Units", "Value"
            );
            for kind in &report.kinds {
                println!(
                    "  {:<16} {:>10} {:>8} {:>14.2}",
                    kind.kind, kind.components, kind.units, kind.value
                );
            }
            println!(
                "  {:<16} {:>10} {:>8} {:>14.2}",
                "Total", report.total_components, report.total_units, report.total_value
            );

            if report.low_stock.is_empty() {
                println!(
                    "\n  No components below {} units",
                    report.low_stock_threshold
                );
            } else {
                println!("\n  Low stock (< {} units):", report.low_stock_threshold);
                for c in &report.low_stock {
                    println!("    - {} ({}): {} left", c.name, c.kind, c.quantity);
                }
            }
        }
    }
}

pub fn print_created_configuration(
    config: &Configuration,
    skipped: &[i64],
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let mut value = configuration_json(config);
            value["skipped_ids"] = json!(skipped);
            print_json(serde_json::to_string_pretty(&value));
        }
        OutputFormat::Human => {
            println!(
                "Created configuration {}: {}",
                config.id.unwrap_or_default(),
                config.name
            );
            for c in &config.components {
                println!("  - {} ({}) {:.2}", c.name, c.kind, c.price);
            }
            println!("  Total: {:.2}", config.total_price());
            if !skipped.is_empty() {
                let ids: Vec<String> = skipped.iter().map(|id| id.to_string()).collect();
                println!("  Skipped unknown component ids: {}", ids.join(", "));
            }
        }
    }
}

pub fn print_configurations(configs: &[Configuration], format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            let values: Vec<Value> = configs.iter().map(configuration_json).collect();
            print_json(serde_json::to_string_pretty(&values));
        }
        OutputFormat::Human => {
            if configs.is_empty() {
                println!("No configurations found");
                return;
            }
            for config in configs {
                println!(
                    "{:>4}  {:<28} {:<12} {:>10.2}  {}",
                    config.id.map(|id| id.to_string()).unwrap_or_default(),
                    config.name,
                    config.status,
                    config.total_price(),
                    config.created_at.format("%Y-%m-%d %H:%M"),
                );
                let names: Vec<&str> = config.components.iter().map(|c| c.name.as_str()).collect();
                if !names.is_empty() {
                    println!("        {}", names.join(", "));
                }
            }
        }
    }
}

pub fn print_report(report: &CompatibilityReport, format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            let output = json!({
                "configuration_id": report.configuration_id,
                "configuration_name": report.configuration_name,
                "status": report.status(),
                "issues": report.issues,
                "stats": report.stats,
            });
            print_json(serde_json::to_string_pretty(&output));
        }
        OutputFormat::Human => print_report_human(report),
    }
}

fn print_report_human(report: &CompatibilityReport) {
    match (&report.configuration_id, &report.configuration_name) {
        (Some(id), Some(name)) => println!("\nConfiguration {}: {}", id, name),
        _ => println!("\nComponents"),
    }
    println!("{}", "─".repeat(60));

    if report.issues.is_empty() {
        println!("  ✅ No compatibility issues found");
    }

    for issue in &report.issues {
        println!("  {}", issue);
        if !issue.components.is_empty() {
            println!("      Components: {}", issue.components.join(", "));
        }
        if let Some(suggestion) = &issue.suggestion {
            println!("      Suggestion: {}", suggestion);
        }
    }

    println!("\n  Status: {}", report.status());
    println!("  Summary:");
    println!("    Errors:   {}", report.stats.errors);
    println!("    Warnings: {}", report.stats.warnings);
    println!("    Info:     {}", report.stats.info);
}

pub fn print_rules(verbose: bool, format: &OutputFormat) {
    let engine = RulesEngine::new();
    match format {
        OutputFormat::Json => {
            let rules: Vec<Value> = engine
                .rules()
                .map(|rule| {
                    json!({
                        "id": rule.id(),
                        "name": rule.name(),
                        "description": rule.description(),
                    })
                })
                .collect();
            print_json(serde_json::to_string_pretty(&rules));
        }
        OutputFormat::Human => {
            println!("Available compatibility rules:\n");
            for rule in engine.rules() {
                println!("  {}", rule.id());
                println!("    {}", rule.name());
                if verbose {
                    println!("    {}", rule.description());
                }
                println!();
            }
        }
    }
}
