//! Check a build from the sample catalog and print the report.
//!
//! Usage: cargo run --example check_build [component ids...]

use pcbuilder::prelude::*;

fn main() -> Result<(), PcBuilderError> {
    let ids: Vec<i64> = std::env::args()
        .skip(1)
        .filter_map(|arg| arg.parse().ok())
        .collect();
    let ids = if ids.is_empty() {
        vec![1, 3, 5, 6, 7, 8]
    } else {
        ids
    };

    let db = Database::open_in_memory()?;
    db.seed_sample_data()?;

    let config = db.create_configuration("Example build", &ids)?;
    println!("Configuration: {}", config.name);
    for component in &config.components {
        println!("  {} ({}) {:.2}", component.name, component.kind, component.price);
    }
    println!("Total: {:.2}\n", config.total_price());

    let report = PcBuilderCore::check_configuration(&config);
    if report.issues.is_empty() {
        println!("No compatibility issues found.");
    }
    for issue in &report.issues {
        println!("{}", issue);
        if let Some(ref suggestion) = issue.suggestion {
            println!("    {}", suggestion);
        }
    }

    if report.has_errors() {
        println!("\nBuild is incompatible.");
        std::process::exit(1);
    }
    Ok(())
}
