//! List command

use console::style;
use kshelf_client::Workflow;

use crate::error::{CliError, Result};

/// Print every package known to the registry
pub async fn run(workflow: &Workflow, json_output: bool) -> Result<()> {
    let results = workflow.list().await?;

    if json_output {
        let json = serde_json::to_string_pretty(&results)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    if results.results.is_empty() {
        println!("No packages found.");
        return Ok(());
    }

    println!(
        "{:<30} {:<12} {:<9} DESCRIPTION",
        style("NAME").bold(),
        style("LATEST").bold(),
        style("RELEASES").bold()
    );

    for package in &results.results {
        let latest = package
            .latest_release()
            .map(|r| r.version.as_str())
            .unwrap_or("-");
        let description: String = package.description.chars().take(40).collect();

        println!(
            "{:<30} {:<12} {:<9} {}",
            package.name,
            latest,
            package.releases.len(),
            description
        );
    }

    println!();
    println!("Total: {} package(s)", results.total);

    Ok(())
}
