//! Get command

use console::style;
use kshelf_client::Workflow;

use crate::error::Result;

/// Fetch a package into the local cache
pub async fn run(workflow: &Workflow, name: &str) -> Result<()> {
    println!("{} Fetching {}", style("→").blue(), style(name).yellow());

    let report = workflow.get(name).await?;

    for rejected in &report.rejected {
        println!(
            "  {} Not writing manifest with unsafe name: {}",
            style("⚠").yellow(),
            rejected
        );
    }

    match &report.version {
        Some(version) => println!(
            "{} {} {} written to {} ({} file(s))",
            style("✓").green().bold(),
            name,
            style(version).cyan(),
            report.dir.display(),
            report.written.len()
        ),
        None => println!(
            "{} {} has no releases yet; created {}",
            style("⚠").yellow(),
            name,
            report.dir.display()
        ),
    }

    Ok(())
}
