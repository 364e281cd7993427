//! Push command - upload the cached package directory as a release

use console::style;
use kshelf_client::Workflow;

use crate::error::Result;

/// Push the package directory as `version`
pub async fn run(workflow: &Workflow, name: &str, version: &str) -> Result<()> {
    println!(
        "{} Pushing {} {}",
        style("→").blue(),
        style(name).yellow(),
        style(version).cyan()
    );

    let report = workflow.push(name, version).await?;

    for skipped in &report.skipped {
        println!(
            "  {} Skipped {}: {}",
            style("⚠").yellow(),
            skipped.path.display(),
            skipped.reason
        );
    }
    for manifest in &report.included {
        println!("  {} {}", style("+").green(), manifest);
    }

    println!(
        "{} Pushed {} {} ({} manifest(s), {} release(s) total)",
        style("✓").green().bold(),
        name,
        version,
        report.included.len(),
        report.package.releases.len()
    );

    Ok(())
}
