//! Install command

use console::style;
use kshelf_client::{ApplyVerb, Workflow};

use crate::error::Result;

/// Apply every manifest of a package, then fail if any of them did not apply
pub async fn run(workflow: &Workflow, name: &str, verb: ApplyVerb) -> Result<()> {
    println!(
        "{} Installing {} (kubectl {})",
        style("→").blue(),
        style(name).yellow(),
        verb
    );

    let report = workflow.install(name, verb).await?;

    if let Some(fetched) = &report.fetched {
        let version = fetched.version.as_deref().unwrap_or("no releases");
        println!("  {} Fetched {} ({})", style("↓").blue(), name, version);
    }

    for path in &report.applied {
        println!("  {} {}", style("✓").green(), path.display());
    }
    for failed in &report.failed {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            failed.path.display(),
            failed.error
        );
    }

    report.ensure_success()?;

    println!(
        "{} Installed {} ({} manifest(s))",
        style("✓").green().bold(),
        name,
        report.applied.len()
    );

    Ok(())
}
