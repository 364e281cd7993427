//! Create command - register a package from a JSON definition

use std::path::Path;

use console::style;
use kshelf_client::Workflow;

use crate::error::Result;

/// Register the package described by `json_file`
pub async fn run(workflow: &Workflow, json_file: &Path) -> Result<()> {
    let package = workflow.create(json_file).await?;

    println!(
        "{} Created package {} (id {})",
        style("✓").green().bold(),
        style(&package.name).yellow(),
        package.id
    );
    println!();
    println!("Next steps:");
    println!("  1. Put manifests in {}/{}", workflow.cache().home().display(), package.name);
    println!("  2. Publish them: kshelf push {} <version>", package.name);

    Ok(())
}
