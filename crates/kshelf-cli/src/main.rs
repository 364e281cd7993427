//! kshelf CLI - fetch, push and install Kubernetes manifest packages

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kshelf_client::{ApplyVerb, ClientConfig, Workflow};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "kshelf")]
#[command(author = "kshelf Contributors")]
#[command(version)]
#[command(about = "Fetch, push and install Kubernetes manifest packages", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry URL
    #[arg(long, global = true, env = "KSHELF_URL")]
    host: Option<String>,

    /// Local cache directory (default: ~/.kshelf)
    #[arg(long, global = true, env = "KSHELF_HOME")]
    homedir: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a package and write its latest release into the local cache
    Get {
        /// Package name
        package: String,
    },

    /// Apply a package's manifests to the cluster, fetching it first if needed
    Install {
        /// Package name
        package: String,

        /// kubectl verb used for each manifest (create or apply)
        #[arg(long, default_value = "create")]
        verb: ApplyVerb,
    },

    /// Upload the cached package directory as a new release
    Push {
        /// Package name
        package: String,

        /// Version label of the new release
        #[arg(id = "release_version", value_name = "VERSION")]
        version: String,
    },

    /// Register a new package from a JSON definition
    Create {
        /// Package definition file
        json_file: PathBuf,
    },

    /// List packages in the registry
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too
            let code = if err.use_stderr() {
                exit_codes::ERROR
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };

    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::resolve(cli.host, cli.homedir);
    tracing::debug!(host = %config.host, home = %config.home.display(), "Resolved configuration");
    let workflow = Workflow::from_config(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("Failed to start runtime: {}", e)))?;

    runtime.block_on(async {
        match cli.command {
            Commands::Get { package } => commands::get::run(&workflow, &package).await,
            Commands::Install { package, verb } => {
                commands::install::run(&workflow, &package, verb).await
            }
            Commands::Push { package, version } => {
                commands::push::run(&workflow, &package, &version).await
            }
            Commands::Create { json_file } => commands::create::run(&workflow, &json_file).await,
            Commands::List { json } => commands::list::run(&workflow, json).await,
        }
    })
}
