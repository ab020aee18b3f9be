use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use azptu_core::{ConfigCatalog, SessionStore};

mod commands;

use commands::deployments::{CreateArgs, DeleteArgs, InfoArgs, ListDeploymentsArgs, UpdateArgs};

#[derive(Parser)]
#[command(name = "azptu")]
#[command(version, about = "Manage PTU deployments on Azure AI Foundry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List AI projects available in the current subscription
    ListProjects,
    /// Set the default project for subsequent commands
    SetProject {
        project_name: String,
        /// Project endpoint (taken from the cache when omitted)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Set the default resource group for PTU commands
    SetResourceGroup { resource_group: String },
    /// Set the default subscription for PTU commands
    SetSubscription { subscription: String },
    /// List deployments in an AI Services account
    ListDeployments(ListDeploymentsArgs),
    /// List the models available for PTU deployment, with capacity rules
    ListModels,
    /// Show the stored session defaults
    ShowConfig,
    /// Clear all stored session state
    Logoff,
    /// Create a new PTU deployment
    Create(CreateArgs),
    /// Update the capacity of an existing PTU deployment
    UpdateCapacity(UpdateArgs),
    /// Delete a PTU deployment
    Delete(DeleteArgs),
    /// Show detailed information about a PTU deployment
    Info(InfoArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{} {err:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // The catalog is fatal: no command logic runs without it.
    let catalog = ConfigCatalog::load().context("cannot start without a valid catalog")?;
    let mut store = SessionStore::open_default();

    match cli.command {
        Commands::ListProjects => commands::projects::list(&mut store).await,
        Commands::SetProject {
            project_name,
            endpoint,
        } => commands::projects::set(&mut store, &project_name, endpoint),
        Commands::SetResourceGroup { resource_group } => {
            commands::state::set_resource_group(&mut store, &resource_group)
        }
        Commands::SetSubscription { subscription } => {
            commands::state::set_subscription(&mut store, &subscription)
        }
        Commands::ListDeployments(args) => {
            commands::deployments::list(&catalog, &mut store, args).await
        }
        Commands::ListModels => commands::models::list(&catalog),
        Commands::ShowConfig => commands::state::show_config(&catalog, &store),
        Commands::Logoff => commands::state::logoff(&mut store),
        Commands::Create(args) => commands::deployments::create(&catalog, &mut store, args).await,
        Commands::UpdateCapacity(args) => {
            commands::deployments::update_capacity(&catalog, &mut store, args).await
        }
        Commands::Delete(args) => commands::deployments::delete(&catalog, &mut store, args).await,
        Commands::Info(args) => commands::deployments::info(&catalog, &mut store, args).await,
    }
}
