//! PTU deployment lifecycle commands.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use dialoguer::Confirm;

use azptu_client::{ArmClient, AzureCliCredential, DeploymentOrchestrator, resolve_scope};
use azptu_core::{
    ConfigCatalog, DeploymentRecord, DeploymentRequest, DeploymentScope, DeploymentTier,
    SessionStore,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    Regional,
    Global,
    DataZone,
}

impl From<TierArg> for DeploymentTier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Regional => DeploymentTier::Regional,
            TierArg::Global => DeploymentTier::Global,
            TierArg::DataZone => DeploymentTier::DataZone,
        }
    }
}

#[derive(Args)]
pub struct ScopeArgs {
    /// Azure subscription id (falls back to the stored default)
    #[arg(long)]
    pub subscription_id: Option<String>,
    /// Resource group name (falls back to the stored default)
    #[arg(long)]
    pub resource_group: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Name of the Azure AI Services account
    #[arg(long)]
    pub account_name: String,
    /// Name of the deployment to create
    #[arg(long)]
    pub deployment_name: String,
    /// Model name (e.g. gpt-4o, gpt-4o-mini)
    #[arg(long)]
    pub model_name: String,
    /// Model version (e.g. 2024-08-06)
    #[arg(long)]
    pub model_version: String,
    /// PTU capacity (must satisfy the model's minimum and increment)
    #[arg(long)]
    pub capacity: u32,
    /// Deployment tier
    #[arg(long = "deployment-type", value_enum, default_value = "regional")]
    pub deployment_type: TierArg,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Name of the Azure AI Services account
    #[arg(long)]
    pub account_name: String,
    /// Name of the deployment to update
    #[arg(long)]
    pub deployment_name: String,
    /// New PTU capacity
    #[arg(long)]
    pub new_capacity: u32,
    /// Deployment tier
    #[arg(long = "deployment-type", value_enum, default_value = "regional")]
    pub deployment_type: TierArg,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Name of the Azure AI Services account
    #[arg(long)]
    pub account_name: String,
    /// Name of the deployment to delete
    #[arg(long)]
    pub deployment_name: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Name of the Azure AI Services account
    #[arg(long)]
    pub account_name: String,
    /// Name of the deployment to inspect
    #[arg(long)]
    pub deployment_name: String,
}

#[derive(Args)]
pub struct ListDeploymentsArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Account to list (defaults to the current project)
    #[arg(long)]
    pub account_name: Option<String>,
}

fn display(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Unknown")
}

fn print_record(record: &DeploymentRecord) {
    println!("Name: {}", record.name.bold());
    println!("Model: {}", display(&record.model_name));
    println!("Version: {}", display(&record.model_version));
    println!("Format: {}", display(&record.model_format));
    println!("SKU: {}", display(&record.sku_name));
    match record.capacity {
        Some(capacity) => println!("Capacity: {capacity} PTUs"),
        None => println!("Capacity: Unknown"),
    }
    println!("State: {}", display(&record.provisioning_state));
}

fn scope_of(store: &SessionStore, args: ScopeArgs, account_name: String) -> Result<DeploymentScope> {
    Ok(resolve_scope(
        store,
        args.subscription_id,
        args.resource_group,
        account_name,
    )?)
}

fn arm_client() -> ArmClient {
    ArmClient::new(Arc::new(AzureCliCredential::new()))
}

pub async fn create(
    catalog: &ConfigCatalog,
    store: &mut SessionStore,
    args: CreateArgs,
) -> Result<()> {
    let tier: DeploymentTier = args.deployment_type.into();
    let scope = scope_of(store, args.scope, args.account_name)?;

    println!("Creating PTU deployment '{}'...", args.deployment_name.bold());
    println!("  Resource Group: {}", scope.resource_group);
    println!("  AI Services: {}", scope.account_name);
    println!("  Model: {} v{}", args.model_name, args.model_version);
    println!("  Capacity: {} PTUs", args.capacity);
    println!("  Tier: {tier}");

    let client = arm_client();
    let orchestrator = DeploymentOrchestrator::new(catalog, &client);
    let request = DeploymentRequest {
        deployment_name: args.deployment_name.clone(),
        model_name: args.model_name,
        model_version: args.model_version,
        capacity: args.capacity,
        tier,
    };
    let record = orchestrator.create(&scope, &request).await?;

    println!(
        "\n✅ Deployment '{}' created successfully!",
        args.deployment_name.bold()
    );
    print_record(&record);
    Ok(())
}

pub async fn update_capacity(
    catalog: &ConfigCatalog,
    store: &mut SessionStore,
    args: UpdateArgs,
) -> Result<()> {
    let tier: DeploymentTier = args.deployment_type.into();
    let scope = scope_of(store, args.scope, args.account_name)?;

    println!(
        "Updating capacity of deployment '{}' to {} PTUs...",
        args.deployment_name.bold(),
        args.new_capacity
    );

    let client = arm_client();
    let orchestrator = DeploymentOrchestrator::new(catalog, &client);
    let record = orchestrator
        .update_capacity(&scope, &args.deployment_name, args.new_capacity, tier)
        .await?;

    println!(
        "\n✅ Capacity of '{}' updated successfully!",
        args.deployment_name.bold()
    );
    print_record(&record);
    Ok(())
}

pub async fn delete(
    catalog: &ConfigCatalog,
    store: &mut SessionStore,
    args: DeleteArgs,
) -> Result<()> {
    let scope = scope_of(store, args.scope, args.account_name)?;
    let client = arm_client();
    let orchestrator = DeploymentOrchestrator::new(catalog, &client);

    println!(
        "Preparing to delete deployment '{}'...",
        args.deployment_name.bold()
    );

    // Best effort: show what is about to be deleted.
    if let Ok(Some(record)) = orchestrator.get_info(&scope, &args.deployment_name).await {
        println!();
        print_record(&record);
        println!();
    }

    if !args.force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Really delete deployment '{}'?",
                args.deployment_name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    println!("Deleting deployment '{}'...", args.deployment_name);
    orchestrator.delete(&scope, &args.deployment_name).await?;

    println!(
        "✅ Deployment '{}' deleted. The PTU capacity was released back to the region.",
        args.deployment_name.bold()
    );
    Ok(())
}

pub async fn info(
    catalog: &ConfigCatalog,
    store: &mut SessionStore,
    args: InfoArgs,
) -> Result<()> {
    let scope = scope_of(store, args.scope, args.account_name)?;
    let client = arm_client();
    let orchestrator = DeploymentOrchestrator::new(catalog, &client);

    println!("Fetching deployment '{}'...", args.deployment_name);
    match orchestrator.get_info(&scope, &args.deployment_name).await? {
        Some(record) => {
            println!("\n=== PTU Deployment ===");
            print_record(&record);
            println!("Resource Group: {}", scope.resource_group);
            println!("AI Services: {}", scope.account_name);
        }
        None => println!("Deployment '{}' not found.", args.deployment_name),
    }
    Ok(())
}

pub async fn list(
    catalog: &ConfigCatalog,
    store: &mut SessionStore,
    args: ListDeploymentsArgs,
) -> Result<()> {
    let account_name = match args.account_name {
        Some(account_name) => account_name,
        None => store
            .current_project()
            .map(|project| project.name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No account specified and no default project set. \
                     Use --account-name or 'azptu set-project'."
                )
            })?,
    };
    let scope = scope_of(store, args.scope, account_name)?;

    println!("Deployments in account: {}", scope.account_name.bold());
    println!("{}", "=".repeat(50));

    let client = arm_client();
    let orchestrator = DeploymentOrchestrator::new(catalog, &client);
    let records = orchestrator.list(&scope).await?;

    if records.is_empty() {
        println!("No deployments found.");
    } else {
        for (index, record) in records.iter().enumerate() {
            let capacity = record
                .capacity
                .map(|c| format!("{c} PTUs"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:2}. {}  {} {}  [{}] {}",
                index + 1,
                record.name.bold(),
                display(&record.model_name),
                display(&record.model_version),
                capacity,
                display(&record.provisioning_state),
            );
        }
    }
    Ok(())
}
