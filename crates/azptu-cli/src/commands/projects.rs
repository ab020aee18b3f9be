//! Project listing and selection.

use anyhow::Result;
use colored::Colorize;

use azptu_client::projects;
use azptu_core::{ProjectSummary, SessionStore};

fn print_projects(projects: &[ProjectSummary]) {
    for (index, project) in projects.iter().enumerate() {
        let marker = if matches!(project.kind.as_str(), "AIServices" | "OpenAI") {
            "✓".green()
        } else {
            "?".yellow()
        };
        println!("{:2}. {} {}", index + 1, marker, project.name.bold());
        println!("    Resource Group: {}", project.resource_group);
        println!("    Location: {}", project.location);
        println!("    Kind: {}", project.kind);
        if let Some(endpoint) = &project.endpoint {
            println!("    Endpoint: {endpoint}");
        }
        println!();
    }
}

fn print_current_project(store: &SessionStore) {
    match store.current_project() {
        Some(project) => println!("Current project: {}", project.name.bold()),
        None => {
            println!("No default project set.");
            println!("Use 'azptu set-project <name>' to set one.");
        }
    }
}

/// Lists AI projects, serving from the session cache when it is still fresh.
pub async fn list(store: &mut SessionStore) -> Result<()> {
    let cached = store.projects_cache();

    if !cached.is_empty() {
        println!("Available AI projects (cache):");
        println!("{}", "-".repeat(40));
        print_projects(&cached);
    } else {
        println!("Looking up available AI projects...");
        let found = projects::list_projects().await?;
        store.set_projects_cache(&found);

        if found.is_empty() {
            println!("No AI projects found in the subscription.");
        } else {
            println!("Found {} AI projects:", found.len());
            println!("{}", "-".repeat(40));
            print_projects(&found);
        }
    }

    print_current_project(store);
    Ok(())
}

/// Sets the default project, pulling its endpoint from the cache when known.
pub fn set(store: &mut SessionStore, project_name: &str, endpoint: Option<String>) -> Result<()> {
    let cached = store.projects_cache();
    let known = cached.iter().find(|project| project.name == project_name);

    if known.is_none() {
        println!(
            "{} Project '{}' not found in the cache.",
            "Warning:".yellow(),
            project_name
        );
        println!("Run 'azptu list-projects' first or double-check the name.");
    }

    let endpoint = endpoint.or_else(|| known.and_then(|project| project.endpoint.clone()));
    store.set_current_project(project_name, endpoint.clone());

    println!("✅ Project set to: {}", project_name.bold());
    if let Some(endpoint) = endpoint {
        println!("   Endpoint: {endpoint}");
    }
    Ok(())
}
