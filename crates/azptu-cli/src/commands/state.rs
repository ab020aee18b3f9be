//! Session-state commands: stored defaults and logoff.

use anyhow::Result;

use azptu_core::{ConfigCatalog, SessionStore};

pub fn set_resource_group(store: &mut SessionStore, resource_group: &str) -> Result<()> {
    store.set_resource_group(resource_group);
    println!("✅ Resource group set to: {resource_group}");
    println!("PTU commands no longer need --resource-group.");
    Ok(())
}

pub fn set_subscription(store: &mut SessionStore, subscription: &str) -> Result<()> {
    store.set_subscription(subscription);
    println!("✅ Subscription set to: {subscription}");
    println!("PTU commands no longer need --subscription-id.");
    Ok(())
}

/// Shows the stored defaults through the message catalog.
pub fn show_config(catalog: &ConfigCatalog, store: &SessionStore) -> Result<()> {
    println!("\n{}", catalog.message("info", "state_info", &[]));
    println!("{}", "-".repeat(50));

    let resource_group = store.resource_group();
    let subscription = store.subscription();

    match &resource_group {
        Some(resource_group) => println!(
            "{}",
            catalog.message(
                "info",
                "stored_resource_group",
                &[("resource_group", resource_group.clone())],
            )
        ),
        None => println!("Resource Group: (not set)"),
    }

    match &subscription {
        Some(subscription) => println!(
            "{}",
            catalog.message(
                "info",
                "stored_subscription",
                &[("subscription", subscription.clone())],
            )
        ),
        None => println!("Subscription: (not set)"),
    }

    if resource_group.is_none() && subscription.is_none() {
        println!("\n{}", catalog.message("info", "no_stored_values", &[]));
        println!("Use 'azptu set-resource-group' and 'azptu set-subscription' to store defaults.");
    }
    Ok(())
}

/// Clears every stored entry and removes the state file.
pub fn logoff(store: &mut SessionStore) -> Result<()> {
    store.clear();
    println!("✅ Session state cleared.");
    println!("  - current project removed");
    println!("  - project cache cleared");
    println!("  - resource group removed");
    println!("  - subscription removed");
    println!("  - state file deleted");
    Ok(())
}
