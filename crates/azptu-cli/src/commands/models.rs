//! Catalog listing of PTU-capable models.

use anyhow::Result;
use colored::Colorize;

use azptu_core::ConfigCatalog;

pub fn list(catalog: &ConfigCatalog) -> Result<()> {
    println!(
        "Models available for PTU deployment (catalog v{})",
        catalog.version
    );
    println!("{}", "=".repeat(60));

    for (index, model) in catalog.models().iter().enumerate() {
        println!("\n{:2}. {}", index + 1, model.name.bold());
        println!("    Description: {}", model.description);
        println!("    Versions: {}", model.versions.join(", "));

        match catalog.requirement(&model.name) {
            Some(requirement) => {
                println!("    PTU requirements:");
                match requirement.regional_min {
                    Some(min) => println!(
                        "      Regional: {} PTU min (increment {})",
                        min, requirement.regional_increment
                    ),
                    None => println!("      Regional: not available"),
                }
                println!(
                    "      Global/Data Zone: {} PTU min (increment {})",
                    requirement.global_min, requirement.global_increment
                );
            }
            None => println!("    PTU requirements: not defined"),
        }
    }

    println!("\n{} models available", catalog.models().len());
    println!("\n💡 Use 'azptu create' to create a PTU deployment.");
    Ok(())
}
