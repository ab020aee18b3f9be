//! Static model-requirement and message catalog.
//!
//! The catalog is embedded at compile time and parsed exactly once at
//! startup into a [`ConfigCatalog`] value that callers pass by reference.
//! A parse failure is fatal: there is no partial or default catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PtuError, Result};

const CATALOG_JSON: &str = include_str!("../catalog.json");

/// PTU capacity rules for a single model, per deployment tier.
///
/// `regional_min == None` means the model has no regional tier at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRequirement {
    pub regional_min: Option<u32>,
    pub regional_increment: u32,
    pub global_min: u32,
    pub global_increment: u32,
}

/// A model entry in the ordered catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub description: String,
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    models: Vec<ModelEntry>,
}

/// The static configuration catalog: model requirements, the ordered model
/// list, and localized message templates addressed by `(category, key)`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigCatalog {
    pub version: String,
    ptu_requirements: HashMap<String, ModelRequirement>,
    ptu_models: ModelList,
    messages: HashMap<String, HashMap<String, String>>,
}

impl ConfigCatalog {
    /// Parses the embedded catalog resource.
    ///
    /// # Errors
    ///
    /// Returns [`PtuError::Config`] if the resource is malformed. This is
    /// fatal to the process: no command logic may run without a catalog.
    pub fn load() -> Result<Self> {
        Self::from_json(CATALOG_JSON)
    }

    /// Parses a catalog from a JSON string. Used by `load` and by tests.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| PtuError::config(format!("Failed to parse catalog: {err}")))
    }

    /// Looks up the PTU requirement for an exact model key.
    pub fn requirement(&self, model_key: &str) -> Option<&ModelRequirement> {
        self.ptu_requirements.get(model_key)
    }

    /// Returns the catalog's models in their declared order.
    pub fn models(&self) -> &[ModelEntry] {
        &self.ptu_models.models
    }

    /// Renders a message template addressed by `(category, key)`.
    ///
    /// Named placeholders of the form `{name}` are substituted from `args`.
    /// A missing category or key never fails a command: it renders as a
    /// visible sentinel instead.
    pub fn message(&self, category: &str, key: &str, args: &[(&str, String)]) -> String {
        let Some(template) = self.messages.get(category).and_then(|c| c.get(key)) else {
            return format!("[message not found: {category}.{key}]");
        };

        let mut rendered = template.clone();
        for (name, value) in args {
            rendered = rendered.replace(&format!("{{{name}}}"), value);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_parses() {
        let catalog = ConfigCatalog::load().unwrap();
        assert!(!catalog.version.is_empty());
        assert!(!catalog.models().is_empty());
        assert!(catalog.requirement("gpt-4o").is_some());
    }

    #[test]
    fn malformed_catalog_is_a_config_error() {
        let err = ConfigCatalog::from_json("{not json").unwrap_err();
        assert!(matches!(err, PtuError::Config(_)));
    }

    #[test]
    fn message_substitutes_named_placeholders() {
        let catalog = ConfigCatalog::load().unwrap();
        let rendered = catalog.message(
            "info",
            "stored_resource_group",
            &[("resource_group", "my-rg".to_string())],
        );
        assert!(rendered.contains("my-rg"));
        assert!(!rendered.contains("{resource_group}"));
    }

    #[test]
    fn missing_message_renders_sentinel() {
        let catalog = ConfigCatalog::load().unwrap();
        assert_eq!(
            catalog.message("errors", "no_such_key", &[]),
            "[message not found: errors.no_such_key]"
        );
        assert_eq!(
            catalog.message("no_such_category", "x", &[]),
            "[message not found: no_such_category.x]"
        );
    }

    #[test]
    fn regional_min_may_be_null() {
        let catalog = ConfigCatalog::load().unwrap();
        let req = catalog.requirement("deepseek-r1").unwrap();
        assert_eq!(req.regional_min, None);
        assert!(req.global_min > 0);
    }
}
