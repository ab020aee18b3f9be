//! PTU capacity validation.
//!
//! Pure functions over [`ConfigCatalog`] data; no state. Validation runs
//! before any remote call, so an invalid request never mutates anything
//! remotely.

use crate::catalog::{ConfigCatalog, ModelRequirement};
use crate::error::ValidationKind;
use crate::tier::{DeploymentTier, TierBucket};

/// Outcome of capacity validation. Callers branch on the variant instead of
/// catching an exception-style error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid {
        kind: ValidationKind,
        message: String,
    },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Resolves a model name to a requirement entry, trying the documented
/// variants in order: exact, lowercase, `_`->`-`, `-`->`_`, then the two
/// lowercased separator swaps. First hit wins.
fn resolve_requirement<'a>(
    catalog: &'a ConfigCatalog,
    model_name: &str,
) -> Option<&'a ModelRequirement> {
    if let Some(req) = catalog.requirement(model_name) {
        return Some(req);
    }

    let candidates = [
        model_name.to_lowercase(),
        model_name.replace('_', "-"),
        model_name.replace('-', "_"),
        model_name.to_lowercase().replace('_', "-"),
        model_name.to_lowercase().replace('-', "_"),
    ];

    candidates
        .iter()
        .find_map(|candidate| catalog.requirement(candidate))
}

/// Validates a requested PTU capacity against the model's rules for a tier.
///
/// A model absent from the requirement table (after name normalization)
/// passes unconditionally: capacity limits for unlisted models are left to
/// the remote platform to enforce.
pub fn validate(
    catalog: &ConfigCatalog,
    model_name: &str,
    capacity: u32,
    tier: DeploymentTier,
) -> Validation {
    let Some(requirement) = resolve_requirement(catalog, model_name) else {
        return Validation::Valid;
    };

    let (min_capacity, increment) = match tier.bucket() {
        TierBucket::Global => (requirement.global_min, requirement.global_increment),
        TierBucket::Regional => {
            let Some(regional_min) = requirement.regional_min else {
                return Validation::Invalid {
                    kind: ValidationKind::UnsupportedTier,
                    message: catalog.message(
                        "errors",
                        "model_not_support_regional",
                        &[("model_name", model_name.to_string())],
                    ),
                };
            };
            (regional_min, requirement.regional_increment)
        }
    };

    if capacity < min_capacity {
        return Validation::Invalid {
            kind: ValidationKind::MinCapacity,
            message: catalog.message(
                "errors",
                "min_capacity_error",
                &[
                    ("model_name", model_name.to_string()),
                    ("type_name", tier.type_name().to_string()),
                    ("min_capacity", min_capacity.to_string()),
                    ("capacity", capacity.to_string()),
                ],
            ),
        };
    }

    if (capacity - min_capacity) % increment != 0 {
        return Validation::Invalid {
            kind: ValidationKind::IncrementMismatch,
            message: catalog.message(
                "errors",
                "increment_error",
                &[
                    ("model_name", model_name.to_string()),
                    ("type_name", tier.type_name().to_string()),
                    ("increment", increment.to_string()),
                    ("capacity", capacity.to_string()),
                ],
            ),
        };
    }

    Validation::Valid
}
