//! Deployment tiers and their SKU mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placement class of a PTU deployment.
///
/// Each tier has distinct minimum-capacity and increment rules; Global and
/// Data Zone share one rule set ("global bucket") while Regional has its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentTier {
    Regional,
    Global,
    DataZone,
}

/// Which requirement columns apply to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierBucket {
    Regional,
    Global,
}

impl DeploymentTier {
    /// Parses a tier string leniently, matching the legacy classification:
    /// `global`, `data-zone` and `datazone` (any case) select their tiers,
    /// every other string is treated as Regional.
    pub fn from_str_lenient(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "global" => Self::Global,
            "data-zone" | "datazone" => Self::DataZone,
            _ => Self::Regional,
        }
    }

    /// The requirement bucket this tier validates against.
    pub fn bucket(self) -> TierBucket {
        match self {
            Self::Regional => TierBucket::Regional,
            Self::Global | Self::DataZone => TierBucket::Global,
        }
    }

    /// The remote platform's SKU identifier for this tier.
    pub fn sku_name(self) -> &'static str {
        match self {
            Self::Regional => "ProvisionedManaged",
            Self::Global => "GlobalProvisionedManaged",
            Self::DataZone => "DataZoneProvisionedManaged",
        }
    }

    /// Human-readable tier name used in validation messages.
    pub fn type_name(self) -> &'static str {
        match self.bucket() {
            TierBucket::Regional => "Regional",
            TierBucket::Global => "Global/Data Zone",
        }
    }
}

impl fmt::Display for DeploymentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Regional => "regional",
            Self::Global => "global",
            Self::DataZone => "data-zone",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_aliases_select_the_global_bucket() {
        for alias in ["global", "Global", "data-zone", "DATA-ZONE", "datazone"] {
            assert_eq!(
                DeploymentTier::from_str_lenient(alias).bucket(),
                TierBucket::Global,
                "alias {alias:?}"
            );
        }
    }

    #[test]
    fn anything_else_selects_the_regional_bucket() {
        for other in ["regional", "Regional", "", "zone", "GLOBAL2"] {
            assert_eq!(
                DeploymentTier::from_str_lenient(other).bucket(),
                TierBucket::Regional,
                "input {other:?}"
            );
        }
    }

    #[test]
    fn sku_names_match_the_platform() {
        assert_eq!(DeploymentTier::Regional.sku_name(), "ProvisionedManaged");
        assert_eq!(DeploymentTier::Global.sku_name(), "GlobalProvisionedManaged");
        assert_eq!(
            DeploymentTier::DataZone.sku_name(),
            "DataZoneProvisionedManaged"
        );
    }
}
