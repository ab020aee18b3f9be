//! Shared data model for deployments and projects.

use serde::{Deserialize, Serialize};

use crate::tier::DeploymentTier;

/// Fully resolved addressing for a deployment operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentScope {
    pub subscription_id: String,
    pub resource_group: String,
    pub account_name: String,
}

/// A request to create a PTU deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub deployment_name: String,
    pub model_name: String,
    pub model_version: String,
    pub capacity: u32,
    pub tier: DeploymentTier,
}

/// A read-only projection of remote deployment state.
///
/// Never locally authoritative and never cached: every field reflects the
/// last remote response, with `None` where the platform omitted a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub name: String,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
    pub model_format: Option<String>,
    pub sku_name: Option<String>,
    pub capacity: Option<u32>,
    pub provisioning_state: Option<String>,
}

/// One entry of the cached project (AI Services account) list.
///
/// Field names mirror the resource-listing tool's JSON projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    #[serde(rename = "resourceGroup")]
    pub resource_group: String,
    pub location: String,
    pub kind: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}
