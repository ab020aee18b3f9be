//! Remote management boundary: the Cognitive Services deployments API.
//!
//! [`ManagementClient`] is the seam the orchestrator talks through;
//! [`ArmClient`] is the real implementation against the Azure management
//! plane. Create and delete are long-running operations: the client polls
//! the deployment's `provisioningState` to a terminal value before
//! returning. There is no retry or backoff on transient failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use azptu_core::{DeploymentRecord, DeploymentScope, PtuError, Result};

use crate::classify::{classify_status, classify_transport};
use crate::credential::TokenCredential;

const DEFAULT_BASE_URL: &str = "https://management.azure.com";
const API_VERSION: &str = "2024-10-01";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The payload of a create-or-update submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSpec {
    pub sku_name: String,
    pub capacity: u32,
    pub model_format: String,
    pub model_name: String,
    pub model_version: String,
}

/// Operations the orchestrator needs from the remote platform.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Submits a create-or-update and blocks until the operation is terminal.
    async fn create_or_update(
        &self,
        scope: &DeploymentScope,
        deployment_name: &str,
        spec: &DeploymentSpec,
    ) -> Result<DeploymentRecord>;

    /// Fetches a deployment. A missing deployment is a classified
    /// [`PtuError::NotFound`]; the orchestrator decides whether that is an
    /// error for the operation at hand.
    async fn get(&self, scope: &DeploymentScope, deployment_name: &str)
        -> Result<DeploymentRecord>;

    /// Submits a deletion and blocks until the deployment is gone.
    async fn delete(&self, scope: &DeploymentScope, deployment_name: &str) -> Result<()>;

    /// Lists the account's deployments.
    async fn list(&self, scope: &DeploymentScope) -> Result<Vec<DeploymentRecord>>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PutDeployment<'a> {
    sku: PutSku<'a>,
    properties: PutProperties<'a>,
}

#[derive(Serialize)]
struct PutSku<'a> {
    name: &'a str,
    capacity: u32,
}

#[derive(Serialize)]
struct PutProperties<'a> {
    model: PutModel<'a>,
}

#[derive(Serialize)]
struct PutModel<'a> {
    format: &'a str,
    name: &'a str,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
struct ArmDeployment {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sku: Option<ArmSku>,
    #[serde(default)]
    properties: Option<ArmProperties>,
}

#[derive(Debug, Deserialize)]
struct ArmSku {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    capacity: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ArmProperties {
    #[serde(default)]
    model: Option<ArmModel>,
    #[serde(rename = "provisioningState", default)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArmModel {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArmDeploymentList {
    #[serde(default)]
    value: Vec<ArmDeployment>,
}

impl ArmDeployment {
    fn into_record(self, fallback_name: &str) -> DeploymentRecord {
        let (model, provisioning_state) = match self.properties {
            Some(props) => (props.model, props.provisioning_state),
            None => (None, None),
        };
        let (model_format, model_name, model_version) = match model {
            Some(model) => (model.format, model.name, model.version),
            None => (None, None, None),
        };
        let (sku_name, capacity) = match self.sku {
            Some(sku) => (sku.name, sku.capacity),
            None => (None, None),
        };
        DeploymentRecord {
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            model_name,
            model_version,
            model_format,
            sku_name,
            capacity,
            provisioning_state,
        }
    }
}

fn is_terminal(state: &str) -> bool {
    matches!(state, "Succeeded" | "Failed" | "Canceled")
}

// ---------------------------------------------------------------------------
// ARM implementation
// ---------------------------------------------------------------------------

/// Management client over the Azure Resource Manager REST API.
pub struct ArmClient {
    http: Client,
    credential: Arc<dyn TokenCredential>,
    base_url: String,
    poll_interval: Duration,
}

impl ArmClient {
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            http: Client::new(),
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the management endpoint (tests, sovereign clouds).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the interval between provisioning-state polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn deployments_url(&self, scope: &DeploymentScope) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.CognitiveServices/accounts/{}/deployments",
            self.base_url, scope.subscription_id, scope.resource_group, scope.account_name
        )
    }

    fn deployment_url(&self, scope: &DeploymentScope, deployment_name: &str) -> String {
        format!("{}/{}", self.deployments_url(scope), deployment_name)
    }

    /// Re-fetches the deployment until its provisioning state is terminal.
    async fn wait_until_terminal(
        &self,
        scope: &DeploymentScope,
        deployment_name: &str,
    ) -> Result<DeploymentRecord> {
        loop {
            let record = self.get(scope, deployment_name).await?;
            match record.provisioning_state.as_deref() {
                Some(state) if is_terminal(state) => {
                    if state == "Succeeded" {
                        return Ok(record);
                    }
                    return Err(PtuError::Remote {
                        code: 200,
                        message: format!(
                            "deployment '{deployment_name}' ended in provisioning state '{state}'"
                        ),
                    });
                }
                state => {
                    debug!(deployment = deployment_name, ?state, "operation still running");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl ManagementClient for ArmClient {
    async fn create_or_update(
        &self,
        scope: &DeploymentScope,
        deployment_name: &str,
        spec: &DeploymentSpec,
    ) -> Result<DeploymentRecord> {
        let token = self.credential.token().await?;
        let body = PutDeployment {
            sku: PutSku {
                name: &spec.sku_name,
                capacity: spec.capacity,
            },
            properties: PutProperties {
                model: PutModel {
                    format: &spec.model_format,
                    name: &spec.model_name,
                    version: &spec.model_version,
                },
            },
        };

        debug!(
            deployment = deployment_name,
            sku = spec.sku_name,
            capacity = spec.capacity,
            "submitting create-or-update"
        );
        let response = self
            .http
            .put(self.deployment_url(scope, deployment_name))
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, deployment_name));
        }

        self.wait_until_terminal(scope, deployment_name).await
    }

    async fn get(
        &self,
        scope: &DeploymentScope,
        deployment_name: &str,
    ) -> Result<DeploymentRecord> {
        let token = self.credential.token().await?;
        let response = self
            .http
            .get(self.deployment_url(scope, deployment_name))
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, deployment_name));
        }

        let deployment: ArmDeployment = response.json().await.map_err(classify_transport)?;
        Ok(deployment.into_record(deployment_name))
    }

    async fn delete(&self, scope: &DeploymentScope, deployment_name: &str) -> Result<()> {
        let token = self.credential.token().await?;
        debug!(deployment = deployment_name, "submitting delete");
        let response = self
            .http
            .delete(self.deployment_url(scope, deployment_name))
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            // Nothing to delete (or deletion completed synchronously).
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, deployment_name));
        }

        // Accepted: poll until the deployment disappears.
        loop {
            match self.get(scope, deployment_name).await {
                Ok(record) => {
                    debug!(
                        deployment = deployment_name,
                        state = ?record.provisioning_state,
                        "delete still running"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(err) if err.is_not_found() => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }

    async fn list(&self, scope: &DeploymentScope) -> Result<Vec<DeploymentRecord>> {
        let token = self.credential.token().await?;
        let response = self
            .http
            .get(self.deployments_url(scope))
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, &scope.account_name));
        }

        let list: ArmDeploymentList = response.json().await.map_err(classify_transport)?;
        Ok(list
            .value
            .into_iter()
            .map(|deployment| deployment.into_record(""))
            .collect())
    }
}
