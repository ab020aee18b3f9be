//! Deployment lifecycle orchestration.
//!
//! Sequences capacity validation, remote submission and long-running
//! operation completion. Validation failures are resolved locally and never
//! reach the remote boundary; remote failures arrive already classified by
//! the management client and are propagated unmodified.

use std::fmt;

use tracing::debug;

use azptu_core::{
    ConfigCatalog, DeploymentRecord, DeploymentRequest, DeploymentScope, DeploymentTier, PtuError,
    Result, SessionStore, Validation, ValidationKind, validate,
};

use crate::management::{DeploymentSpec, ManagementClient};

const DEFAULT_MODEL_FORMAT: &str = "OpenAI";

/// A scope input the caller must supply when no session default exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingScope {
    Subscription,
    ResourceGroup,
}

impl fmt::Display for MissingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscription => write!(
                f,
                "Subscription id is required. Pass --subscription-id or run 'azptu set-subscription'."
            ),
            Self::ResourceGroup => write!(
                f,
                "Resource group is required. Pass --resource-group or run 'azptu set-resource-group'."
            ),
        }
    }
}

impl std::error::Error for MissingScope {}

/// Fills missing subscription/resource-group inputs from the session store.
pub fn resolve_scope(
    store: &SessionStore,
    subscription_id: Option<String>,
    resource_group: Option<String>,
    account_name: String,
) -> std::result::Result<DeploymentScope, MissingScope> {
    let subscription_id = subscription_id
        .or_else(|| store.subscription())
        .ok_or(MissingScope::Subscription)?;
    let resource_group = resource_group
        .or_else(|| store.resource_group())
        .ok_or(MissingScope::ResourceGroup)?;
    Ok(DeploymentScope {
        subscription_id,
        resource_group,
        account_name,
    })
}

/// Drives the create/update/delete/get state machines over a management
/// client, validating against the catalog first.
pub struct DeploymentOrchestrator<'a> {
    catalog: &'a ConfigCatalog,
    client: &'a dyn ManagementClient,
}

impl<'a> DeploymentOrchestrator<'a> {
    pub fn new(catalog: &'a ConfigCatalog, client: &'a dyn ManagementClient) -> Self {
        Self { catalog, client }
    }

    /// Creates a PTU deployment.
    ///
    /// Validation runs first; an invalid capacity returns
    /// [`PtuError::Validation`] without any remote call.
    pub async fn create(
        &self,
        scope: &DeploymentScope,
        request: &DeploymentRequest,
    ) -> Result<DeploymentRecord> {
        if let Validation::Invalid { kind, message } = validate(
            self.catalog,
            &request.model_name,
            request.capacity,
            request.tier,
        ) {
            return Err(PtuError::Validation { kind, message });
        }

        let spec = DeploymentSpec {
            sku_name: request.tier.sku_name().to_string(),
            capacity: request.capacity,
            model_format: DEFAULT_MODEL_FORMAT.to_string(),
            model_name: request.model_name.clone(),
            model_version: request.model_version.clone(),
        };

        debug!(deployment = request.deployment_name, "creating deployment");
        self.client
            .create_or_update(scope, &request.deployment_name, &spec)
            .await
    }

    /// Changes the capacity of an existing deployment, preserving its model
    /// identity.
    ///
    /// The new capacity is validated against the deployment's *current*
    /// model; a remote record without a model identity cannot be validated
    /// and fails before resubmission.
    pub async fn update_capacity(
        &self,
        scope: &DeploymentScope,
        deployment_name: &str,
        new_capacity: u32,
        tier: DeploymentTier,
    ) -> Result<DeploymentRecord> {
        let current = self.client.get(scope, deployment_name).await?;

        let (Some(model_name), Some(model_version)) =
            (current.model_name.clone(), current.model_version.clone())
        else {
            return Err(PtuError::validation(
                ValidationKind::MissingModelIdentity,
                format!(
                    "Deployment '{deployment_name}' has no model information; cannot validate the new capacity."
                ),
            ));
        };

        if let Validation::Invalid { kind, message } =
            validate(self.catalog, &model_name, new_capacity, tier)
        {
            return Err(PtuError::Validation { kind, message });
        }

        let spec = DeploymentSpec {
            sku_name: tier.sku_name().to_string(),
            capacity: new_capacity,
            model_format: current
                .model_format
                .unwrap_or_else(|| DEFAULT_MODEL_FORMAT.to_string()),
            model_name,
            model_version,
        };

        debug!(
            deployment = deployment_name,
            old_capacity = ?current.capacity,
            new_capacity,
            "updating capacity"
        );
        self.client
            .create_or_update(scope, deployment_name, &spec)
            .await
    }

    /// Deletes a deployment and waits for completion. Confirmation is the
    /// caller's concern; once submitted the deletion cannot be aborted.
    pub async fn delete(&self, scope: &DeploymentScope, deployment_name: &str) -> Result<()> {
        self.client.delete(scope, deployment_name).await
    }

    /// Fetches a deployment. A remote not-found is `Ok(None)`; every other
    /// classified failure propagates.
    pub async fn get_info(
        &self,
        scope: &DeploymentScope,
        deployment_name: &str,
    ) -> Result<Option<DeploymentRecord>> {
        match self.client.get(scope, deployment_name).await {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Lists the account's deployments.
    pub async fn list(&self, scope: &DeploymentScope) -> Result<Vec<DeploymentRecord>> {
        self.client.list(scope).await
    }
}
