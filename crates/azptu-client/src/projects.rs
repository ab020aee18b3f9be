//! Project (AI Services account) discovery via the external `az` CLI.
//!
//! Listing is delegated to the resource-listing tool the operator already
//! has; this module only shells out, parses the projection, and filters to
//! the account kinds that can host PTU deployments.

use tokio::process::Command;
use tracing::debug;

use azptu_core::{ProjectSummary, PtuError, Result};

const LIST_QUERY: &str =
    "[].{name:name,resourceGroup:resourceGroup,location:location,endpoint:properties.endpoint,kind:kind}";
const AI_KINDS: [&str; 3] = ["AIServices", "OpenAI", "CognitiveServices"];

/// Keeps only accounts whose kind can host PTU deployments.
pub fn filter_ai_accounts(accounts: Vec<ProjectSummary>) -> Vec<ProjectSummary> {
    accounts
        .into_iter()
        .filter(|account| AI_KINDS.contains(&account.kind.as_str()))
        .collect()
}

/// Lists AI accounts in the current subscription via
/// `az cognitiveservices account list`.
///
/// Callers are expected to cache the result in the session store.
pub async fn list_projects() -> Result<Vec<ProjectSummary>> {
    let output = Command::new("az")
        .args([
            "cognitiveservices",
            "account",
            "list",
            "--query",
            LIST_QUERY,
            "--output",
            "json",
        ])
        .output()
        .await
        .map_err(|err| PtuError::transport(format!("could not run 'az': {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PtuError::transport(format!(
            "'az cognitiveservices account list' failed: {}",
            stderr.trim()
        )));
    }

    let accounts: Vec<ProjectSummary> =
        serde_json::from_slice(&output.stdout).map_err(|err| {
            PtuError::transport(format!("unexpected account list output from az: {err}"))
        })?;

    debug!(total = accounts.len(), "listed accounts via az");
    Ok(filter_ai_accounts(accounts))
}
