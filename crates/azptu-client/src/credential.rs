//! Credential acquisition for the management plane.
//!
//! Tokens come from the Azure CLI (`az account get-access-token`), the same
//! login the operator already holds. Acquisition failure is classified as
//! [`PtuError::AuthenticationRequired`].

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use azptu_core::{PtuError, Result};

const MANAGEMENT_RESOURCE: &str = "https://management.azure.com";

/// Provides bearer tokens for management-plane requests.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a valid access token, acquiring or refreshing as needed.
    async fn token(&self) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "expires_on", default)]
    expires_on: Option<i64>,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Token source backed by the `az` CLI.
///
/// The token is cached for the process lifetime and refreshed shortly
/// before expiry.
#[derive(Default)]
pub struct AzureCliCredential {
    cached: Mutex<Option<CachedToken>>,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self::default()
    }

    async fn acquire(&self) -> Result<CachedToken> {
        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                MANAGEMENT_RESOURCE,
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|err| {
                PtuError::authentication(format!(
                    "could not run 'az account get-access-token': {err}. \
                     Make sure the Azure CLI is installed and you are logged in with 'az login'."
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PtuError::authentication(format!(
                "'az account get-access-token' failed: {}. Run 'az login' and retry.",
                stderr.trim()
            )));
        }

        let parsed: AccessTokenResponse =
            serde_json::from_slice(&output.stdout).map_err(|err| {
                PtuError::authentication(format!("unexpected token response from az: {err}"))
            })?;

        let expires_at = parsed
            .expires_on
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + ChronoDuration::minutes(5));

        debug!(%expires_at, "acquired management token via az");
        Ok(CachedToken {
            token: parsed.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        // Refresh one minute early so an in-flight request never carries an
        // expired token.
        let refresh_before = Utc::now() + ChronoDuration::seconds(60);
        if let Some(entry) = cached.as_ref() {
            if entry.expires_at > refresh_before {
                return Ok(entry.token.clone());
            }
        }

        let fresh = self.acquire().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

/// A fixed-token credential for tests and scripted environments.
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
