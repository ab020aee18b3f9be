//! Remote side of azptu: credential acquisition, the management-plane
//! client with long-running-operation polling, outcome classification, the
//! deployment orchestrator, and `az`-backed project discovery.

pub mod classify;
pub mod credential;
pub mod management;
pub mod orchestrator;
pub mod projects;

pub use credential::{AzureCliCredential, StaticCredential, TokenCredential};
pub use management::{ArmClient, DeploymentSpec, ManagementClient};
pub use orchestrator::{DeploymentOrchestrator, MissingScope, resolve_scope};
