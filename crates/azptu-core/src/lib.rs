//! Core building blocks for azptu: the embedded configuration catalog,
//! PTU capacity validation, the TTL-expiring session store, and the shared
//! error taxonomy. Everything here is synchronous and remote-free; the
//! management-plane client lives in `azptu-client`.

pub mod catalog;
pub mod error;
pub mod model;
pub mod session;
pub mod tier;
pub mod validation;

pub use catalog::{ConfigCatalog, ModelEntry, ModelRequirement};
pub use error::{PtuError, Result, ValidationKind};
pub use model::{DeploymentRecord, DeploymentRequest, DeploymentScope, ProjectSummary};
pub use session::SessionStore;
pub use tier::{DeploymentTier, TierBucket};
pub use validation::{Validation, validate};
