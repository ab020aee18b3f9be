pub mod deployments;
pub mod models;
pub mod projects;
pub mod state;
