//! HTTP handlers for the Coffee Traceability & Quality Platform

pub mod admin;
pub mod auth;
pub mod cupping;
pub mod dashboard;
pub mod farm;
pub mod harvest;
pub mod health;
pub mod inventory;
pub mod milling;
pub mod processing;
pub mod reporting;
pub mod roasting;
pub mod traceability;

use serde::Deserialize;

pub use admin::*;
pub use auth::*;
pub use cupping::*;
pub use dashboard::*;
pub use farm::*;
pub use harvest::*;
pub use health::*;
pub use inventory::*;
pub use milling::*;
pub use processing::*;
pub use reporting::*;
pub use roasting::*;
pub use traceability::*;

/// `?status=` filter shared by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery<T> {
    pub status: Option<T>,
}
