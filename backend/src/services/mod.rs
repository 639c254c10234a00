//! Business logic services for the Coffee Traceability & Quality Platform

pub mod admin;
pub mod auth;
pub mod cupping;
pub mod dashboard;
pub mod farm;
pub mod gap;
pub mod harvest;
pub mod inventory;
pub mod milling;
pub mod processing;
pub mod reporting;
pub mod roasting;
pub mod traceability;

pub use admin::AdminService;
pub use auth::AuthService;
pub use cupping::CuppingService;
pub use dashboard::DashboardService;
pub use farm::FarmService;
pub use gap::GapService;
pub use harvest::HarvestService;
pub use inventory::InventoryService;
pub use milling::MillingService;
pub use processing::ProcessingService;
pub use reporting::ReportingService;
pub use roasting::RoastingService;
pub use traceability::TraceabilityService;
