//! Shared types and models for the Coffee Traceability & Quality Platform
//!
//! This crate contains the domain records, the SCA cupping aggregation rules and
//! the validation rules shared between the backend and the browser (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
