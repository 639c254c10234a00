//! Domain models for the Coffee Traceability & Quality Platform

mod cupping;
mod farm;
mod harvest;
mod milling;
mod processing;
mod roast;
mod user;

pub use cupping::*;
pub use farm::*;
pub use harvest::*;
pub use milling::*;
pub use processing::*;
pub use roast::*;
pub use user::*;
