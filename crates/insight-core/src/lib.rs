//! Domain value types shared by the Insight Places crates.
//!
//! Everything here is storage-agnostic: date ranges with the inclusive
//! overlap test used for availability checks, fixed-point money, ratings,
//! Brazilian state codes, pagination and the per-entity delete policy.

pub mod constants;
pub mod error;
pub mod policy;
pub mod types;

pub use error::{Error, Result};
pub use policy::{DeleteOutcome, DeletePolicy};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
