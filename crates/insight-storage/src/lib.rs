//! Storage layer for the Insight Places rental system.
//!
//! This crate provides SQLite-backed persistence for owners, clients,
//! addresses, properties, rentals and reviews, plus the availability check
//! and the aggregate reports (revenue, top clients, ratings).
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`repositories`] - One trait plus SQLite implementation per entity
//! - [`delete`] - Shared delete routine driven by each entity's [`DeletePolicy`]
//! - [`transaction`] - Transaction-aware inserts for atomic multistep work
//! - [`seed`] - Sample data used by the `insight-seed` binary
//!
//! # Core Concepts
//!
//! ## Explicit pool, no global engine
//!
//! The caller builds a [`Database`] and hands `db.pool().clone()` to each
//! repository. Every query checks a connection out of the pool and returns
//! it on completion, including when a query fails or its future is dropped.
//!
//! ## Inclusive date ranges
//!
//! Rental periods include both the first and the last day. A rental ending
//! on the 15th and another starting on the 15th overlap, so
//! [`RentalRepository::check_availability`] reports the second as
//! unavailable. [`RentalRepository::create`] does not check availability;
//! [`RentalRepository::book`] checks and inserts in one statement.
//!
//! ## Deletes
//!
//! | Entity | On delete |
//! |--------|-----------|
//! | Owner | removed with its properties |
//! | Client | removed with its rentals and reviews |
//! | Address | refused while a property uses it |
//! | Property | deactivated (`ativo = false`) if it has rentals, removed otherwise |
//! | Rental, Review | removed |
//!
//! # Examples
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use insight_core::DateRange;
//! use insight_storage::{Database, DatabaseConfig};
//! use insight_storage::repositories::{RentalRepository, SqliteRentalRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::from_env()?).await?;
//! let rentals = SqliteRentalRepository::new(db.pool().clone());
//!
//! let period = DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
//! )?;
//! if rentals.check_availability("some-property-id", period).await? {
//!     println!("free from {period}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # SQL Injection Prevention
//!
//! Values are always bound as parameters. Table and column names that are
//! interpolated into SQL come from compile-time constants only.

pub mod connection;
pub mod delete;
pub mod error;
pub mod models;
pub mod repositories;
pub mod seed;
pub mod transaction;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use insight_core::{DeleteOutcome, DeletePolicy};
pub use models::{Address, Client, Owner, Property, Rental, Review};
pub use repositories::{
    AddressRepository, ClientRepository, OwnerRepository, PropertyRepository, RentalRepository,
    ReviewRepository, SqliteAddressRepository, SqliteClientRepository, SqliteOwnerRepository,
    SqlitePropertyRepository, SqliteRentalRepository, SqliteReviewRepository,
};
pub use seed::{SampleData, create_sample_data};
