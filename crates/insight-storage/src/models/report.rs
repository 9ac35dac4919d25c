//! Read models returned by joined lookups and aggregate queries.
//!
//! Each struct flattens one or more entity rows from a single SQL result
//! set, so every joined column is selected exactly once.

use super::{Address, Client, Owner, Property, Rental};
use serde::Serialize;

/// A property together with its owner and address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PropertyDetails {
    #[sqlx(flatten)]
    pub property: Property,

    #[sqlx(flatten)]
    pub owner: Owner,

    #[sqlx(flatten)]
    pub address: Address,
}

/// A rental together with its client and property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RentalDetails {
    #[sqlx(flatten)]
    pub rental: Rental,

    #[sqlx(flatten)]
    pub client: Client,

    #[sqlx(flatten)]
    pub property: Property,
}

/// Entry of the most-frequent-clients ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ClientRentalCount {
    #[sqlx(flatten)]
    pub client: Client,

    /// Number of rentals the client has
    pub rental_count: i64,
}

/// Entry of the highest-rated-properties ranking
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RatedProperty {
    #[sqlx(flatten)]
    pub property: Property,

    /// Mean of the property's review scores
    pub average_rating: f64,

    /// Number of reviews behind the average
    pub review_count: i64,
}
