//! Transaction-aware inserts for atomic multi-entity operations.
//!
//! These functions take an open SQLite transaction so that several inserts
//! can be committed together. They share their SQL with the repositories.
//!
//! # When to Use Transactions
//!
//! - **Onboarding**: owner, address and property created together
//! - **Seeding**: a consistent sample graph in one step
//! - **Booking**: availability check and insert without a gap in between
//!
//! # Usage Pattern
//!
//! ```no_run
//! use insight_core::StateCode;
//! use insight_storage::{Database, DatabaseConfig, transaction};
//! use insight_storage::models::{Address, Owner, Property};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("insight_places.db")).await?;
//!
//! let owner = Owner::new("João Silva", None, Some("joao@email.com".into()));
//! let address = Address::new(
//!     "Rua das Flores",
//!     123,
//!     "Centro",
//!     "São Paulo",
//!     StateCode::new("SP")?,
//!     Some("01234-567".into()),
//! );
//! let property = Property::new("Apartamento", &address.id, &owner.id);
//!
//! let mut tx = db.pool().begin().await?;
//! transaction::create_owner(&mut tx, &owner).await?;
//! transaction::create_address(&mut tx, &address).await?;
//! transaction::create_property(&mut tx, &property).await?;
//!
//! // All three rows appear together, or none do
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Atomic Guarantees
//!
//! If any step returns an error, drop the transaction (or call
//! `rollback()`); nothing written through it becomes visible.

use crate::error::StorageResult;
use crate::models::{Address, Client, Owner, Property, Rental, Review};
use crate::repositories::address::insert_address;
use crate::repositories::client::insert_client;
use crate::repositories::owner::insert_owner;
use crate::repositories::property::insert_property;
use crate::repositories::rental::{insert_rental, insert_rental_if_available};
use crate::repositories::review::insert_review;
use sqlx::{Sqlite, Transaction};

/// Create an owner within a transaction
pub async fn create_owner(tx: &mut Transaction<'_, Sqlite>, owner: &Owner) -> StorageResult<Owner> {
    insert_owner(&mut **tx, owner).await
}

/// Create a client within a transaction
pub async fn create_client(
    tx: &mut Transaction<'_, Sqlite>,
    client: &Client,
) -> StorageResult<Client> {
    insert_client(&mut **tx, client).await
}

/// Create an address within a transaction
pub async fn create_address(
    tx: &mut Transaction<'_, Sqlite>,
    address: &Address,
) -> StorageResult<Address> {
    insert_address(&mut **tx, address).await
}

/// Create a property within a transaction
///
/// # Errors
///
/// Returns error if the owner or address does not exist (foreign key
/// violation) or the transaction is already finished.
pub async fn create_property(
    tx: &mut Transaction<'_, Sqlite>,
    property: &Property,
) -> StorageResult<Property> {
    insert_property(&mut **tx, property).await
}

/// Create a rental within a transaction, without an availability check
///
/// # Errors
///
/// Returns `StorageError::Domain` when the start date is after the end
/// date, and a database error on foreign key violations.
pub async fn create_rental(
    tx: &mut Transaction<'_, Sqlite>,
    rental: &Rental,
) -> StorageResult<Rental> {
    insert_rental(&mut **tx, rental).await
}

/// Create a rental only when no existing rental of the same property
/// overlaps its period (inclusive bounds)
///
/// Returns `Ok(None)` when the period is taken.
pub async fn create_rental_if_available(
    tx: &mut Transaction<'_, Sqlite>,
    rental: &Rental,
) -> StorageResult<Option<Rental>> {
    insert_rental_if_available(&mut **tx, rental).await
}

/// Create a review within a transaction
pub async fn create_review(
    tx: &mut Transaction<'_, Sqlite>,
    review: &Review,
) -> StorageResult<Review> {
    insert_review(&mut **tx, review).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use chrono::NaiveDate;
    use insight_core::{DateRange, Money, Rating, StateCode};

    async fn setup_test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    fn sample_graph() -> (Owner, Address, Property) {
        let owner = Owner::new("João Silva", None, None);
        let address = Address::new(
            "Rua das Flores",
            123,
            "Centro",
            "São Paulo",
            StateCode::new("SP").unwrap(),
            None,
        );
        let property = Property::new("Apartamento", &address.id, &owner.id);
        (owner, address, property)
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn january(start: u32, end: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, start).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, end).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_transaction_commit() {
        let db = setup_test_db().await;
        let (owner, address, property) = sample_graph();

        let mut tx = db.pool().begin().await.unwrap();
        create_owner(&mut tx, &owner).await.unwrap();
        create_address(&mut tx, &address).await.unwrap();
        let created = create_property(&mut tx, &property).await.unwrap();
        assert!(created.ativo);
        tx.commit().await.unwrap();

        assert_eq!(count(&db, "proprietarios").await, 1);
        assert_eq!(count(&db, "enderecos").await, 1);
        assert_eq!(count(&db, "hospedagens").await, 1);
    }

    #[tokio::test]
    async fn test_transaction_rollback() {
        let db = setup_test_db().await;
        let (owner, address, _) = sample_graph();

        let mut tx = db.pool().begin().await.unwrap();
        create_owner(&mut tx, &owner).await.unwrap();
        create_address(&mut tx, &address).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(count(&db, "proprietarios").await, 0);
        assert_eq!(count(&db, "enderecos").await, 0);
    }

    #[tokio::test]
    async fn test_failed_step_discards_earlier_writes() {
        let db = setup_test_db().await;
        let (owner, _, _) = sample_graph();
        // Address was never inserted, so the foreign key fails
        let orphan = Property::new("Casa", "missing-address", &owner.id);

        {
            let mut tx = db.pool().begin().await.unwrap();
            create_owner(&mut tx, &owner).await.unwrap();
            assert!(create_property(&mut tx, &orphan).await.is_err());
            // Dropped without commit
        }

        assert_eq!(count(&db, "proprietarios").await, 0);
    }

    #[tokio::test]
    async fn test_rental_and_review_in_one_transaction() {
        let db = setup_test_db().await;
        let (owner, address, property) = sample_graph();
        let client = Client::new("Maria Santos", None, None);
        let rental = Rental::new(
            &client.id,
            &property.id,
            january(10, 15),
            Money::from_cents(150_000).unwrap(),
        );
        let review = Review::new(
            &client.id,
            &property.id,
            Rating::new(5).unwrap(),
            Some("Excelente hospedagem!".into()),
        );

        let mut tx = db.pool().begin().await.unwrap();
        create_owner(&mut tx, &owner).await.unwrap();
        create_address(&mut tx, &address).await.unwrap();
        create_property(&mut tx, &property).await.unwrap();
        create_client(&mut tx, &client).await.unwrap();
        create_rental(&mut tx, &rental).await.unwrap();
        create_review(&mut tx, &review).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(count(&db, "alugueis").await, 1);
        assert_eq!(count(&db, "avaliacoes").await, 1);
    }

    #[tokio::test]
    async fn test_create_rental_if_available_sees_uncommitted_rows() {
        let db = setup_test_db().await;
        let (owner, address, property) = sample_graph();
        let client = Client::new("Maria Santos", None, None);

        let mut tx = db.pool().begin().await.unwrap();
        create_owner(&mut tx, &owner).await.unwrap();
        create_address(&mut tx, &address).await.unwrap();
        create_property(&mut tx, &property).await.unwrap();
        create_client(&mut tx, &client).await.unwrap();

        let first = Rental::new(&client.id, &property.id, january(10, 15), Money::ZERO);
        let abutting = Rental::new(&client.id, &property.id, january(15, 20), Money::ZERO);
        let later = Rental::new(&client.id, &property.id, january(16, 20), Money::ZERO);

        assert!(create_rental_if_available(&mut tx, &first).await.unwrap().is_some());
        assert!(create_rental_if_available(&mut tx, &abutting).await.unwrap().is_none());
        assert!(create_rental_if_available(&mut tx, &later).await.unwrap().is_some());
        tx.commit().await.unwrap();

        assert_eq!(count(&db, "alugueis").await, 2);
    }
}
