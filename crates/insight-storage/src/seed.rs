//! Sample data for demos and smoke tests.

use crate::connection::Database;
use crate::error::StorageResult;
use crate::models::{Address, Client, Owner, Property, Rental, Review};
use crate::transaction;
use chrono::{Days, NaiveDate};
use insight_core::{DateRange, Money, Rating, StateCode};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// Length of the sample stay, in nights after the start day
const SAMPLE_STAY_NIGHTS: u64 = 7;

/// Ids of the rows written by [`create_sample_data`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleData {
    pub owner_id: String,
    pub address_id: String,
    pub property_id: String,
    pub client_id: String,
    pub rental_id: String,
    pub review_id: String,
}

/// Insert one owner, address, property, client, rental and review
///
/// The rental runs from `today` for a week at R$ 1500.00. Everything is
/// written in a single transaction.
pub async fn create_sample_data(db: &Database, today: NaiveDate) -> StorageResult<SampleData> {
    let owner = Owner::new(
        "João Silva",
        Some("123.456.789-00".to_string()),
        Some("joao@email.com".to_string()),
    );
    let address = Address::new(
        "Rua das Flores",
        123,
        "Centro",
        "São Paulo",
        StateCode::new("SP")?,
        Some("01234-567".to_string()),
    );
    let property = Property::new("Apartamento", &address.id, &owner.id);
    let client = Client::new(
        "Maria Santos",
        Some("987.654.321-00".to_string()),
        Some("maria@email.com".to_string()),
    );

    let end = today
        .checked_add_days(Days::new(SAMPLE_STAY_NIGHTS))
        .unwrap_or(today);
    let rental = Rental::new(
        &client.id,
        &property.id,
        DateRange::new(today, end)?,
        Money::new(Decimal::new(1500_00, 2))?,
    );
    let review = Review::new(
        &client.id,
        &property.id,
        Rating::new(5)?,
        Some("Excelente hospedagem!".to_string()),
    );

    let mut tx = db.pool().begin().await?;
    transaction::create_owner(&mut tx, &owner).await?;
    transaction::create_address(&mut tx, &address).await?;
    transaction::create_property(&mut tx, &property).await?;
    transaction::create_client(&mut tx, &client).await?;
    transaction::create_rental(&mut tx, &rental).await?;
    transaction::create_review(&mut tx, &review).await?;
    tx.commit().await?;

    info!(property_id = %property.id, rental_id = %rental.id, "sample data created");

    Ok(SampleData {
        owner_id: owner.id,
        address_id: address.id,
        property_id: property.id,
        client_id: client.id,
        rental_id: rental.id,
        review_id: review.id,
    })
}
