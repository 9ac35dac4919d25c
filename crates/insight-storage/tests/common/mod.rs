//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use insight_core::{DateRange, Money, Rating, StateCode};
use insight_storage::Database;
use insight_storage::models::{Address, Client, Owner, Property, Rental, Review};
use insight_storage::repositories::{
    AddressRepository, ClientRepository, OwnerRepository, PropertyRepository, RentalRepository,
    ReviewRepository, SqliteAddressRepository, SqliteClientRepository, SqliteOwnerRepository,
    SqlitePropertyRepository, SqliteRentalRepository, SqliteReviewRepository,
};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(date(start), date(end)).unwrap()
}

pub fn reais(value: i64) -> Money {
    Money::from_cents(value * 100).unwrap()
}

/// Repositories over one database plus a single owner and address
pub struct World {
    pub db: Database,
    pub owners: SqliteOwnerRepository,
    pub clients: SqliteClientRepository,
    pub addresses: SqliteAddressRepository,
    pub properties: SqlitePropertyRepository,
    pub rentals: SqliteRentalRepository,
    pub reviews: SqliteReviewRepository,
    pub owner: Owner,
    pub address: Address,
}

impl World {
    pub async fn in_memory() -> Self {
        Self::with_database(Database::in_memory().await.unwrap()).await
    }

    pub async fn with_database(db: Database) -> Self {
        let pool = db.pool().clone();
        let owners = SqliteOwnerRepository::new(pool.clone());
        let addresses = SqliteAddressRepository::new(pool.clone());

        let owner = owners
            .create(&Owner::new(
                "João Silva",
                Some("123.456.789-00".into()),
                Some("joao@email.com".into()),
            ))
            .await
            .unwrap();
        let address = addresses
            .create(&Address::new(
                "Rua das Flores",
                123,
                "Centro",
                "São Paulo",
                StateCode::new("SP").unwrap(),
                Some("01234-567".into()),
            ))
            .await
            .unwrap();

        Self {
            owners,
            clients: SqliteClientRepository::new(pool.clone()),
            addresses,
            properties: SqlitePropertyRepository::new(pool.clone()),
            rentals: SqliteRentalRepository::new(pool.clone()),
            reviews: SqliteReviewRepository::new(pool),
            db,
            owner,
            address,
        }
    }

    pub async fn property(&self, tipo: &str) -> Property {
        self.properties
            .create(&Property::new(tipo, &self.address.id, &self.owner.id))
            .await
            .unwrap()
    }

    pub async fn client(&self, nome: &str) -> Client {
        self.clients
            .create(&Client::new(nome, None, None))
            .await
            .unwrap()
    }

    pub async fn rent(
        &self,
        client: &Client,
        property: &Property,
        start: &str,
        end: &str,
        price: i64,
    ) -> Rental {
        self.rentals
            .create(&Rental::new(
                &client.id,
                &property.id,
                range(start, end),
                reais(price),
            ))
            .await
            .unwrap()
    }

    pub async fn review(&self, client: &Client, property: &Property, nota: u8) -> Review {
        self.reviews
            .create(&Review::new(
                &client.id,
                &property.id,
                Rating::new(nota).unwrap(),
                None,
            ))
            .await
            .unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }
}
