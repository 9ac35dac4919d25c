#![allow(async_fn_in_trait)]

use crate::delete::{EntityTable, delete_entity};
use crate::error::StorageResult;
use crate::models::{ClientRentalCount, Rental, RentalDetails, RentalUpdate};
use crate::transaction;
use chrono::{Local, NaiveDate};
use insight_core::{DateRange, DeletePolicy, Money, Page};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

pub(crate) const RENTAL_TABLE: EntityTable = EntityTable {
    entity: "Rental",
    table: "alugueis",
    key: "aluguel_id",
    policy: DeletePolicy::HardDelete,
    dependents: &[],
    active_column: None,
};

/// Repository trait for Rental (contract) operations
///
/// Date ranges are inclusive on both ends. Two stays overlap when
/// `a.start <= b.end && b.start <= a.end`, so a stay ending on the 15th
/// blocks another starting on the 15th.
pub trait RentalRepository: Send + Sync {
    /// Persist a new rental without checking availability
    ///
    /// # Errors
    ///
    /// `StorageError::Domain` when `data_inicio > data_fim`.
    async fn create(&self, rental: &Rental) -> StorageResult<Rental>;

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Rental>>;

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Rental>>;

    /// A rental with its client and property, fetched in one query
    async fn get_details(&self, id: &str) -> StorageResult<Option<RentalDetails>>;

    async fn get_by_client(&self, client_id: &str) -> StorageResult<Vec<Rental>>;

    async fn get_by_property(&self, property_id: &str) -> StorageResult<Vec<Rental>>;

    /// Rentals whose period covers `as_of` (today when `None`)
    async fn get_active_rentals(&self, as_of: Option<NaiveDate>) -> StorageResult<Vec<Rental>>;

    /// Apply a partial update; `None` when the rental does not exist
    ///
    /// # Errors
    ///
    /// `StorageError::Domain` when the updated dates are out of order.
    async fn update(&self, id: &str, changes: &RentalUpdate) -> StorageResult<Option<Rental>>;

    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// `true` when no rental of the property overlaps `period`
    async fn check_availability(&self, property_id: &str, period: DateRange)
    -> StorageResult<bool>;

    /// Rentals overlapping `window`, ordered by start date
    async fn get_rentals_in_period(&self, window: DateRange) -> StorageResult<Vec<Rental>>;

    /// Total price of rentals lying entirely inside `window`
    ///
    /// Returns [`Money::ZERO`] when nothing matches.
    async fn get_revenue_by_period(&self, window: DateRange) -> StorageResult<Money>;

    /// Clients ranked by number of rentals, ties broken by client id
    async fn get_most_frequent_clients(&self, limit: u32) -> StorageResult<Vec<ClientRentalCount>>;

    /// Insert the rental only if its period is still free
    ///
    /// The availability test and the insert are one statement, so two
    /// concurrent bookings of the same days cannot both succeed. Returns
    /// `None` when the period is taken.
    async fn book(&self, rental: &Rental) -> StorageResult<Option<Rental>>;
}

/// SQLite implementation of RentalRepository
pub struct SqliteRentalRepository {
    pool: SqlitePool,
}

impl SqliteRentalRepository {
    /// Create a new SQLite rental repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert a rental using any executor (pool, connection or transaction)
pub(crate) async fn insert_rental<'e, E>(executor: E, rental: &Rental) -> StorageResult<Rental>
where
    E: Executor<'e, Database = Sqlite>,
{
    rental.period()?;

    let created = sqlx::query_as::<_, Rental>(
        r#"
        INSERT INTO alugueis (
            aluguel_id, cliente_id, hospedagem_id,
            data_inicio, data_fim, preco_total_centavos
        )
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
        "#,
    )
    .bind(&rental.id)
    .bind(&rental.cliente_id)
    .bind(&rental.hospedagem_id)
    .bind(rental.data_inicio)
    .bind(rental.data_fim)
    .bind(rental.preco_total.cents())
    .fetch_one(executor)
    .await?;

    Ok(created)
}

/// Insert a rental unless an existing one overlaps its period
///
/// SQLite takes the write lock before evaluating the `NOT EXISTS` guard,
/// so concurrent callers are serialized on the same snapshot.
pub(crate) async fn insert_rental_if_available<'e, E>(
    executor: E,
    rental: &Rental,
) -> StorageResult<Option<Rental>>
where
    E: Executor<'e, Database = Sqlite>,
{
    rental.period()?;

    let created = sqlx::query_as::<_, Rental>(
        r#"
        INSERT INTO alugueis (
            aluguel_id, cliente_id, hospedagem_id,
            data_inicio, data_fim, preco_total_centavos
        )
        SELECT ?1, ?2, ?3, ?4, ?5, ?6
        WHERE NOT EXISTS (
            SELECT 1 FROM alugueis
            WHERE hospedagem_id = ?3 AND data_inicio <= ?5 AND ?4 <= data_fim
        )
        RETURNING aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
        "#,
    )
    .bind(&rental.id)
    .bind(&rental.cliente_id)
    .bind(&rental.hospedagem_id)
    .bind(rental.data_inicio)
    .bind(rental.data_fim)
    .bind(rental.preco_total.cents())
    .fetch_optional(executor)
    .await?;

    Ok(created)
}

/// Number of rentals of `property_id` overlapping `period`
pub(crate) async fn count_overlapping<'e, E>(
    executor: E,
    property_id: &str,
    period: DateRange,
) -> StorageResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM alugueis
        WHERE hospedagem_id = ? AND data_inicio <= ? AND ? <= data_fim
        "#,
    )
    .bind(property_id)
    .bind(period.end())
    .bind(period.start())
    .fetch_one(executor)
    .await?;

    Ok(count)
}

impl RentalRepository for SqliteRentalRepository {
    async fn create(&self, rental: &Rental) -> StorageResult<Rental> {
        let created = insert_rental(&self.pool, rental).await?;
        debug!(
            id = %created.id,
            hospedagem_id = %created.hospedagem_id,
            inicio = %created.data_inicio,
            fim = %created.data_fim,
            "rental created"
        );
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            SELECT aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
            FROM alugueis
            WHERE aluguel_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rental)
    }

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
            FROM alugueis
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    async fn get_details(&self, id: &str) -> StorageResult<Option<RentalDetails>> {
        let details = sqlx::query_as::<_, RentalDetails>(
            r#"
            SELECT a.aluguel_id, a.cliente_id, a.hospedagem_id,
                   a.data_inicio, a.data_fim, a.preco_total_centavos,
                   c.nome, c.cpf, c.contato,
                   h.tipo, h.endereco_id, h.proprietario_id, h.ativo
            FROM alugueis a
            JOIN clientes c ON c.cliente_id = a.cliente_id
            JOIN hospedagens h ON h.hospedagem_id = a.hospedagem_id
            WHERE a.aluguel_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    async fn get_by_client(&self, client_id: &str) -> StorageResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
            FROM alugueis
            WHERE cliente_id = ?
            ORDER BY data_inicio, rowid
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    async fn get_by_property(&self, property_id: &str) -> StorageResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
            FROM alugueis
            WHERE hospedagem_id = ?
            ORDER BY data_inicio, rowid
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    async fn get_active_rentals(&self, as_of: Option<NaiveDate>) -> StorageResult<Vec<Rental>> {
        let day = as_of.unwrap_or_else(|| Local::now().date_naive());
        self.get_rentals_in_period(DateRange::single_day(day)).await
    }

    async fn update(&self, id: &str, changes: &RentalUpdate) -> StorageResult<Option<Rental>> {
        let Some(mut rental) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(rental));
        }

        changes.apply(&mut rental);
        rental.period()?;

        let updated = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE alugueis
            SET cliente_id = ?, hospedagem_id = ?, data_inicio = ?, data_fim = ?,
                preco_total_centavos = ?
            WHERE aluguel_id = ?
            RETURNING aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
            "#,
        )
        .bind(&rental.cliente_id)
        .bind(&rental.hospedagem_id)
        .bind(rental.data_inicio)
        .bind(rental.data_fim)
        .bind(rental.preco_total.cents())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let outcome = delete_entity(&self.pool, &RENTAL_TABLE, id).await?;
        Ok(outcome.removed())
    }

    async fn check_availability(
        &self,
        property_id: &str,
        period: DateRange,
    ) -> StorageResult<bool> {
        let overlapping = count_overlapping(&self.pool, property_id, period).await?;
        debug!(property_id, %period, overlapping, "availability checked");
        Ok(overlapping == 0)
    }

    async fn get_rentals_in_period(&self, window: DateRange) -> StorageResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT aluguel_id, cliente_id, hospedagem_id, data_inicio, data_fim, preco_total_centavos
            FROM alugueis
            WHERE data_inicio <= ? AND ? <= data_fim
            ORDER BY data_inicio, rowid
            "#,
        )
        .bind(window.end())
        .bind(window.start())
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    async fn get_revenue_by_period(&self, window: DateRange) -> StorageResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(preco_total_centavos), 0)
            FROM alugueis
            WHERE data_inicio >= ? AND data_fim <= ?
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents)?)
    }

    async fn get_most_frequent_clients(&self, limit: u32) -> StorageResult<Vec<ClientRentalCount>> {
        let ranking = sqlx::query_as::<_, ClientRentalCount>(
            r#"
            SELECT c.cliente_id, c.nome, c.cpf, c.contato, COUNT(a.aluguel_id) AS rental_count
            FROM clientes c
            JOIN alugueis a ON a.cliente_id = c.cliente_id
            GROUP BY c.cliente_id, c.nome, c.cpf, c.contato
            ORDER BY rental_count DESC, c.cliente_id ASC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(ranking)
    }

    async fn book(&self, rental: &Rental) -> StorageResult<Option<Rental>> {
        let mut tx = self.pool.begin().await?;
        let booked = transaction::create_rental_if_available(&mut tx, rental).await?;
        tx.commit().await?;

        match &booked {
            Some(created) => info!(
                id = %created.id,
                hospedagem_id = %created.hospedagem_id,
                inicio = %created.data_inicio,
                fim = %created.data_fim,
                "rental booked"
            ),
            None => debug!(
                hospedagem_id = %rental.hospedagem_id,
                inicio = %rental.data_inicio,
                fim = %rental.data_fim,
                "booking refused: period unavailable"
            ),
        }

        Ok(booked)
    }
}
