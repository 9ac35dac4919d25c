#![allow(async_fn_in_trait)]

use super::like_pattern;
use crate::delete::{EntityTable, delete_entity};
use crate::error::StorageResult;
use crate::models::{Client, ClientUpdate};
use insight_core::{DeletePolicy, Page};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Clients are removed outright; rentals and reviews follow by cascade.
pub(crate) const CLIENT_TABLE: EntityTable = EntityTable {
    entity: "Client",
    table: "clientes",
    key: "cliente_id",
    policy: DeletePolicy::HardDelete,
    dependents: &[],
    active_column: None,
};

/// Repository trait for Client entity operations
pub trait ClientRepository: Send + Sync {
    /// Persist a new client and return the stored row
    async fn create(&self, client: &Client) -> StorageResult<Client>;

    /// Find a client by id
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Client>>;

    /// List clients in insertion order
    async fn get_all(&self, page: Page) -> StorageResult<Vec<Client>>;

    /// Find the first client with the given CPF
    async fn get_by_cpf(&self, cpf: &str) -> StorageResult<Option<Client>>;

    /// Apply a partial update; `None` when the client does not exist
    async fn update(&self, id: &str, changes: &ClientUpdate) -> StorageResult<Option<Client>>;

    /// Delete a client with its rentals and reviews
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Case-insensitive substring search over name, CPF or contact
    async fn search(&self, term: &str, page: Page) -> StorageResult<Vec<Client>>;

    /// Fetch every client whose id is in `ids`; unknown ids are skipped
    async fn get_by_ids(&self, ids: &[String]) -> StorageResult<Vec<Client>>;
}

/// SQLite implementation of ClientRepository
pub struct SqliteClientRepository {
    pool: SqlitePool,
}

impl SqliteClientRepository {
    /// Create a new SQLite client repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert a client using any executor (pool, connection or transaction)
pub(crate) async fn insert_client<'e, E>(executor: E, client: &Client) -> StorageResult<Client>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clientes (cliente_id, nome, cpf, contato)
        VALUES (?, ?, ?, ?)
        RETURNING cliente_id, nome, cpf, contato
        "#,
    )
    .bind(&client.id)
    .bind(&client.nome)
    .bind(&client.cpf)
    .bind(&client.contato)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

impl ClientRepository for SqliteClientRepository {
    async fn create(&self, client: &Client) -> StorageResult<Client> {
        let created = insert_client(&self.pool, client).await?;
        debug!(id = %created.id, "client created");
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT cliente_id, nome, cpf, contato
            FROM clientes
            WHERE cliente_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT cliente_id, nome, cpf, contato
            FROM clientes
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn get_by_cpf(&self, cpf: &str) -> StorageResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT cliente_id, nome, cpf, contato
            FROM clientes
            WHERE cpf = ?
            ORDER BY rowid
            LIMIT 1
            "#,
        )
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn update(&self, id: &str, changes: &ClientUpdate) -> StorageResult<Option<Client>> {
        let Some(mut client) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(client));
        }

        changes.apply(&mut client);

        let updated = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clientes
            SET nome = ?, cpf = ?, contato = ?
            WHERE cliente_id = ?
            RETURNING cliente_id, nome, cpf, contato
            "#,
        )
        .bind(&client.nome)
        .bind(&client.cpf)
        .bind(&client.contato)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let outcome = delete_entity(&self.pool, &CLIENT_TABLE, id).await?;
        Ok(outcome.removed())
    }

    async fn search(&self, term: &str, page: Page) -> StorageResult<Vec<Client>> {
        let pattern = like_pattern(term);
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT cliente_id, nome, cpf, contato
            FROM clientes
            WHERE nome LIKE ?1 ESCAPE '\'
               OR cpf LIKE ?1 ESCAPE '\'
               OR contato LIKE ?1 ESCAPE '\'
            ORDER BY rowid
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(&pattern)
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn get_by_ids(&self, ids: &[String]) -> StorageResult<Vec<Client>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT cliente_id, nome, cpf, contato FROM clientes WHERE cliente_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY rowid");

        let clients = builder
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }
}
