#![allow(async_fn_in_trait)]

use super::like_pattern;
use crate::delete::{Dependent, EntityTable, delete_entity};
use crate::error::StorageResult;
use crate::models::{Address, AddressUpdate};
use insight_core::{DeletePolicy, Page, StateCode};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Addresses stay put while any property (active or not) points at them.
pub(crate) const ADDRESS_TABLE: EntityTable = EntityTable {
    entity: "Address",
    table: "enderecos",
    key: "endereco_id",
    policy: DeletePolicy::RefuseIfReferenced,
    dependents: &[Dependent {
        table: "hospedagens",
        column: "endereco_id",
    }],
    active_column: None,
};

/// Filters for [`AddressRepository::search`]
///
/// Text fields match case-insensitive substrings; `estado` matches exactly.
/// Set fields combine with AND; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    pub rua: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<StateCode>,
}

/// Repository trait for Address entity operations
pub trait AddressRepository: Send + Sync {
    /// Persist a new address and return the stored row
    async fn create(&self, address: &Address) -> StorageResult<Address>;

    /// Find an address by id
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Address>>;

    /// List addresses in insertion order
    async fn get_all(&self, page: Page) -> StorageResult<Vec<Address>>;

    /// All addresses with the given postal code
    async fn get_by_cep(&self, cep: &str) -> StorageResult<Vec<Address>>;

    /// Case-insensitive substring match on the city
    async fn get_by_cidade(&self, cidade: &str, page: Page) -> StorageResult<Vec<Address>>;

    /// Apply a partial update; `None` when the address does not exist
    async fn update(&self, id: &str, changes: &AddressUpdate) -> StorageResult<Option<Address>>;

    /// Delete an address; `false` if missing or still referenced
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Combined street/neighborhood/city/state search
    async fn search(&self, filter: &AddressFilter, page: Page) -> StorageResult<Vec<Address>>;
}

/// SQLite implementation of AddressRepository
pub struct SqliteAddressRepository {
    pool: SqlitePool,
}

impl SqliteAddressRepository {
    /// Create a new SQLite address repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert an address using any executor (pool, connection or transaction)
pub(crate) async fn insert_address<'e, E>(executor: E, address: &Address) -> StorageResult<Address>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created = sqlx::query_as::<_, Address>(
        r#"
        INSERT INTO enderecos (endereco_id, rua, numero, bairro, cidade, estado, cep)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING endereco_id, rua, numero, bairro, cidade, estado, cep
        "#,
    )
    .bind(&address.id)
    .bind(&address.rua)
    .bind(address.numero)
    .bind(&address.bairro)
    .bind(&address.cidade)
    .bind(address.estado.as_str())
    .bind(&address.cep)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

impl AddressRepository for SqliteAddressRepository {
    async fn create(&self, address: &Address) -> StorageResult<Address> {
        let created = insert_address(&self.pool, address).await?;
        debug!(id = %created.id, cidade = %created.cidade, "address created");
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT endereco_id, rua, numero, bairro, cidade, estado, cep
            FROM enderecos
            WHERE endereco_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT endereco_id, rua, numero, bairro, cidade, estado, cep
            FROM enderecos
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    async fn get_by_cep(&self, cep: &str) -> StorageResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT endereco_id, rua, numero, bairro, cidade, estado, cep
            FROM enderecos
            WHERE cep = ?
            ORDER BY rowid
            "#,
        )
        .bind(cep)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    async fn get_by_cidade(&self, cidade: &str, page: Page) -> StorageResult<Vec<Address>> {
        let filter = AddressFilter {
            cidade: Some(cidade.to_string()),
            ..Default::default()
        };
        self.search(&filter, page).await
    }

    async fn update(&self, id: &str, changes: &AddressUpdate) -> StorageResult<Option<Address>> {
        let Some(mut address) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(address));
        }

        changes.apply(&mut address);

        let updated = sqlx::query_as::<_, Address>(
            r#"
            UPDATE enderecos
            SET rua = ?, numero = ?, bairro = ?, cidade = ?, estado = ?, cep = ?
            WHERE endereco_id = ?
            RETURNING endereco_id, rua, numero, bairro, cidade, estado, cep
            "#,
        )
        .bind(&address.rua)
        .bind(address.numero)
        .bind(&address.bairro)
        .bind(&address.cidade)
        .bind(address.estado.as_str())
        .bind(&address.cep)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let outcome = delete_entity(&self.pool, &ADDRESS_TABLE, id).await?;
        Ok(outcome.removed())
    }

    async fn search(&self, filter: &AddressFilter, page: Page) -> StorageResult<Vec<Address>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT endereco_id, rua, numero, bairro, cidade, estado, cep FROM enderecos WHERE 1 = 1",
        );

        for (column, term) in [
            ("rua", &filter.rua),
            ("bairro", &filter.bairro),
            ("cidade", &filter.cidade),
        ] {
            if let Some(term) = term {
                builder
                    .push(format!(" AND {column} LIKE "))
                    .push_bind(like_pattern(term))
                    .push(" ESCAPE '\\'");
            }
        }
        if let Some(estado) = &filter.estado {
            builder
                .push(" AND estado = ")
                .push_bind(estado.as_str().to_string());
        }

        builder
            .push(" ORDER BY rowid LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let addresses = builder
            .build_query_as::<Address>()
            .fetch_all(&self.pool)
            .await?;

        Ok(addresses)
    }
}
