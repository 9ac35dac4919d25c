#![allow(async_fn_in_trait)]

use super::like_pattern;
use crate::delete::{Dependent, EntityTable, delete_entity};
use crate::error::StorageResult;
use crate::models::{Property, PropertyDetails, PropertyUpdate};
use insight_core::{DeletePolicy, Page, StateCode};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Properties with rental history are deactivated instead of removed.
pub(crate) const PROPERTY_TABLE: EntityTable = EntityTable {
    entity: "Property",
    table: "hospedagens",
    key: "hospedagem_id",
    policy: DeletePolicy::SoftDeleteIfReferenced,
    dependents: &[Dependent {
        table: "alugueis",
        column: "hospedagem_id",
    }],
    active_column: Some("ativo"),
};

const PROPERTY_COLUMNS: &str = "h.hospedagem_id, h.tipo, h.endereco_id, h.proprietario_id, h.ativo";

/// Filters for [`PropertyRepository::search`]
///
/// `tipo`, `cidade` and `proprietario_nome` match case-insensitive
/// substrings; `ativo` and `estado` match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub tipo: Option<String>,
    pub ativo: Option<bool>,
    pub cidade: Option<String>,
    pub estado: Option<StateCode>,
    pub proprietario_nome: Option<String>,
}

/// Repository trait for Property entity operations
pub trait PropertyRepository: Send + Sync {
    /// Persist a new property and return the stored row
    async fn create(&self, property: &Property) -> StorageResult<Property>;

    /// Find a property by id, active or not
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Property>>;

    /// A property with its owner and address, fetched in one query
    async fn get_details(&self, id: &str) -> StorageResult<Option<PropertyDetails>>;

    /// List properties in insertion order, optionally only active ones
    async fn get_all(&self, page: Page, only_active: bool) -> StorageResult<Vec<Property>>;

    /// Properties belonging to an owner
    async fn get_by_owner(&self, owner_id: &str, only_active: bool)
    -> StorageResult<Vec<Property>>;

    /// Properties located at an address
    async fn get_by_address(&self, address_id: &str) -> StorageResult<Vec<Property>>;

    /// Apply a partial update; `None` when the property does not exist
    async fn update(&self, id: &str, changes: &PropertyUpdate)
    -> StorageResult<Option<Property>>;

    /// Delete a property, or deactivate it when it has rentals
    ///
    /// Returns `true` in both cases and `false` when it does not exist.
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Filtered search across the property, its address and its owner
    async fn search(&self, filter: &PropertyFilter, page: Page) -> StorageResult<Vec<Property>>;

    /// Number of active properties an owner has
    async fn count_by_owner(&self, owner_id: &str) -> StorageResult<i64>;
}

/// SQLite implementation of PropertyRepository
pub struct SqlitePropertyRepository {
    pool: SqlitePool,
}

impl SqlitePropertyRepository {
    /// Create a new SQLite property repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert a property using any executor (pool, connection or transaction)
pub(crate) async fn insert_property<'e, E>(
    executor: E,
    property: &Property,
) -> StorageResult<Property>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created = sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO hospedagens (hospedagem_id, tipo, endereco_id, proprietario_id, ativo)
        VALUES (?, ?, ?, ?, ?)
        RETURNING hospedagem_id, tipo, endereco_id, proprietario_id, ativo
        "#,
    )
    .bind(&property.id)
    .bind(&property.tipo)
    .bind(&property.endereco_id)
    .bind(&property.proprietario_id)
    .bind(property.ativo)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

impl PropertyRepository for SqlitePropertyRepository {
    async fn create(&self, property: &Property) -> StorageResult<Property> {
        let created = insert_property(&self.pool, property).await?;
        debug!(id = %created.id, tipo = %created.tipo, "property created");
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            SELECT hospedagem_id, tipo, endereco_id, proprietario_id, ativo
            FROM hospedagens
            WHERE hospedagem_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    async fn get_details(&self, id: &str) -> StorageResult<Option<PropertyDetails>> {
        let details = sqlx::query_as::<_, PropertyDetails>(
            r#"
            SELECT h.hospedagem_id, h.tipo, h.endereco_id, h.proprietario_id, h.ativo,
                   p.nome, p.cpf_cnpj, p.contato,
                   e.rua, e.numero, e.bairro, e.cidade, e.estado, e.cep
            FROM hospedagens h
            JOIN proprietarios p ON p.proprietario_id = h.proprietario_id
            JOIN enderecos e ON e.endereco_id = h.endereco_id
            WHERE h.hospedagem_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    async fn get_all(&self, page: Page, only_active: bool) -> StorageResult<Vec<Property>> {
        let filter = PropertyFilter {
            ativo: only_active.then_some(true),
            ..Default::default()
        };
        self.search(&filter, page).await
    }

    async fn get_by_owner(
        &self,
        owner_id: &str,
        only_active: bool,
    ) -> StorageResult<Vec<Property>> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT hospedagem_id, tipo, endereco_id, proprietario_id, ativo
            FROM hospedagens
            WHERE proprietario_id = ? AND (? = 0 OR ativo = 1)
            ORDER BY rowid
            "#,
        )
        .bind(owner_id)
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn get_by_address(&self, address_id: &str) -> StorageResult<Vec<Property>> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT hospedagem_id, tipo, endereco_id, proprietario_id, ativo
            FROM hospedagens
            WHERE endereco_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(address_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn update(
        &self,
        id: &str,
        changes: &PropertyUpdate,
    ) -> StorageResult<Option<Property>> {
        let Some(mut property) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(property));
        }

        changes.apply(&mut property);

        let updated = sqlx::query_as::<_, Property>(
            r#"
            UPDATE hospedagens
            SET tipo = ?, endereco_id = ?, proprietario_id = ?
            WHERE hospedagem_id = ?
            RETURNING hospedagem_id, tipo, endereco_id, proprietario_id, ativo
            "#,
        )
        .bind(&property.tipo)
        .bind(&property.endereco_id)
        .bind(&property.proprietario_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let outcome = delete_entity(&self.pool, &PROPERTY_TABLE, id).await?;
        Ok(outcome.removed())
    }

    async fn search(&self, filter: &PropertyFilter, page: Page) -> StorageResult<Vec<Property>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(PROPERTY_COLUMNS).push(
            " FROM hospedagens h \
             JOIN enderecos e ON e.endereco_id = h.endereco_id \
             JOIN proprietarios p ON p.proprietario_id = h.proprietario_id \
             WHERE 1 = 1",
        );

        if let Some(tipo) = &filter.tipo {
            builder
                .push(" AND h.tipo LIKE ")
                .push_bind(like_pattern(tipo))
                .push(" ESCAPE '\\'");
        }
        if let Some(ativo) = filter.ativo {
            builder.push(" AND h.ativo = ").push_bind(ativo);
        }
        if let Some(cidade) = &filter.cidade {
            builder
                .push(" AND e.cidade LIKE ")
                .push_bind(like_pattern(cidade))
                .push(" ESCAPE '\\'");
        }
        if let Some(estado) = &filter.estado {
            builder
                .push(" AND e.estado = ")
                .push_bind(estado.as_str().to_string());
        }
        if let Some(nome) = &filter.proprietario_nome {
            builder
                .push(" AND p.nome LIKE ")
                .push_bind(like_pattern(nome))
                .push(" ESCAPE '\\'");
        }

        builder
            .push(" ORDER BY h.rowid LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let properties = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn count_by_owner(&self, owner_id: &str) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM hospedagens WHERE proprietario_id = ? AND ativo = 1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
