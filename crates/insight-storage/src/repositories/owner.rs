#![allow(async_fn_in_trait)]

use super::like_pattern;
use crate::delete::{EntityTable, delete_entity};
use crate::error::StorageResult;
use crate::models::{Owner, OwnerUpdate};
use insight_core::{DeletePolicy, Page};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

/// Owners are removed outright; their properties follow by cascade.
pub(crate) const OWNER_TABLE: EntityTable = EntityTable {
    entity: "Owner",
    table: "proprietarios",
    key: "proprietario_id",
    policy: DeletePolicy::HardDelete,
    dependents: &[],
    active_column: None,
};

/// Repository trait for Owner entity operations
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait OwnerRepository: Send + Sync {
    /// Persist a new owner and return the stored row
    async fn create(&self, owner: &Owner) -> StorageResult<Owner>;

    /// Find an owner by id
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Owner>>;

    /// List owners in insertion order
    async fn get_all(&self, page: Page) -> StorageResult<Vec<Owner>>;

    /// Find the first owner with the given CPF/CNPJ
    async fn get_by_cpf_cnpj(&self, cpf_cnpj: &str) -> StorageResult<Option<Owner>>;

    /// Apply a partial update; `None` when the owner does not exist
    async fn update(&self, id: &str, changes: &OwnerUpdate) -> StorageResult<Option<Owner>>;

    /// Delete an owner (and, by cascade, its properties)
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Case-insensitive substring search on the name
    async fn search_by_name(&self, name: &str, page: Page) -> StorageResult<Vec<Owner>>;
}

/// SQLite implementation of OwnerRepository
pub struct SqliteOwnerRepository {
    pool: SqlitePool,
}

impl SqliteOwnerRepository {
    /// Create a new SQLite owner repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert an owner using any executor (pool, connection or transaction)
pub(crate) async fn insert_owner<'e, E>(executor: E, owner: &Owner) -> StorageResult<Owner>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created = sqlx::query_as::<_, Owner>(
        r#"
        INSERT INTO proprietarios (proprietario_id, nome, cpf_cnpj, contato)
        VALUES (?, ?, ?, ?)
        RETURNING proprietario_id, nome, cpf_cnpj, contato
        "#,
    )
    .bind(&owner.id)
    .bind(&owner.nome)
    .bind(&owner.cpf_cnpj)
    .bind(&owner.contato)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

impl OwnerRepository for SqliteOwnerRepository {
    async fn create(&self, owner: &Owner) -> StorageResult<Owner> {
        let created = insert_owner(&self.pool, owner).await?;
        debug!(id = %created.id, "owner created");
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Owner>> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT proprietario_id, nome, cpf_cnpj, contato
            FROM proprietarios
            WHERE proprietario_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Owner>> {
        let owners = sqlx::query_as::<_, Owner>(
            r#"
            SELECT proprietario_id, nome, cpf_cnpj, contato
            FROM proprietarios
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(owners)
    }

    async fn get_by_cpf_cnpj(&self, cpf_cnpj: &str) -> StorageResult<Option<Owner>> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT proprietario_id, nome, cpf_cnpj, contato
            FROM proprietarios
            WHERE cpf_cnpj = ?
            ORDER BY rowid
            LIMIT 1
            "#,
        )
        .bind(cpf_cnpj)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn update(&self, id: &str, changes: &OwnerUpdate) -> StorageResult<Option<Owner>> {
        let Some(mut owner) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(owner));
        }

        changes.apply(&mut owner);

        let updated = sqlx::query_as::<_, Owner>(
            r#"
            UPDATE proprietarios
            SET nome = ?, cpf_cnpj = ?, contato = ?
            WHERE proprietario_id = ?
            RETURNING proprietario_id, nome, cpf_cnpj, contato
            "#,
        )
        .bind(&owner.nome)
        .bind(&owner.cpf_cnpj)
        .bind(&owner.contato)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let outcome = delete_entity(&self.pool, &OWNER_TABLE, id).await?;
        Ok(outcome.removed())
    }

    async fn search_by_name(&self, name: &str, page: Page) -> StorageResult<Vec<Owner>> {
        let owners = sqlx::query_as::<_, Owner>(
            r#"
            SELECT proprietario_id, nome, cpf_cnpj, contato
            FROM proprietarios
            WHERE nome LIKE ? ESCAPE '\'
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(like_pattern(name))
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(owners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;

    async fn setup_test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    fn create_test_owner(nome: &str) -> Owner {
        Owner::new(
            nome,
            Some("123.456.789-00".to_string()),
            Some("joao@email.com".to_string()),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_owner() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        let owner = create_test_owner("João Silva");
        let created = repo.create(&owner).await.unwrap();
        assert_eq!(created, owner);

        let found = repo.get_by_id(&owner.id).await.unwrap();
        assert_eq!(found, Some(owner));
    }

    #[tokio::test]
    async fn test_get_missing_owner_is_none() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        assert!(repo.get_by_id("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_paginates_in_insertion_order() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        for nome in ["A", "B", "C", "D"] {
            repo.create(&create_test_owner(nome)).await.unwrap();
        }

        let page = repo.get_all(Page::new(1, 2)).await.unwrap();
        let names: Vec<_> = page.iter().map(|o| o.nome.as_str()).collect();
        assert_eq!(names, ["B", "C"]);
    }

    #[tokio::test]
    async fn test_get_by_cpf_cnpj() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        let owner = Owner::new("Empresa", Some("12.345.678/0001-90".to_string()), None);
        repo.create(&owner).await.unwrap();

        let found = repo.get_by_cpf_cnpj("12.345.678/0001-90").await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(owner.id));
        assert!(repo.get_by_cpf_cnpj("000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_touches_only_given_fields() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        let owner = create_test_owner("João Silva");
        repo.create(&owner).await.unwrap();

        let changes = OwnerUpdate {
            nome: Some("João da Silva".to_string()),
            ..Default::default()
        };
        let updated = repo.update(&owner.id, &changes).await.unwrap().unwrap();

        assert_eq!(updated.nome, "João da Silva");
        assert_eq!(updated.cpf_cnpj, owner.cpf_cnpj);
        assert_eq!(updated.contato, owner.contato);
    }

    #[tokio::test]
    async fn test_empty_update_returns_owner_unchanged() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        let owner = create_test_owner("João Silva");
        repo.create(&owner).await.unwrap();

        let updated = repo.update(&owner.id, &OwnerUpdate::default()).await.unwrap();
        assert_eq!(updated, Some(owner));
    }

    #[tokio::test]
    async fn test_update_missing_owner_is_none() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        let changes = OwnerUpdate {
            nome: Some("X".to_string()),
            ..Default::default()
        };
        assert!(repo.update("missing", &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_owner() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        let owner = create_test_owner("João Silva");
        repo.create(&owner).await.unwrap();

        assert!(repo.delete(&owner.id).await.unwrap());
        assert!(repo.get_by_id(&owner.id).await.unwrap().is_none());
        assert!(!repo.delete(&owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        repo.create(&create_test_owner("Maria Souza")).await.unwrap();
        repo.create(&create_test_owner("Mariana Lima")).await.unwrap();
        repo.create(&create_test_owner("Pedro Alves")).await.unwrap();

        let found = repo.search_by_name("MARIA", Page::default()).await.unwrap();
        assert_eq!(found.len(), 2);

        let limited = repo.search_by_name("maria", Page::first(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].nome, "Maria Souza");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = setup_test_db().await;
        let repo = SqliteOwnerRepository::new(db.pool().clone());

        repo.create(&create_test_owner("Ana")).await.unwrap();

        assert!(repo.search_by_name("%", Page::default()).await.unwrap().is_empty());
        assert!(repo.search_by_name("_", Page::default()).await.unwrap().is_empty());
    }
}
