#![allow(async_fn_in_trait)]

use super::like_pattern;
use crate::delete::{EntityTable, delete_entity};
use crate::error::StorageResult;
use crate::models::{RatedProperty, Review, ReviewUpdate};
use insight_core::constants::MIN_REVIEWS_FOR_RANKING;
use insight_core::{DeletePolicy, Page, RatingSummary};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

pub(crate) const REVIEW_TABLE: EntityTable = EntityTable {
    entity: "Review",
    table: "avaliacoes",
    key: "avaliacao_id",
    policy: DeletePolicy::HardDelete,
    dependents: &[],
    active_column: None,
};

/// Repository trait for Review operations and rating reports
pub trait ReviewRepository: Send + Sync {
    /// Persist a new review and return the stored row
    async fn create(&self, review: &Review) -> StorageResult<Review>;

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Review>>;

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Review>>;

    async fn get_by_client(&self, client_id: &str) -> StorageResult<Vec<Review>>;

    async fn get_by_property(&self, property_id: &str) -> StorageResult<Vec<Review>>;

    /// Apply a partial update; `None` when the review does not exist
    async fn update(&self, id: &str, changes: &ReviewUpdate) -> StorageResult<Option<Review>>;

    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// Mean score of a property, `None` when it has no reviews
    async fn get_average_rating(&self, property_id: &str) -> StorageResult<Option<f64>>;

    /// Review count per score 1..=5 for a property, zero-filled
    async fn get_ratings_summary(&self, property_id: &str) -> StorageResult<RatingSummary>;

    /// Latest reviews of a property, newest first
    async fn get_recent_reviews(&self, property_id: &str, limit: u32)
    -> StorageResult<Vec<Review>>;

    /// Properties ranked by mean score
    ///
    /// Only properties with at least [`MIN_REVIEWS_FOR_RANKING`] reviews are
    /// ranked. Equal averages are ordered by review count (descending), then
    /// property id.
    async fn get_highest_rated_properties(&self, limit: u32)
    -> StorageResult<Vec<RatedProperty>>;

    /// Case-insensitive substring search on the comment
    async fn search_by_comment(&self, term: &str, page: Page) -> StorageResult<Vec<Review>>;
}

/// SQLite implementation of ReviewRepository
pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    /// Create a new SQLite review repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert a review using any executor (pool, connection or transaction)
pub(crate) async fn insert_review<'e, E>(executor: E, review: &Review) -> StorageResult<Review>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO avaliacoes (avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
        "#,
    )
    .bind(&review.id)
    .bind(&review.cliente_id)
    .bind(&review.hospedagem_id)
    .bind(i64::from(review.nota.get()))
    .bind(&review.comentario)
    .bind(review.created_at)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

impl ReviewRepository for SqliteReviewRepository {
    async fn create(&self, review: &Review) -> StorageResult<Review> {
        let created = insert_review(&self.pool, review).await?;
        debug!(
            id = %created.id,
            hospedagem_id = %created.hospedagem_id,
            nota = %created.nota,
            "review created"
        );
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            FROM avaliacoes
            WHERE avaliacao_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn get_all(&self, page: Page) -> StorageResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            FROM avaliacoes
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get_by_client(&self, client_id: &str) -> StorageResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            FROM avaliacoes
            WHERE cliente_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get_by_property(&self, property_id: &str) -> StorageResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            FROM avaliacoes
            WHERE hospedagem_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn update(&self, id: &str, changes: &ReviewUpdate) -> StorageResult<Option<Review>> {
        let Some(mut review) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(review));
        }

        changes.apply(&mut review);

        let updated = sqlx::query_as::<_, Review>(
            r#"
            UPDATE avaliacoes
            SET cliente_id = ?, hospedagem_id = ?, nota = ?, comentario = ?
            WHERE avaliacao_id = ?
            RETURNING avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            "#,
        )
        .bind(&review.cliente_id)
        .bind(&review.hospedagem_id)
        .bind(i64::from(review.nota.get()))
        .bind(&review.comentario)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let outcome = delete_entity(&self.pool, &REVIEW_TABLE, id).await?;
        Ok(outcome.removed())
    }

    async fn get_average_rating(&self, property_id: &str) -> StorageResult<Option<f64>> {
        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(nota) FROM avaliacoes WHERE hospedagem_id = ?")
                .bind(property_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(average)
    }

    async fn get_ratings_summary(&self, property_id: &str) -> StorageResult<RatingSummary> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT nota, COUNT(*)
            FROM avaliacoes
            WHERE hospedagem_id = ?
            GROUP BY nota
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RatingSummary::from_counts(counts))
    }

    async fn get_recent_reviews(
        &self,
        property_id: &str,
        limit: u32,
    ) -> StorageResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            FROM avaliacoes
            WHERE hospedagem_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(property_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get_highest_rated_properties(
        &self,
        limit: u32,
    ) -> StorageResult<Vec<RatedProperty>> {
        let ranking = sqlx::query_as::<_, RatedProperty>(
            r#"
            SELECT h.hospedagem_id, h.tipo, h.endereco_id, h.proprietario_id, h.ativo,
                   AVG(r.nota) AS average_rating,
                   COUNT(r.avaliacao_id) AS review_count
            FROM hospedagens h
            JOIN avaliacoes r ON r.hospedagem_id = h.hospedagem_id
            GROUP BY h.hospedagem_id, h.tipo, h.endereco_id, h.proprietario_id, h.ativo
            HAVING COUNT(r.avaliacao_id) >= ?
            ORDER BY average_rating DESC, review_count DESC, h.hospedagem_id ASC
            LIMIT ?
            "#,
        )
        .bind(MIN_REVIEWS_FOR_RANKING)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(ranking)
    }

    async fn search_by_comment(&self, term: &str, page: Page) -> StorageResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT avaliacao_id, cliente_id, hospedagem_id, nota, comentario, created_at
            FROM avaliacoes
            WHERE comentario LIKE ? ESCAPE '\'
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(like_pattern(term))
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use crate::models::{Address, Client, Owner, Property};
    use crate::repositories::{
        AddressRepository, ClientRepository, OwnerRepository, PropertyRepository,
        SqliteAddressRepository, SqliteClientRepository, SqliteOwnerRepository,
        SqlitePropertyRepository,
    };
    use chrono::{Duration, TimeZone, Utc};
    use insight_core::{Rating, StateCode};
    use std::collections::BTreeMap;

    struct Fixture {
        db: Database,
        repo: SqliteReviewRepository,
        client: Client,
        owner: Owner,
        address: Address,
    }

    async fn setup() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let owner = SqliteOwnerRepository::new(db.pool().clone())
            .create(&Owner::new("João Silva", None, None))
            .await
            .unwrap();
        let address = SqliteAddressRepository::new(db.pool().clone())
            .create(&Address::new(
                "Rua das Flores",
                123,
                "Centro",
                "São Paulo",
                StateCode::new("SP").unwrap(),
                None,
            ))
            .await
            .unwrap();
        let client = SqliteClientRepository::new(db.pool().clone())
            .create(&Client::new("Maria Santos", None, None))
            .await
            .unwrap();
        let repo = SqliteReviewRepository::new(db.pool().clone());

        Fixture {
            db,
            repo,
            client,
            owner,
            address,
        }
    }

    impl Fixture {
        async fn property(&self, tipo: &str) -> Property {
            SqlitePropertyRepository::new(self.db.pool().clone())
                .create(&Property::new(tipo, &self.address.id, &self.owner.id))
                .await
                .unwrap()
        }

        async fn review(&self, property: &Property, nota: u8, comentario: Option<&str>) -> Review {
            let review = Review::new(
                &self.client.id,
                &property.id,
                Rating::new(nota).unwrap(),
                comentario.map(str::to_string),
            );
            self.repo.create(&review).await.unwrap()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_review() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;
        let review = fx.review(&property, 5, Some("Excelente hospedagem!")).await;

        let found = fx.repo.get_by_id(&review.id).await.unwrap();
        assert_eq!(found, Some(review));
    }

    #[tokio::test]
    async fn test_rating_out_of_range_is_rejected_by_schema() {
        let fx = setup().await;
        let property = fx.property("Casa").await;

        let result = sqlx::query(
            "INSERT INTO avaliacoes (avaliacao_id, cliente_id, hospedagem_id, nota) VALUES ('x', ?, ?, 6)",
        )
        .bind(&fx.client.id)
        .bind(&property.id)
        .execute(fx.db.pool())
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_by_client_and_property() {
        let fx = setup().await;
        let flat = fx.property("Apartamento").await;
        let house = fx.property("Casa").await;
        fx.review(&flat, 4, None).await;
        fx.review(&house, 3, None).await;

        assert_eq!(fx.repo.get_by_client(&fx.client.id).await.unwrap().len(), 2);
        let for_house = fx.repo.get_by_property(&house.id).await.unwrap();
        assert_eq!(for_house.len(), 1);
        assert_eq!(for_house[0].nota.get(), 3);
    }

    #[tokio::test]
    async fn test_average_rating() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;

        assert_eq!(fx.repo.get_average_rating(&property.id).await.unwrap(), None);

        fx.review(&property, 4, None).await;
        fx.review(&property, 5, None).await;
        let average = fx.repo.get_average_rating(&property.id).await.unwrap();
        assert_eq!(average, Some(4.5));
    }

    #[tokio::test]
    async fn test_ratings_summary_is_zero_filled() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;

        let empty = fx.repo.get_ratings_summary(&property.id).await.unwrap();
        assert_eq!(
            empty.to_map(),
            BTreeMap::from([(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)])
        );

        fx.review(&property, 5, None).await;
        fx.review(&property, 5, None).await;
        fx.review(&property, 2, None).await;

        let summary = fx.repo.get_ratings_summary(&property.id).await.unwrap();
        assert_eq!(
            summary.to_map(),
            BTreeMap::from([(1, 0), (2, 1), (3, 0), (4, 0), (5, 2)])
        );
        assert_eq!(summary.total(), 3);
    }

    #[tokio::test]
    async fn test_recent_reviews_newest_first() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        for (days, comentario) in [(0, "first"), (2, "third"), (1, "second")] {
            let mut review = Review::new(
                &fx.client.id,
                &property.id,
                Rating::new(4).unwrap(),
                Some(comentario.to_string()),
            );
            review.created_at = base + Duration::days(days);
            fx.repo.create(&review).await.unwrap();
        }

        let recent = fx.repo.get_recent_reviews(&property.id, 2).await.unwrap();
        let comments: Vec<_> = recent.iter().filter_map(|r| r.comentario.as_deref()).collect();
        assert_eq!(comments, ["third", "second"]);
    }

    #[tokio::test]
    async fn test_highest_rated_requires_minimum_reviews() {
        let fx = setup().await;
        let perfect = fx.property("Chalé").await;
        let good = fx.property("Casa").await;
        let great = fx.property("Apartamento").await;

        // Two perfect scores are not enough to be ranked
        fx.review(&perfect, 5, None).await;
        fx.review(&perfect, 5, None).await;
        for nota in [4, 4, 4] {
            fx.review(&good, nota, None).await;
        }
        for nota in [5, 5, 4] {
            fx.review(&great, nota, None).await;
        }

        let ranking = fx.repo.get_highest_rated_properties(10).await.unwrap();
        let ids: Vec<_> = ranking.iter().map(|r| r.property.id.as_str()).collect();
        assert_eq!(ids, [great.id.as_str(), good.id.as_str()]);
        assert_eq!(ranking[1].average_rating, 4.0);
        assert_eq!(ranking[0].review_count, 3);

        let top = fx.repo.get_highest_rated_properties(1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rating_and_clear_comment() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;
        let review = fx.review(&property, 2, Some("Barulhento")).await;

        let changes = ReviewUpdate {
            nota: Some(Rating::new(3).unwrap()),
            comentario: Some(None),
            ..Default::default()
        };
        let updated = fx.repo.update(&review.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.nota.get(), 3);
        assert_eq!(updated.comentario, None);
        assert_eq!(updated.created_at, review.created_at);
    }

    #[tokio::test]
    async fn test_search_by_comment() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;
        fx.review(&property, 5, Some("Excelente hospedagem!")).await;
        fx.review(&property, 3, Some("Cama desconfortável")).await;
        fx.review(&property, 4, None).await;

        let found = fx
            .repo
            .search_by_comment("EXCELENTE", Page::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nota.get(), 5);
    }

    #[tokio::test]
    async fn test_get_all_reviews_paged() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;
        let first = fx.review(&property, 4, None).await;
        let second = fx.review(&property, 2, Some("Barulhento")).await;

        let all = fx.repo.get_all(Page::default()).await.unwrap();
        assert_eq!(all, vec![first, second.clone()]);

        let skipped = fx.repo.get_all(Page::new(1, 10)).await.unwrap();
        assert_eq!(skipped, vec![second]);
    }

    #[tokio::test]
    async fn test_delete_review() {
        let fx = setup().await;
        let property = fx.property("Apartamento").await;
        let review = fx.review(&property, 5, None).await;

        assert!(fx.repo.delete(&review.id).await.unwrap());
        assert!(fx.repo.get_by_id(&review.id).await.unwrap().is_none());
        assert!(!fx.repo.delete(&review.id).await.unwrap());
    }
}
