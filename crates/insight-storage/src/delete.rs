//! Policy-driven delete routine shared by every repository.
//!
//! Each entity describes its table, the tables that reference it and its
//! [`DeletePolicy`]. [`delete_entity`] runs the existence check, the
//! dependent lookup and the resulting `DELETE`/`UPDATE` inside one
//! transaction, so a failure part-way leaves the row untouched and the
//! connection is returned to the pool when the transaction is dropped.
//!
//! | Entity | Policy | Dependents |
//! |--------|--------|------------|
//! | Owner | `HardDelete` | properties removed by cascade |
//! | Client | `HardDelete` | rentals and reviews removed by cascade |
//! | Address | `RefuseIfReferenced` | properties |
//! | Property | `SoftDeleteIfReferenced` | rentals |
//! | Rental | `HardDelete` | none |
//! | Review | `HardDelete` | none |

use crate::error::{StorageError, StorageResult};
use insight_core::{DeleteOutcome, DeletePolicy};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

/// A table column that references the entity being deleted
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    pub table: &'static str,
    pub column: &'static str,
}

/// Static description of an entity table for [`delete_entity`]
///
/// All names are compile-time constants and are interpolated into SQL;
/// ids are always bound as parameters.
#[derive(Debug, Clone, Copy)]
pub struct EntityTable {
    /// Entity name used in log output
    pub entity: &'static str,
    pub table: &'static str,
    pub key: &'static str,
    pub policy: DeletePolicy,
    /// Rows whose presence makes the entity "referenced"
    pub dependents: &'static [Dependent],
    /// Boolean column cleared by a soft delete
    pub active_column: Option<&'static str>,
}

/// Delete the row `id` from `table` according to its policy
///
/// # Errors
///
/// Returns `StorageError::Configuration` when a soft-delete policy has no
/// active column, and `StorageError::Database` on query failure.
pub async fn delete_entity(
    pool: &SqlitePool,
    table: &EntityTable,
    id: &str,
) -> StorageResult<DeleteOutcome> {
    let mut tx = pool.begin().await?;

    if !row_exists(&mut tx, table, id).await? {
        debug!(entity = table.entity, id, "delete skipped: not found");
        return Ok(DeleteOutcome::NotFound);
    }

    let referenced = if table.policy.checks_references() {
        has_dependents(&mut tx, table, id).await?
    } else {
        false
    };

    let outcome = table.policy.resolve(referenced);
    match outcome {
        DeleteOutcome::Deleted => {
            let sql = format!("DELETE FROM {} WHERE {} = ?", table.table, table.key);
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }
        DeleteOutcome::Deactivated => {
            let column = table.active_column.ok_or_else(|| {
                StorageError::Configuration(format!(
                    "{} uses soft delete but declares no active column",
                    table.entity
                ))
            })?;
            let sql = format!(
                "UPDATE {} SET {} = 0 WHERE {} = ?",
                table.table, column, table.key
            );
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }
        DeleteOutcome::Refused | DeleteOutcome::NotFound => {}
    }

    tx.commit().await?;
    debug!(entity = table.entity, id, %outcome, "delete resolved");

    Ok(outcome)
}

async fn row_exists(
    conn: &mut SqliteConnection,
    table: &EntityTable,
    id: &str,
) -> StorageResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
        table.table, table.key
    );
    let exists: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(conn).await?;
    Ok(exists != 0)
}

async fn has_dependents(
    conn: &mut SqliteConnection,
    table: &EntityTable,
    id: &str,
) -> StorageResult<bool> {
    for dependent in table.dependents {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
            dependent.table, dependent.column
        );
        let exists: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        if exists != 0 {
            return Ok(true);
        }
    }
    Ok(false)
}
