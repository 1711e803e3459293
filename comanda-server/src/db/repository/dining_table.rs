//! Dining Table Repository (mesas)

use super::{RepoError, RepoResult};
use shared::{DiningTable, DiningTableCreate, PaymentStatus, TableState};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};

fn from_row(row: &SqliteRow) -> RepoResult<DiningTable> {
    let state: String = row.try_get("estado")?;
    Ok(DiningTable {
        id: row.try_get("id")?,
        number: row.try_get("numero")?,
        state: state
            .parse::<TableState>()
            .map_err(|e| RepoError::Decode(e.to_string()))?,
    })
}

/// All tables ordered by number
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let rows = sqlx::query("SELECT id, numero, estado FROM mesas ORDER BY numero")
        .fetch_all(pool)
        .await?;
    rows.iter().map(from_row).collect()
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<DiningTable>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query("SELECT id, numero, estado FROM mesas WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(from_row).transpose()
}

/// Create a free table
pub async fn create(pool: &SqlitePool, data: &DiningTableCreate) -> RepoResult<DiningTable> {
    let row = sqlx::query(
        "INSERT INTO mesas (numero, estado) VALUES (?, ?) RETURNING id, numero, estado",
    )
    .bind(data.number)
    .bind(TableState::Free.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Duplicate(format!("Table {} already exists", data.number))
        }
        other => RepoError::Database(other),
    })?;
    from_row(&row)
}

/// Compare-and-swap state transition
///
/// Writes `to` only if the row is currently in `from`, in a single statement.
/// Returns whether this call performed the transition.
pub async fn transition<'e, E>(
    executor: E,
    id: i64,
    from: TableState,
    to: TableState,
) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE mesas SET estado = ? WHERE id = ? AND estado = ?")
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Free an occupied table that has no unpaid orders, in a single statement
pub async fn release_if_unused<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE mesas SET estado = ? WHERE id = ? AND estado = ? \
         AND NOT EXISTS (SELECT 1 FROM ventas WHERE mesa_id = ? AND estado_pago = ?)",
    )
    .bind(TableState::Free.as_str())
    .bind(id)
    .bind(TableState::Occupied.as_str())
    .bind(id)
    .bind(PaymentStatus::Pending.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
