//! Order Repository (ventas)

use super::{RepoError, RepoResult};
use chrono::SecondsFormat;
use shared::serde_helpers::parse_timestamp;
use shared::{LineItem, Order, OrderStatus, PaymentStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor};

fn from_row(row: &SqliteRow) -> RepoResult<Order> {
    let id: String = row.try_get("id")?;
    let decode = |column: &str, detail: String| {
        RepoError::Decode(format!("ventas.{} of {}: {}", column, id, detail))
    };

    let created_at: String = row.try_get("created_at")?;
    let status: String = row.try_get("estado_pedido")?;
    let payment_status: String = row.try_get("estado_pago")?;
    let items: String = row.try_get("items")?;

    Ok(Order {
        created_at: parse_timestamp(&created_at)
            .ok_or_else(|| decode("created_at", created_at.clone()))?,
        status: status
            .parse::<OrderStatus>()
            .map_err(|e| decode("estado_pedido", e.to_string()))?,
        payment_status: payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| decode("estado_pago", e.to_string()))?,
        table_id: row.try_get("mesa_id")?,
        items: serde_json::from_str::<Vec<LineItem>>(&items)
            .map_err(|e| decode("items", e.to_string()))?,
        notes: row.try_get("notas")?,
        payment_method: row.try_get("metodo_pago")?,
        total: row.try_get("total")?,
        id,
    })
}

pub async fn insert<'e, E>(executor: E, order: &Order) -> RepoResult<()>
where
    E: SqliteExecutor<'e>,
{
    let items = serde_json::to_string(&order.items)
        .map_err(|e| RepoError::Decode(format!("items of {}: {}", order.id, e)))?;
    sqlx::query(
        "INSERT INTO ventas (id, created_at, estado_pedido, estado_pago, mesa_id, items, notas, metodo_pago, total) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(order.created_at.to_rfc3339_opts(SecondsFormat::Millis, true))
    .bind(order.status.as_str())
    .bind(order.payment_status.as_str())
    .bind(order.table_id)
    .bind(items)
    .bind(&order.notes)
    .bind(&order.payment_method)
    .bind(order.total)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e, E>(executor: E, id: &str) -> RepoResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query(
        "SELECT id, created_at, estado_pedido, estado_pago, mesa_id, items, notas, metodo_pago, total \
         FROM ventas WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    row.as_ref().map(from_row).transpose()
}

/// Unpaid orders seated at a table, oldest first
pub async fn find_unpaid_by_table<'e, E>(executor: E, table_id: i64) -> RepoResult<Vec<Order>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query(
        "SELECT id, created_at, estado_pedido, estado_pago, mesa_id, items, notas, metodo_pago, total \
         FROM ventas WHERE mesa_id = ? AND estado_pago = ? ORDER BY created_at",
    )
    .bind(table_id)
    .bind(PaymentStatus::Pending.as_str())
    .fetch_all(executor)
    .await?;
    rows.iter().map(from_row).collect()
}

/// Returns whether a row was updated
pub async fn update_status<'e, E>(executor: E, id: &str, status: OrderStatus) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE ventas SET estado_pedido = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Set payment status, and the method when given
pub async fn update_payment<'e, E>(
    executor: E,
    id: &str,
    status: PaymentStatus,
    method: Option<&str>,
) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE ventas SET estado_pago = ?, metodo_pago = COALESCE(?, metodo_pago) WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(method)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Re-seat every unpaid order of `from` at `to`
pub async fn move_unpaid<'e, E>(executor: E, from: i64, to: i64) -> RepoResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE ventas SET mesa_id = ? WHERE mesa_id = ? AND estado_pago = ?")
        .bind(to)
        .bind(from)
        .bind(PaymentStatus::Pending.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
