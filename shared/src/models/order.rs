//! Order Model (venta)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::dining_table::ParseStateError;
use crate::serde_helpers::{
    flexible_timestamp, json_or_string, lenient_amount, lenient_quantity, lenient_text, non_blank,
};

/// Kitchen lifecycle of an order
///
/// Only `Pending` orders are printed, and only when they are first inserted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "pending")]
    Pending,
    #[serde(rename = "en_proceso", alias = "in_progress")]
    InProgress,
    #[serde(rename = "completado", alias = "completed")]
    Completed,
    #[serde(rename = "cancelado", alias = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Column value in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendiente",
            OrderStatus::InProgress => "en_proceso",
            OrderStatus::Completed => "completado",
            OrderStatus::Cancelled => "cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" | "pending" => Ok(OrderStatus::Pending),
            "en_proceso" | "in_progress" => Ok(OrderStatus::InProgress),
            "completado" | "completed" => Ok(OrderStatus::Completed),
            "cancelado" | "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseStateError {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}

/// Payment state of an order
///
/// Table transfers move the orders that are still `Pending` here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "pending")]
    Pending,
    #[serde(rename = "pagado", alias = "paid")]
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pendiente",
            PaymentStatus::Paid => "pagado",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" | "pending" => Ok(PaymentStatus::Pending),
            "pagado" | "paid" => Ok(PaymentStatus::Paid),
            other => Err(ParseStateError {
                kind: "payment status",
                value: other.to_string(),
            }),
        }
    }
}

/// Preparation detail of a line item (part, cut, notes)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetail {
    #[serde(rename = "parte", alias = "part", default, deserialize_with = "non_blank")]
    pub part: Option<String>,
    #[serde(rename = "corte", alias = "cut", default, deserialize_with = "non_blank")]
    pub cut: Option<String>,
    #[serde(rename = "notas", alias = "notes", default, deserialize_with = "non_blank")]
    pub notes: Option<String>,
}

impl ItemDetail {
    pub fn is_empty(&self) -> bool {
        self.part.is_none() && self.cut.is_none() && self.notes.is_none()
    }
}

/// The `detalle` column as it arrived
///
/// Writers disagree on its shape, so it is classified instead of rejected:
/// an object is parsed, a JSON-encoded string is decoded, a plain string is
/// taken as the note, and anything else is kept as `Unparseable` so the
/// ticket can still be printed without it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemDetailField {
    #[default]
    Absent,
    Present(ItemDetail),
    Unparseable,
}

impl ItemDetailField {
    pub fn is_absent(&self) -> bool {
        matches!(self, ItemDetailField::Absent)
    }

    pub fn detail(&self) -> Option<&ItemDetail> {
        match self {
            ItemDetailField::Present(d) => Some(d),
            _ => None,
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Null => ItemDetailField::Absent,
            Value::Object(_) => match serde_json::from_value::<ItemDetail>(value) {
                Ok(d) if d.is_empty() => ItemDetailField::Absent,
                Ok(d) => ItemDetailField::Present(d),
                Err(_) => ItemDetailField::Unparseable,
            },
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    ItemDetailField::Absent
                } else if trimmed.starts_with('{') {
                    serde_json::from_str::<Value>(trimmed)
                        .map(Self::from_value)
                        .unwrap_or(ItemDetailField::Unparseable)
                } else {
                    ItemDetailField::Present(ItemDetail {
                        notes: Some(trimmed.to_string()),
                        ..Default::default()
                    })
                }
            }
            _ => ItemDetailField::Unparseable,
        }
    }
}

impl<'de> Deserialize<'de> for ItemDetailField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

impl Serialize for ItemDetailField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ItemDetailField::Present(d) => d.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// One line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    #[serde(
        rename = "cantidad",
        alias = "quantity",
        default = "default_quantity",
        deserialize_with = "lenient_quantity"
    )]
    pub quantity: u32,
    /// Missing names are printed with a placeholder
    #[serde(rename = "nombre", alias = "name", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(
        rename = "detalle",
        alias = "detail",
        default,
        skip_serializing_if = "ItemDetailField::is_absent"
    )]
    pub detail: ItemDetailField,
}

impl LineItem {
    pub fn new(quantity: u32, name: impl Into<String>) -> Self {
        Self {
            quantity,
            name: Some(name.into()),
            detail: ItemDetailField::Absent,
        }
    }

    pub fn with_detail(mut self, detail: ItemDetail) -> Self {
        self.detail = ItemDetailField::Present(detail);
        self
    }

    /// Stand-in for an entry that is not an item object
    ///
    /// Printed as one unnamed item so the kitchen still sees a line for it.
    pub fn unreadable() -> Self {
        Self {
            quantity: 1,
            name: None,
            detail: ItemDetailField::Unparseable,
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => {
                serde_json::from_value(value).unwrap_or_else(|_| Self::unreadable())
            }
            _ => Self::unreadable(),
        }
    }
}

/// Deserialize the items column one entry at a time
///
/// The column itself must be a list (inline or encoded); a bad entry only
/// degrades that line.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<Value> = json_or_string(deserializer)?;
    Ok(values.into_iter().map(LineItem::from_value).collect())
}

/// Order entity (row of the orders table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "estado_pedido", alias = "status", default)]
    pub status: OrderStatus,
    #[serde(rename = "estado_pago", alias = "payment_status", default)]
    pub payment_status: PaymentStatus,
    /// `None` means takeout
    #[serde(rename = "mesa_id", alias = "table_ref", default)]
    pub table_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<LineItem>,
    #[serde(rename = "notas", alias = "notes", default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(
        rename = "metodo_pago",
        alias = "payment_method",
        default,
        deserialize_with = "lenient_text"
    )]
    pub payment_method: Option<String>,
    /// Not printed; unreadable values become 0
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: f64,
}

impl Order {
    pub fn is_takeout(&self) -> bool {
        self.table_id.is_none()
    }

    /// Short id printed on the ticket
    pub fn short_id(&self) -> &str {
        crate::util::short_id(&self.id)
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "mesa_id", alias = "table_ref", default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(rename = "notas", alias = "notes", default, deserialize_with = "non_blank")]
    pub notes: Option<String>,
    #[serde(rename = "metodo_pago", alias = "payment_method", default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_from_store_row() {
        let order: Order = serde_json::from_value(json!({
            "id": "abc12345-0000-4000-8000-000000000000",
            "created_at": "2024-05-01T17:30:00+00:00",
            "estado_pedido": "pendiente",
            "mesa_id": 4,
            "items": [
                {"cantidad": 2, "nombre": "Pollo a la Brasa",
                 "detalle": {"parte": "pierna", "corte": "en 4"}},
                {"cantidad": "1", "nombre": "Chicha morada"}
            ],
            "notas": "sin papas",
            "metodo_pago": "efectivo",
            "total": 64.5
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.table_id, Some(4));
        assert_eq!(order.short_id(), "abc12345");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[1].quantity, 1);
        let detail = order.items[0].detail.detail().unwrap();
        assert_eq!(detail.part.as_deref(), Some("pierna"));
        assert_eq!(detail.cut.as_deref(), Some("en 4"));
    }

    #[test]
    fn test_order_accepts_english_names_and_encoded_items() {
        let order: Order = serde_json::from_value(json!({
            "id": "o-1",
            "created_at": "2024-05-01 17:30:00",
            "status": "completed",
            "table_ref": null,
            "items": "[{\"quantity\": 3, \"name\": \"Anticucho\"}]"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.is_takeout());
        assert_eq!(order.items, vec![LineItem::new(3, "Anticucho")]);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_value::<Order>(json!({
            "id": "o-2",
            "created_at": "2024-05-01T17:30:00Z",
            "estado_pedido": "archivado",
            "items": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_detail_shapes() {
        let parse = |v: Value| serde_json::from_value::<LineItem>(json!({"nombre": "x", "detalle": v})).unwrap().detail;

        assert_eq!(parse(Value::Null), ItemDetailField::Absent);
        assert_eq!(parse(json!({})), ItemDetailField::Absent);
        assert_eq!(
            parse(json!("{\"corte\": \"mariposa\"}")),
            ItemDetailField::Present(ItemDetail {
                cut: Some("mariposa".into()),
                ..Default::default()
            })
        );
        assert_eq!(
            parse(json!("bien cocido")),
            ItemDetailField::Present(ItemDetail {
                notes: Some("bien cocido".into()),
                ..Default::default()
            })
        );
        assert_eq!(parse(json!([1, 2])), ItemDetailField::Unparseable);
        assert_eq!(parse(json!({"parte": 7})), ItemDetailField::Unparseable);
        assert_eq!(parse(json!("{roto")), ItemDetailField::Unparseable);
    }

    #[test]
    fn test_missing_name_is_kept_as_none() {
        let item: LineItem = serde_json::from_value(json!({"cantidad": 2, "nombre": "  "})).unwrap();
        assert_eq!(item.name, None);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_status_column_values() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }

    #[test]
    fn test_row_survives_fields_that_do_not_print() {
        let order: Order = serde_json::from_value(json!({
            "id": "o-3",
            "created_at": "2024-05-01T17:30:00Z",
            "estado_pedido": "pendiente",
            "items": [{"cantidad": 1, "nombre": 123}, "pollo", null],
            "notas": 5,
            "metodo_pago": 1,
            "total": null
        }))
        .unwrap();
        assert_eq!(order.total, 0.0);
        assert_eq!(order.payment_method, None);
        assert_eq!(order.notes, None);
        assert_eq!(order.items[0].name, None);
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(order.items[1], LineItem::unreadable());
        assert_eq!(order.items[2], LineItem::unreadable());
    }

    #[test]
    fn test_items_column_must_be_a_list() {
        let result = serde_json::from_value::<Order>(json!({
            "id": "o-4",
            "created_at": "2024-05-01T17:30:00Z",
            "items": "no es json"
        }));
        assert!(result.is_err());
    }
}
