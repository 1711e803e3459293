//! Kitchen ticket types
//!
//! [`KitchenTicket`] is what the renderer consumes. It is built either from a
//! stored [`Order`] (realtime path, reprint) or from an HTTP [`PrintRequest`]
//! (print-on-demand path).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use shared::serde_helpers::{non_blank, parse_timestamp};
use shared::util::{new_order_id, short_id};
use shared::{ItemDetailField, LineItem, Order};

/// Date/time format printed on tickets
pub const TICKET_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Placement line for orders without a table
pub const TAKEOUT_LABEL: &str = "PARA LLEVAR";

/// Printed in place of a missing item name
pub const MISSING_NAME_PLACEHOLDER: &str = "(sin nombre)";

/// Free-text placements that mean takeout
const TAKEOUT_ALIASES: &[&str] = &["para llevar", "llevar", "takeout", "take away", "delivery"];

/// Where the order is served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Table number (not the table id)
    Table(i64),
    Takeout,
    /// Free-text placement sent by a client, printed as-is
    Label(String),
}

impl Placement {
    /// Parse a free-text placement ("5", "Mesa 5", "para llevar", "Barra")
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Placement::Takeout;
        }
        let lower = trimmed.to_lowercase();
        if TAKEOUT_ALIASES.contains(&lower.as_str()) {
            return Placement::Takeout;
        }
        let number = lower.strip_prefix("mesa").unwrap_or(&lower).trim();
        match number.parse::<i64>() {
            Ok(n) => Placement::Table(n),
            Err(_) => Placement::Label(trimmed.to_string()),
        }
    }

    /// Line printed in the metadata block
    pub fn label(&self) -> String {
        match self {
            Placement::Table(n) => format!("MESA {}", n),
            Placement::Takeout => TAKEOUT_LABEL.to_string(),
            Placement::Label(s) => s.clone(),
        }
    }
}

/// Non-fatal problems found while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Item printed with the placeholder name
    MissingItemName { index: usize },
    /// Detail block could not be read and was skipped
    UnparseableDetail { index: usize },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::MissingItemName { index } => write!(f, "item {} has no name", index),
            Degradation::UnparseableDetail { index } => {
                write!(f, "item {} has an unreadable detail block", index)
            }
        }
    }
}

/// Everything printed on one kitchen ticket
#[derive(Debug, Clone, PartialEq)]
pub struct KitchenTicket {
    pub order_id: String,
    pub placement: Placement,
    /// Order type sent by print-on-demand clients ("salon", "delivery", ...)
    pub kind: Option<String>,
    /// Already formatted in the venue timezone
    pub date: String,
    pub items: Vec<LineItem>,
    pub notes: Option<String>,
}

impl KitchenTicket {
    /// Build a ticket from a stored order
    ///
    /// `table_number` is the resolved number of `order.table_id`; when it
    /// could not be resolved the raw id is printed instead.
    pub fn from_order(order: &Order, table_number: Option<i64>, tz: Tz) -> Self {
        let placement = match order.table_id {
            None => Placement::Takeout,
            Some(id) => Placement::Table(table_number.unwrap_or(id)),
        };
        Self {
            order_id: order.id.clone(),
            placement,
            kind: None,
            date: format_ticket_date(order.created_at, tz),
            items: order.items.clone(),
            notes: order.notes.clone(),
        }
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Degradations the renderer will work around
    pub fn degradations(&self) -> Vec<Degradation> {
        let mut found = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            if item.name.is_none() {
                found.push(Degradation::MissingItemName { index });
            }
            if item.detail == ItemDetailField::Unparseable {
                found.push(Degradation::UnparseableDetail { index });
            }
        }
        found
    }
}

/// Format a timestamp for the ticket in the venue timezone
pub fn format_ticket_date(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format(TICKET_DATE_FORMAT).to_string()
}

// =============================================================================
// Print-on-demand request
// =============================================================================

/// `table_or_takeout` as sent by clients: a table number, free text or null
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlacementInput {
    Number(i64),
    Text(String),
}

/// Body of `POST /api/print`
///
/// ```json
/// {
///   "table_or_takeout": 5,
///   "items": [{"cantidad": 2, "nombre": "Pollo a la Brasa"}],
///   "notes": "sin papas",
///   "id": "abc12345",
///   "type": "salon",
///   "date": "2024-05-01T12:30:00-05:00"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PrintRequest {
    #[serde(default)]
    pub table_or_takeout: Option<PlacementInput>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, alias = "notas", deserialize_with = "non_blank")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "non_blank")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub date: Option<String>,
}

impl PrintRequest {
    /// Convert into a ticket
    ///
    /// A parseable `date` is shown in `tz`; any other text is printed
    /// verbatim. Without a date, `now` is used.
    pub fn into_ticket(self, tz: Tz, now: DateTime<Utc>) -> KitchenTicket {
        let placement = match &self.table_or_takeout {
            None => Placement::Takeout,
            Some(PlacementInput::Number(n)) => Placement::Table(*n),
            Some(PlacementInput::Text(s)) => Placement::from_text(s),
        };
        let date = match self.date {
            Some(text) => match parse_timestamp(&text) {
                Some(at) => format_ticket_date(at, tz),
                None => text,
            },
            None => format_ticket_date(now, tz),
        };
        KitchenTicket {
            order_id: self.id.unwrap_or_else(new_order_id),
            placement,
            kind: self.kind,
            date,
            items: self.items,
            notes: self.notes,
        }
    }
}
