//! Dining Table Model (mesa)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Occupancy of a physical table
///
/// Exactly two states exist; there is no reserved or transitional state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TableState {
    #[serde(rename = "libre", alias = "free")]
    Free,
    #[serde(rename = "ocupada", alias = "occupied")]
    Occupied,
}

impl TableState {
    /// Column value in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            TableState::Free => "libre",
            TableState::Occupied => "ocupada",
        }
    }
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown enum value read from the store
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseStateError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for TableState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "libre" | "free" => Ok(TableState::Free),
            "ocupada" | "occupied" => Ok(TableState::Occupied),
            other => Err(ParseStateError {
                kind: "table state",
                value: other.to_string(),
            }),
        }
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiningTable {
    pub id: i64,
    /// Number shown to staff and printed on tickets (distinct from id)
    #[serde(rename = "numero", alias = "number")]
    pub number: i64,
    #[serde(rename = "estado", alias = "state")]
    pub state: TableState,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    #[serde(rename = "numero", alias = "number")]
    pub number: i64,
}
