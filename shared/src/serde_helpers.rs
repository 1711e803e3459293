//! Lenient serde helpers for rows coming from the change feed
//!
//! Row payloads are produced by different writers (the local store, database
//! webhooks, older dashboard versions), so a few columns arrive in more than
//! one shape:
//! - timestamps as RFC 3339, naive `YYYY-MM-DD HH:MM:SS` or epoch millis
//! - quantities as numbers or numeric strings
//! - JSON columns either inline or as an encoded string
//! - columns printing never reads (`total`, `metodo_pago`) in any shape

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a timestamp in any of the accepted shapes
///
/// Naive timestamps are taken as UTC.
pub fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => parse_timestamp(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s))),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", n))),
        other => Err(de::Error::custom(format!(
            "expected timestamp, got {}",
            other
        ))),
    }
}

/// Parse a timestamp string (RFC 3339 first, then naive formats)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres style offset without minutes, e.g. "2024-05-01 12:00:00+00"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Deserialize a quantity; anything missing or unusable becomes 1
pub fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let quantity = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(quantity
        .filter(|q| *q > 0)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or(1))
}

/// Deserialize a JSON column that may be inline or encoded as a string
///
/// `null` and an empty string both yield `T::default()`.
pub fn json_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(T::default()),
        Some(Value::String(s)) => serde_json::from_str(&s).map_err(de::Error::custom),
        Some(other) => serde_json::from_value(other).map_err(de::Error::custom),
    }
}

/// Deserialize an optional string, mapping blank strings to `None`
pub fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Deserialize optional free text; blank strings and non-string values
/// become `None`
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Deserialize an amount; numeric strings are accepted, anything else is 0
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(amount.filter(|a| a.is_finite()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 17, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T17:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:30:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 17:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 17:30:00+00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-01T17:30:00.123456+00:00").map(|t| t.second()),
            Some(0)
        );
        assert_eq!(parse_timestamp("ayer"), None);
    }

    #[derive(Deserialize)]
    struct Qty {
        #[serde(default = "one", deserialize_with = "lenient_quantity")]
        q: u32,
    }

    fn one() -> u32 {
        1
    }

    fn qty(json: &str) -> u32 {
        serde_json::from_str::<Qty>(json).unwrap().q
    }

    #[test]
    fn test_lenient_quantity() {
        assert_eq!(qty(r#"{"q": 3}"#), 3);
        assert_eq!(qty(r#"{"q": "2"}"#), 2);
        assert_eq!(qty(r#"{"q": 2.0}"#), 2);
        assert_eq!(qty(r#"{"q": null}"#), 1);
        assert_eq!(qty(r#"{"q": 0}"#), 1);
        assert_eq!(qty(r#"{"q": "dos"}"#), 1);
        assert_eq!(qty(r#"{}"#), 1);
    }

    #[derive(Deserialize)]
    struct List {
        #[serde(default, deserialize_with = "json_or_string")]
        items: Vec<u32>,
    }

    #[test]
    fn test_json_or_string() {
        let inline: List = serde_json::from_str(r#"{"items": [1, 2]}"#).unwrap();
        assert_eq!(inline.items, vec![1, 2]);
        let encoded: List = serde_json::from_str(r#"{"items": "[3]"}"#).unwrap();
        assert_eq!(encoded.items, vec![3]);
        let null: List = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(null.items.is_empty());
        assert!(serde_json::from_str::<List>(r#"{"items": "nope"}"#).is_err());
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_amount")]
        total: f64,
    }

    fn row(json: &str) -> (Option<String>, f64) {
        let r = serde_json::from_str::<Row>(json).unwrap();
        (r.name, r.total)
    }

    #[test]
    fn test_lenient_text_and_amount() {
        assert_eq!(row(r#"{"name": "Pollo", "total": 12.5}"#), (Some("Pollo".into()), 12.5));
        assert_eq!(row(r#"{"name": 123, "total": null}"#), (None, 0.0));
        assert_eq!(row(r#"{"name": " ", "total": "8.50"}"#), (None, 8.5));
        assert_eq!(row(r#"{"name": {"es": "x"}, "total": true}"#), (None, 0.0));
        assert_eq!(row(r#"{}"#), (None, 0.0));
    }
}
